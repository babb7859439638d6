use super::{frame::IndicatorFrame, Strategy, StrategyMeta};
use crate::config::ShortGridSettings;
use crate::ladder::{LadderConfig, PositionLadder};
use crate::models::{Candle, SignalFlags};
use crate::Result;

/// Short-only grid bot driven purely by price levels
///
/// Uses no indicators. It opens a short on the first tradable candle of each
/// batch. The ladder from [`ShortGridStrategy::ladder`] then registers a new
/// level every `grid_short_entry_pct` above the last one, and exits on the
/// profit target. It never emits exit signals itself.
#[derive(Debug, Clone, Default)]
pub struct ShortGridStrategy {
    settings: ShortGridSettings,
}

impl ShortGridStrategy {
    pub fn new(settings: ShortGridSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ShortGridSettings {
        &self.settings
    }

    /// Position ladder anchored on the per-pair level registry
    pub fn ladder(&self) -> PositionLadder {
        PositionLadder::new(LadderConfig::short_grid(&self.settings))
    }
}

impl Strategy for ShortGridStrategy {
    fn name(&self) -> &str {
        "ShortGridTradingBot"
    }

    fn meta(&self) -> StrategyMeta {
        StrategyMeta {
            timeframe: "5m",
            startup_candle_count: 1,
            can_long: false,
            can_short: true,
            stoploss: self.settings.stoploss,
            minimal_roi: 100.0, // Exits belong to the ladder
        }
    }

    fn populate_indicators(&self, candles: &[Candle]) -> Result<IndicatorFrame> {
        Ok(IndicatorFrame::new(candles.len()))
    }

    fn populate_signals(&self, candles: &[Candle], _frame: &IndicatorFrame) -> Vec<SignalFlags> {
        let first_tradable = self.meta().startup_candle_count;

        (0..candles.len())
            .map(|i| SignalFlags {
                enter_short: i == first_tradable,
                ..SignalFlags::none()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticCandles;

    #[test]
    fn test_single_entry_after_warmup() {
        let candles = SyntheticCandles::from_closes("SOL/USDT", &[10.0, 11.0, 12.0, 13.0], 5);
        let signals = ShortGridStrategy::default().generate_signals(&candles).unwrap();

        assert!(signals[0].is_empty());
        assert!(signals[1].enter_short);
        assert!(signals[2..].iter().all(SignalFlags::is_empty));
    }

    #[test]
    fn test_never_longs_or_exits() {
        let candles = SyntheticCandles::from_closes("SOL/USDT", &[10.0; 20], 5);
        let signals = ShortGridStrategy::default().generate_signals(&candles).unwrap();

        assert!(signals
            .iter()
            .all(|s| !s.enter_long && !s.exit_long && !s.exit_short));
    }

    #[test]
    fn test_too_few_candles_is_silent() {
        let candles = SyntheticCandles::from_closes("SOL/USDT", &[10.0], 5);
        let signals = ShortGridStrategy::default().generate_signals(&candles).unwrap();
        assert_eq!(signals, vec![SignalFlags::none()]);
    }
}
