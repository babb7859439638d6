use super::{
    frame::IndicatorFrame,
    signals::{has_volume, Conditions},
    Strategy, StrategyMeta,
};
use crate::config::RsiShortSettings;
use crate::indicators::calculate_rsi;
use crate::ladder::{LadderConfig, PositionLadder};
use crate::models::{Candle, IndicatorSeries, SignalFlags};
use crate::Result;

/// Short-only RSI strategy with profit-threshold averaging
///
/// Entry conditions (ALL must be true):
/// - RSI above `short_rsi` (overbought)
/// - RSI lower than on the previous candle (momentum rolling over)
/// - Volume > 0
///
/// No exit signals: the host's 10% ROI closes winners and the ladder from
/// [`RsiShortStrategy::ladder`] averages into losers.
#[derive(Debug, Clone, Default)]
pub struct RsiShortStrategy {
    settings: RsiShortSettings,
}

impl RsiShortStrategy {
    pub fn new(settings: RsiShortSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RsiShortSettings {
        &self.settings
    }

    pub fn ladder(&self) -> PositionLadder {
        PositionLadder::new(LadderConfig::rsi_short(&self.settings))
    }
}

/// 1.0 where `rsi` moved in the `falling` direction since the previous candle
fn rsi_direction(rsi: &IndicatorSeries, falling: bool) -> IndicatorSeries {
    (0..rsi.len())
        .map(|i| {
            let current = rsi[i]?;
            let previous = rsi[i.checked_sub(1)?]?;
            let moved = if falling {
                current < previous
            } else {
                current > previous
            };
            Some(if moved { 1.0 } else { 0.0 })
        })
        .collect()
}

impl Strategy for RsiShortStrategy {
    fn name(&self) -> &str {
        "RSIShortStrategy"
    }

    fn meta(&self) -> StrategyMeta {
        StrategyMeta {
            timeframe: "5m",
            startup_candle_count: 30,
            can_long: false,
            can_short: true,
            stoploss: -1.0,
            minimal_roi: 0.1,
        }
    }

    fn populate_indicators(&self, candles: &[Candle]) -> Result<IndicatorFrame> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let rsi = calculate_rsi(&closes, 14);

        Ok(IndicatorFrame::new(candles.len())
            .with("rsi_decreasing", rsi_direction(&rsi, true))
            .with("rsi_increasing", rsi_direction(&rsi, false))
            .with("rsi", rsi))
    }

    fn populate_signals(&self, candles: &[Candle], frame: &IndicatorFrame) -> Vec<SignalFlags> {
        let threshold = self.settings.short_rsi as f64;

        let enter_short = Conditions::new()
            .with("rsi > short_rsi", |i| {
                frame.value("rsi", i).is_some_and(|r| r > threshold)
            })
            .with("rsi decreasing", |i| frame.flag("rsi_decreasing", i))
            .with("volume > 0", |i| has_volume(candles, i));

        (0..candles.len())
            .map(|i| {
                let enter = enter_short.holds(i);
                if !enter && frame.value("rsi", i).is_some_and(|r| r > threshold) {
                    tracing::debug!(
                        "RSI short skipped at {}: {}",
                        i,
                        enter_short.first_failure(i).unwrap_or("unknown")
                    );
                }
                SignalFlags {
                    enter_short: enter,
                    ..SignalFlags::none()
                }
            })
            .collect()
    }
}
