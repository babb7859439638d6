use super::{frame::IndicatorFrame, Strategy, StrategyMeta};
use crate::indicators::calculate_ema;
use crate::models::{Candle, SignalFlags};
use crate::Result;

/// EMA trend-following strategy
///
/// Long while the fast EMA sits above the slow one, short while it sits
/// below. Each side exits when the relationship flips.
#[derive(Debug, Clone)]
pub struct EmaCrossStrategy {
    fast_period: usize,
    slow_period: usize,
}

impl EmaCrossStrategy {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
        }
    }
}

impl Default for EmaCrossStrategy {
    fn default() -> Self {
        Self::new(9, 20)
    }
}

impl Strategy for EmaCrossStrategy {
    fn name(&self) -> &str {
        "EMACross"
    }

    fn meta(&self) -> StrategyMeta {
        StrategyMeta {
            timeframe: "1m",
            startup_candle_count: self.slow_period,
            can_long: true,
            can_short: true,
            stoploss: -0.10,
            minimal_roi: 0.01,
        }
    }

    fn populate_indicators(&self, candles: &[Candle]) -> Result<IndicatorFrame> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        Ok(IndicatorFrame::new(candles.len())
            .with("ema_fast", calculate_ema(&closes, self.fast_period))
            .with("ema_slow", calculate_ema(&closes, self.slow_period)))
    }

    fn populate_signals(&self, candles: &[Candle], frame: &IndicatorFrame) -> Vec<SignalFlags> {
        (0..candles.len())
            .map(|i| {
                let (Some(fast), Some(slow)) = (frame.value("ema_fast", i), frame.value("ema_slow", i))
                else {
                    return SignalFlags::none();
                };

                let bullish = slow < fast;
                let bearish = slow > fast;
                SignalFlags {
                    enter_long: bullish,
                    exit_short: bullish,
                    enter_short: bearish,
                    exit_long: bearish,
                }
            })
            .collect()
    }
}
