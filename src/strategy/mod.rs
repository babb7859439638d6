// Trading strategy module
pub mod ema_cross;
pub mod frame;
pub mod grid_trend;
pub mod random_entry;
pub mod rsi_short;
pub mod short_grid;
pub mod signals;

pub use ema_cross::EmaCrossStrategy;
pub use frame::IndicatorFrame;
pub use grid_trend::GridTrendStrategy;
pub use random_entry::RandomEntryStrategy;
pub use rsi_short::RsiShortStrategy;
pub use short_grid::ShortGridStrategy;

use crate::models::{Candle, SignalFlags};
use crate::Result;
use signals::{timeframe_to_secs, validate_candle_uniformity};

/// Static description of a strategy as the host sees it
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyMeta {
    pub timeframe: &'static str,
    /// Leading candles that never carry a signal
    pub startup_candle_count: usize,
    pub can_long: bool,
    pub can_short: bool,
    /// Host-side stoploss ratio
    pub stoploss: f64,
    /// Host-side ROI exit ratio
    pub minimal_roi: f64,
}

/// Base trait for all signal generators
pub trait Strategy: Send + Sync {
    /// Get strategy name
    fn name(&self) -> &str;

    fn meta(&self) -> StrategyMeta;

    /// Compute indicator columns for a candle batch
    fn populate_indicators(&self, candles: &[Candle]) -> Result<IndicatorFrame>;

    /// Raw entry/exit flags, one per candle, before warm-up masking
    fn populate_signals(&self, candles: &[Candle], frame: &IndicatorFrame) -> Vec<SignalFlags>;

    /// Smaller batches skip indicator work and carry no signal
    fn min_candles_required(&self) -> usize {
        self.meta().startup_candle_count + 1
    }

    /// Generate one flag row per candle.
    ///
    /// Rows inside the warm-up window are always empty, as are flags for a
    /// direction the strategy does not trade.
    fn generate_signals(&self, candles: &[Candle]) -> Result<Vec<SignalFlags>> {
        let meta = self.meta();
        validate_candle_uniformity(candles, timeframe_to_secs(meta.timeframe))?;

        if candles.len() < self.min_candles_required() {
            tracing::debug!(
                "{}: {} candles, need {} before any signal",
                self.name(),
                candles.len(),
                self.min_candles_required()
            );
            return Ok(vec![SignalFlags::none(); candles.len()]);
        }

        let frame = self.populate_indicators(candles)?;
        let raw = self.populate_signals(candles, &frame);

        let signals: Vec<SignalFlags> = (0..candles.len())
            .map(|i| {
                if i < meta.startup_candle_count {
                    return SignalFlags::none();
                }
                let flags = raw.get(i).copied().unwrap_or_default();
                SignalFlags {
                    enter_long: flags.enter_long && meta.can_long,
                    exit_long: flags.exit_long && meta.can_long,
                    enter_short: flags.enter_short && meta.can_short,
                    exit_short: flags.exit_short && meta.can_short,
                }
            })
            .collect();

        let entries = signals
            .iter()
            .filter(|s| s.enter_long || s.enter_short)
            .count();
        tracing::debug!(
            "🔍 {}: {} candles, {} entry rows",
            self.name(),
            candles.len(),
            entries
        );

        Ok(signals)
    }
}
