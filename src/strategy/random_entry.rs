use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{frame::IndicatorFrame, Strategy, StrategyMeta};
use crate::config::RandomEntrySettings;
use crate::error::StrategyError;
use crate::models::{Candle, SignalFlags};
use crate::Result;

/// Coin-flip entry baseline
///
/// Draws one uniform value in [0, 1) per candle, ignoring market data. A draw
/// below `long_probability` enters long, anything else enters short. The
/// random source is injected so a seeded run replays exactly.
#[derive(Debug)]
pub struct RandomEntryStrategy<R = StdRng> {
    settings: RandomEntrySettings,
    rng: Mutex<R>,
}

impl<R: Rng + Send> RandomEntryStrategy<R> {
    pub fn with_rng(settings: RandomEntrySettings, rng: R) -> Self {
        Self {
            settings,
            rng: Mutex::new(rng),
        }
    }
}

impl RandomEntryStrategy<StdRng> {
    /// Reproducible strategy for tests and replays
    pub fn seeded(settings: RandomEntrySettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    /// Strategy seeded from OS entropy for live use
    pub fn from_entropy(settings: RandomEntrySettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }
}

impl<R: Rng + Send> Strategy for RandomEntryStrategy<R> {
    fn name(&self) -> &str {
        "RandomEntry"
    }

    fn meta(&self) -> StrategyMeta {
        StrategyMeta {
            timeframe: "5m",
            startup_candle_count: 1,
            can_long: true,
            can_short: true,
            stoploss: -0.10,
            minimal_roi: 0.05,
        }
    }

    fn populate_indicators(&self, candles: &[Candle]) -> Result<IndicatorFrame> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| StrategyError::RandomSource(e.to_string()))?;

        // One draw per candle, warm-up included, so replays stay aligned
        let draws = (0..candles.len())
            .map(|_| Some(rng.gen::<f64>()))
            .collect();

        Ok(IndicatorFrame::new(candles.len()).with("random_value", draws))
    }

    fn populate_signals(&self, candles: &[Candle], frame: &IndicatorFrame) -> Vec<SignalFlags> {
        let p = self.settings.long_probability;

        (0..candles.len())
            .map(|i| match frame.value("random_value", i) {
                Some(draw) => SignalFlags {
                    enter_long: draw < p,
                    enter_short: draw >= p,
                    ..SignalFlags::none()
                },
                None => SignalFlags::none(),
            })
            .collect()
    }
}
