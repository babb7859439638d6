use crate::models::Candle;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Market shapes for synthetic candle batches
#[derive(Debug, Clone, Copy)]
pub enum MarketScenario {
    /// Steady rise with light noise (+2% daily average)
    Uptrend,
    /// Steady fall with light noise (-2% daily average)
    Downtrend,
    /// Mean-reverting chop (±1% around the base price)
    Sideways,
    /// Large swings (±5% per candle)
    Volatile,
    /// Sharp 25% rally over the second half, the short-grid worst case
    Squeeze,
}

/// Seeded candle generator for dry runs and tests
pub struct SyntheticCandles {
    rng: StdRng,
    pair: String,
    base_price: f64,
    base_volume: f64,
    start: DateTime<Utc>,
}

impl SyntheticCandles {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            pair: "SYNTH/USDT".to_string(),
            base_price: 150.0,
            base_volume: 1_000_000.0,
            start: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    pub fn with_pair(mut self, pair: &str) -> Self {
        self.pair = pair.to_string();
        self
    }

    pub fn with_base_price(mut self, price: f64) -> Self {
        self.base_price = price;
        self
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    /// Generate `num_candles` candles spaced `interval_minutes` apart
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_candles: usize,
        interval_minutes: i64,
    ) -> Vec<Candle> {
        let mut closes = Vec::with_capacity(num_candles);
        let mut price = self.base_price;
        let daily_drift = 0.02 / (24.0 * 60.0 / interval_minutes as f64);

        for i in 0..num_candles {
            price += match scenario {
                MarketScenario::Uptrend => {
                    price * daily_drift + price * self.rng.gen_range(-0.001..0.001)
                }
                MarketScenario::Downtrend => {
                    -price * daily_drift + price * self.rng.gen_range(-0.001..0.001)
                }
                MarketScenario::Sideways => {
                    (self.base_price - price) * 0.1 + price * self.rng.gen_range(-0.01..0.01)
                }
                MarketScenario::Volatile => price * self.rng.gen_range(-0.05..0.05),
                MarketScenario::Squeeze => {
                    if i < num_candles / 2 {
                        price * self.rng.gen_range(-0.002..0.002)
                    } else {
                        price * 0.25 / (num_candles as f64 / 2.0)
                            + price * self.rng.gen_range(-0.001..0.001)
                    }
                }
            };
            price = price.max(self.base_price * 0.5);
            closes.push(price);
        }

        closes
            .into_iter()
            .enumerate()
            .map(|(i, close)| self.create_candle(close, i, interval_minutes))
            .collect()
    }

    /// Candles with exactly the given closes, flat volume and tight ranges
    pub fn from_closes(pair: &str, closes: &[f64], interval_minutes: i64) -> Vec<Candle> {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);

        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                pair: pair.to_string(),
                timestamp: start + Duration::minutes(i as i64 * interval_minutes),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    /// Build realistic OHLC around a close
    fn create_candle(&mut self, price: f64, index: usize, interval_minutes: i64) -> Candle {
        let noise_pct = 0.002; // ±0.2% intrabar movement

        let high = price * (1.0 + self.rng.gen_range(0.0..noise_pct));
        let low = price * (1.0 - self.rng.gen_range(0.0..noise_pct));
        let open = (price * (1.0 + self.rng.gen_range(-noise_pct..noise_pct))).clamp(low, high);

        // Vary volume ±30%
        let volume = self.base_volume * self.rng.gen_range(0.7..1.3);

        Candle {
            pair: self.pair.clone(),
            timestamp: self.start + Duration::minutes(index as i64 * interval_minutes),
            open,
            high,
            low,
            close: price,
            volume,
        }
    }
}
