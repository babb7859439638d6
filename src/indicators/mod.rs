// Technical indicators module
// Series versions of SMA, EMA, RSI, Bollinger Bands and MACD, aligned to candles

pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;

pub use bollinger::{bollinger_on_typical_price, calculate_bollinger, BollingerBands};
pub use macd::{calculate_macd, calculate_macd_default, Macd};
pub use moving_average::{calculate_ema, calculate_sma, ema_of, sma_of, to_series};
pub use rsi::calculate_rsi;

/// Defined value at `i`, treating out-of-range and non-finite as undefined
pub fn value_at(series: &[Option<f64>], i: usize) -> Option<f64> {
    series.get(i).copied().flatten().filter(|v| v.is_finite())
}

/// Value at the candle before `i`
pub fn previous_at(series: &[Option<f64>], i: usize) -> Option<f64> {
    i.checked_sub(1).and_then(|prev| value_at(series, prev))
}
