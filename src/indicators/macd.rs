use super::moving_average::{calculate_ema, ema_of};
use crate::models::IndicatorSeries;

/// MACD line, signal line and histogram
#[derive(Debug, Clone, Default)]
pub struct Macd {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub hist: IndicatorSeries,
}

/// MACD with the usual 12/26/9 periods
pub fn calculate_macd_default(prices: &[f64]) -> Macd {
    calculate_macd(prices, 12, 26, 9)
}

pub fn calculate_macd(prices: &[f64], fast: usize, slow: usize, signal_period: usize) -> Macd {
    let fast_ema = calculate_ema(prices, fast);
    let slow_ema = calculate_ema(prices, slow);

    let macd: IndicatorSeries = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_of(&macd, signal_period);
    let hist = macd
        .iter()
        .zip(&signal)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    Macd { macd, signal, hist }
}
