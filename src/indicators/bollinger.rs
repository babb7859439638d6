use super::moving_average::sma_of;
use crate::models::{Candle, IndicatorSeries};

/// Bollinger Bands aligned to the candle sequence
#[derive(Debug, Clone, Default)]
pub struct BollingerBands {
    pub lower: IndicatorSeries,
    pub mid: IndicatorSeries,
    pub upper: IndicatorSeries,
}

/// Bands over the typical price of each candle
pub fn bollinger_on_typical_price(candles: &[Candle], window: usize, stds: f64) -> BollingerBands {
    let typical: Vec<f64> = candles.iter().map(Candle::typical_price).collect();
    calculate_bollinger(&typical, window, stds)
}

/// Rolling mean +/- `stds` population standard deviations
pub fn calculate_bollinger(values: &[f64], window: usize, stds: f64) -> BollingerBands {
    let series = super::moving_average::to_series(values);
    let mid = sma_of(&series, window);

    let mut lower = vec![None; values.len()];
    let mut upper = vec![None; values.len()];

    for (i, mean) in mid.iter().enumerate() {
        let Some(mean) = *mean else { continue };
        let start = i + 1 - window;
        let variance =
            values[start..=i].iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
        let width = variance.sqrt() * stds;
        lower[i] = Some(mean - width);
        upper[i] = Some(mean + width);
    }

    BollingerBands { lower, mid, upper }
}
