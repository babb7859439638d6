use crate::models::IndicatorSeries;

/// Lift raw prices into a series with non-finite values marked undefined
pub fn to_series(values: &[f64]) -> IndicatorSeries {
    values
        .iter()
        .map(|v| v.is_finite().then_some(*v))
        .collect()
}

/// Simple Moving Average (SMA) aligned to `prices`.
///
/// The first `period - 1` entries are undefined, as is any window that
/// contains an undefined value.
pub fn calculate_sma(prices: &[f64], period: usize) -> IndicatorSeries {
    sma_of(&to_series(prices), period)
}

/// SMA over a series that may itself carry undefined values
pub fn sma_of(series: &[Option<f64>], period: usize) -> IndicatorSeries {
    let mut out = vec![None; series.len()];
    if period == 0 || series.len() < period {
        return out;
    }

    for end in period..=series.len() {
        let window = &series[end - period..end];
        let sum: Option<f64> = window.iter().copied().sum();
        out[end - 1] = sum.map(|s| s / period as f64);
    }

    out
}

/// Exponential Moving Average (EMA) aligned to `prices`.
///
/// Seeded with the SMA of the first `period` values, so the first defined
/// value sits at index `period - 1`.
pub fn calculate_ema(prices: &[f64], period: usize) -> IndicatorSeries {
    ema_of(&to_series(prices), period)
}

/// EMA over a series with a leading undefined run (e.g. the MACD line).
///
/// Seeding starts at the first run of `period` consecutive defined values;
/// an undefined value after seeding restarts the warm-up.
pub fn ema_of(series: &[Option<f64>], period: usize) -> IndicatorSeries {
    let mut out = vec![None; series.len()];
    if period == 0 {
        return out;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;
    let mut run: Vec<f64> = Vec::with_capacity(period);

    for (i, value) in series.iter().enumerate() {
        match (*value, ema) {
            (Some(price), Some(prev)) => {
                let next = (price - prev) * multiplier + prev;
                ema = Some(next);
                out[i] = Some(next);
            }
            (Some(price), None) => {
                run.push(price);
                if run.len() == period {
                    let seed = run.iter().sum::<f64>() / period as f64;
                    ema = Some(seed);
                    out[i] = Some(seed);
                    run.clear();
                }
            }
            (None, _) => {
                ema = None;
                run.clear();
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma.len(), 5);
        assert!(sma[..4].iter().all(Option::is_none));
        assert_eq!(sma[4], Some(104.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let prices = vec![100.0, 102.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, vec![None, None]);
    }

    #[test]
    fn test_sma_window_with_nan_is_undefined() {
        let prices = vec![1.0, f64::NAN, 3.0, 4.0, 5.0];
        let sma = calculate_sma(&prices, 2);
        assert_eq!(sma[1], None);
        assert_eq!(sma[2], None);
        assert_eq!(sma[3], Some(3.5));
    }

    #[test]
    fn test_ema() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        let ema = calculate_ema(&prices, 5);
        assert_eq!(ema[4], Some(104.0)); // Seeded with SMA
        assert!(ema[5].unwrap() > 104.0);
    }

    #[test]
    fn test_ema_of_skips_leading_gap() {
        let series = vec![None, None, Some(1.0), Some(2.0), Some(3.0)];
        let ema = ema_of(&series, 2);
        assert_eq!(ema[2], None);
        assert_eq!(ema[3], Some(1.5));
        assert!(ema[4].unwrap() > 1.5);
    }
}
