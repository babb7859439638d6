use crate::models::IndicatorSeries;

/// Calculate Relative Strength Index (RSI) for every candle
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions. Averages use Wilder's smoothing.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// The first `period` entries are undefined.
pub fn calculate_rsi(prices: &[f64], period: usize) -> IndicatorSeries {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return out;
    }

    // Price changes; index k holds prices[k + 1] - prices[k]
    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    if changes.iter().any(|c| !c.is_finite()) {
        tracing::debug!("RSI skipped: non-finite price in input");
        return out;
    }

    let gain = |c: f64| c.max(0.0);
    let loss = |c: f64| (-c).max(0.0);

    let mut avg_gain = changes[..period].iter().map(|&c| gain(c)).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(|&c| loss(c)).sum::<f64>() / period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for (k, &change) in changes.iter().enumerate().skip(period) {
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain(change)) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss(change)) / period as f64;
        out[k + 1] = Some(rsi_value(avg_gain, avg_loss));
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_calculation() {
        // Test with known values
        let prices = vec![
            44.0, 44.25, 44.5, 43.75, 44.0, 44.5, 45.0, 45.5, 45.25, 45.5,
            46.0, 46.5, 46.25, 46.0, 46.5,
        ];

        let rsi = calculate_rsi(&prices, 14);
        assert!(rsi[..14].iter().all(Option::is_none));

        let rsi_value = rsi[14].unwrap();
        assert!(rsi_value > 0.0 && rsi_value < 100.0);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let prices = vec![100.0, 102.0, 101.0];
        let rsi = calculate_rsi(&prices, 14);
        assert!(rsi.iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_all_gains() {
        let prices = vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        let rsi = calculate_rsi(&prices, 5);
        assert_eq!(rsi[5], Some(100.0)); // All gains = RSI 100
    }

    #[test]
    fn test_rsi_all_losses() {
        let prices = vec![105.0, 104.0, 103.0, 102.0, 101.0, 100.0, 99.0];
        let rsi = calculate_rsi(&prices, 5);
        assert_eq!(rsi[5], Some(0.0));
        assert_eq!(rsi[6], Some(0.0));
    }

    #[test]
    fn test_rsi_nan_input_is_undefined() {
        let mut prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        prices[7] = f64::NAN;
        let rsi = calculate_rsi(&prices, 14);
        assert!(rsi.iter().all(Option::is_none));
    }
}
