use crate::models::Candle;

/// Ordered chain of entry/exit predicates over candle indices.
///
/// Predicates run left to right and stop at the first that fails. An empty
/// chain never holds.
pub struct Conditions<'a> {
    predicates: Vec<(&'static str, Box<dyn Fn(usize) -> bool + 'a>)>,
}

impl<'a> Conditions<'a> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    pub fn with(mut self, label: &'static str, predicate: impl Fn(usize) -> bool + 'a) -> Self {
        self.predicates.push((label, Box::new(predicate)));
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True when every predicate holds at `i`
    pub fn holds(&self, i: usize) -> bool {
        !self.predicates.is_empty() && self.predicates.iter().all(|(_, p)| p(i))
    }

    /// Label of the first predicate failing at `i`, for debug logging
    pub fn first_failure(&self, i: usize) -> Option<&'static str> {
        self.predicates
            .iter()
            .find(|(_, p)| !p(i))
            .map(|(label, _)| *label)
    }
}

impl Default for Conditions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry precondition: the candle traded
pub fn has_volume(candles: &[Candle], i: usize) -> bool {
    candles.get(i).is_some_and(|c| c.volume > 0.0)
}

/// `value < bound`, false when the bound is undefined
pub fn below(value: f64, bound: Option<f64>) -> bool {
    bound.is_some_and(|b| value < b)
}

/// `value > bound`, false when the bound is undefined
pub fn above(value: f64, bound: Option<f64>) -> bool {
    bound.is_some_and(|b| value > b)
}

/// Convert a timeframe such as `5m`, `1h` or `1d` to seconds
pub fn timeframe_to_secs(timeframe: &str) -> Option<u64> {
    let split = timeframe.len().checked_sub(1)?;
    let (amount, unit) = timeframe.split_at(split);
    let amount: u64 = amount.parse().ok()?;
    let unit_secs = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86_400,
        "w" => 604_800,
        _ => return None,
    };
    Some(amount * unit_secs)
}

/// Validate a candle batch before computing signals
///
/// # Returns
/// * `Err` if timestamps are not strictly increasing or pairs are mixed
/// * `Ok(gaps)` with the number of steps longer than 1.5x `expected_interval_secs`
///
/// Gaps are tolerated (exchange downtime happens) but logged.
pub fn validate_candle_uniformity(
    candles: &[Candle],
    expected_interval_secs: Option<u64>,
) -> anyhow::Result<usize> {
    if candles.len() < 2 {
        return Ok(0);
    }

    let pair = &candles[0].pair;
    let max_gap_secs = expected_interval_secs.map(|s| s + s / 2);
    let mut gaps = 0;

    for window in candles.windows(2) {
        if &window[1].pair != pair {
            anyhow::bail!(
                "Mixed pairs in one candle batch: {} and {}",
                pair,
                window[1].pair
            );
        }

        let time_diff = (window[1].timestamp - window[0].timestamp).num_seconds();

        if time_diff <= 0 {
            anyhow::bail!(
                "Candles are not sorted by timestamp: {} followed by {}",
                window[0].timestamp,
                window[1].timestamp
            );
        }

        if let Some(max_gap) = max_gap_secs {
            if time_diff as u64 > max_gap {
                gaps += 1;
                tracing::warn!(
                    "Data gap in {}: {}s between candles (expected ~{}s). Gap from {} to {}.",
                    pair,
                    time_diff,
                    expected_interval_secs.unwrap_or_default(),
                    window[0].timestamp.format("%H:%M:%S"),
                    window[1].timestamp.format("%H:%M:%S")
                );
            }
        }
    }

    Ok(gaps)
}
