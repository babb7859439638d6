use std::collections::BTreeMap;

use crate::indicators::{previous_at, value_at};
use crate::models::IndicatorSeries;

/// Named indicator columns aligned to one candle batch
#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    len: usize,
    columns: BTreeMap<&'static str, IndicatorSeries>,
}

impl IndicatorFrame {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            columns: BTreeMap::new(),
        }
    }

    /// Add a column; series of the wrong length are padded or cut to fit
    pub fn insert(&mut self, name: &'static str, mut series: IndicatorSeries) {
        if series.len() != self.len {
            tracing::warn!(
                "Indicator {} has {} values for {} candles, realigning",
                name,
                series.len(),
                self.len
            );
            series.resize(self.len, None);
        }
        self.columns.insert(name, series);
    }

    pub fn with(mut self, name: &'static str, series: IndicatorSeries) -> Self {
        self.insert(name, series);
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column(&self, name: &str) -> Option<&IndicatorSeries> {
        self.columns.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &&'static str> {
        self.columns.keys()
    }

    /// Defined value of `name` at candle `i`
    pub fn value(&self, name: &str, i: usize) -> Option<f64> {
        self.column(name).and_then(|s| value_at(s, i))
    }

    /// Defined value of `name` at the candle before `i`
    pub fn previous(&self, name: &str, i: usize) -> Option<f64> {
        self.column(name).and_then(|s| previous_at(s, i))
    }

    /// Boolean column: defined and non-zero
    pub fn flag(&self, name: &str, i: usize) -> bool {
        self.value(name, i).is_some_and(|v| v != 0.0)
    }
}
