/// One averaging step: add `multiplier` x stake once profit falls to `threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcaTier {
    pub threshold: f64,
    pub multiplier: f64,
}

/// Profit-threshold averaging table, most adverse threshold first
#[derive(Debug, Clone, PartialEq)]
pub struct DcaTable {
    tiers: Vec<DcaTier>,
}

impl DcaTable {
    /// Build from (threshold, multiplier) pairs in any order.
    ///
    /// Pairs with a non-finite value are dropped.
    pub fn new(tiers: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut tiers: Vec<DcaTier> = tiers
            .into_iter()
            .filter(|(t, m)| t.is_finite() && m.is_finite())
            .map(|(threshold, multiplier)| DcaTier {
                threshold,
                multiplier,
            })
            .collect();
        tiers.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));

        Self { tiers }
    }

    pub fn tiers(&self) -> &[DcaTier] {
        &self.tiers
    }

    /// The most adverse tier that `profit` has breached
    pub fn select(&self, profit: f64) -> Option<&DcaTier> {
        if !profit.is_finite() {
            return None;
        }
        self.tiers.iter().find(|tier| profit <= tier.threshold)
    }
}
