use crate::models::Direction;

/// Where the next grid trigger is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAnchor {
    /// Most recent filled entry order on the trade
    FilledOrders,
    /// Last level registered for the pair in the grid registry
    Registry,
}

/// Fixed-percentage price grid
#[derive(Debug, Clone, PartialEq)]
pub struct PriceGrid {
    /// Percent spacing between long levels (price falling)
    pub long_pct: f64,
    /// Percent spacing between short levels (price rising)
    pub short_pct: f64,
    pub anchor: GridAnchor,
}

impl PriceGrid {
    pub fn spacing_pct(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Long => self.long_pct,
            Direction::Short => self.short_pct,
        }
    }

    /// Price at which the next tranche is added, None for unusable anchors
    pub fn trigger_price(&self, direction: Direction, last_entry_price: f64) -> Option<f64> {
        if !last_entry_price.is_finite() || last_entry_price <= 0.0 {
            return None;
        }

        let trigger = direction.adverse_shift(last_entry_price, self.spacing_pct(direction));
        (trigger.is_finite() && trigger > 0.0).then_some(trigger)
    }
}
