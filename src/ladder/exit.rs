/// Reason code reported when a grid trade reaches its profit target
pub const GRID_PROFIT_TARGET_REACHED: &str = "grid_profit_target_reached";

/// Relative tolerance when comparing a proposed exit amount to the position
const AMOUNT_TOLERANCE: f64 = 1e-9;

/// How exit requests for a laddered trade are answered
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitPolicy {
    /// Exit (full or partial) only at or above this profit ratio
    ProfitTarget(f64),
    /// Leave exits to the host: confirm everything, never raise a reason
    HostDefault,
}

impl ExitPolicy {
    /// Target given in percent, as the grid settings declare it
    pub fn from_pct(profit_target_pct: f64) -> Self {
        ExitPolicy::ProfitTarget(profit_target_pct / 100.0)
    }

    pub fn target(&self) -> Option<f64> {
        match self {
            ExitPolicy::ProfitTarget(target) => Some(*target),
            ExitPolicy::HostDefault => None,
        }
    }

    /// True when `profit` meets the target; never for undefined profit
    pub fn target_met(&self, profit: f64) -> bool {
        match self {
            ExitPolicy::ProfitTarget(target) => profit.is_finite() && profit >= *target,
            ExitPolicy::HostDefault => false,
        }
    }
}

/// Size of a proposed exit relative to the open position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSize {
    Full,
    Partial,
    Invalid,
}

pub fn classify_exit(proposed: f64, position: f64) -> ExitSize {
    if !proposed.is_finite() || !position.is_finite() || proposed <= 0.0 || position <= 0.0 {
        return ExitSize::Invalid;
    }

    let tolerance = position * AMOUNT_TOLERANCE;
    if (proposed - position).abs() <= tolerance {
        ExitSize::Full
    } else if proposed < position {
        ExitSize::Partial
    } else {
        ExitSize::Invalid
    }
}
