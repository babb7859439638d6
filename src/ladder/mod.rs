// Position ladder module
// Grid/DCA stake adjustment and exit confirmation for open trades

pub mod dca;
pub mod exit;
pub mod grid;
pub mod registry;

pub use dca::{DcaTable, DcaTier};
pub use exit::{classify_exit, ExitPolicy, ExitSize, GRID_PROFIT_TARGET_REACHED};
pub use grid::{GridAnchor, PriceGrid};
pub use registry::{GridLevelState, GridRegistry};

use crate::config::{GridSettings, RsiShortSettings, ShortGridSettings};
use crate::models::{Candle, Trade};

/// Market data the host may or may not hand over with an adjustment call
#[derive(Debug, Clone, Copy, Default)]
pub enum MarketData<'a> {
    #[default]
    Absent,
    Candles(&'a [Candle]),
}

impl MarketData<'_> {
    pub fn is_available(&self) -> bool {
        matches!(self, MarketData::Candles(candles) if !candles.is_empty())
    }
}

/// Inputs of one adjustment evaluation
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentContext<'a> {
    pub current_rate: f64,
    pub current_profit: f64,
    pub min_stake: Option<f64>,
    pub max_stake: f64,
    pub market: MarketData<'a>,
}

impl<'a> AdjustmentContext<'a> {
    pub fn new(current_rate: f64, current_profit: f64, max_stake: f64) -> Self {
        Self {
            current_rate,
            current_profit,
            min_stake: None,
            max_stake,
            market: MarketData::Absent,
        }
    }

    pub fn with_min_stake(mut self, min_stake: f64) -> Self {
        self.min_stake = Some(min_stake);
        self
    }

    pub fn with_candles(mut self, candles: &'a [Candle]) -> Self {
        self.market = MarketData::Candles(candles);
        self
    }
}

/// Stake change requested from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Add a tranche of this stake
    Add { stake: f64 },
    /// Release the whole position; `stake` is the trade's current stake
    CloseAll { stake: f64 },
}

impl Adjustment {
    /// Signed stake delta: positive adds, negative reduces
    pub fn delta(&self) -> f64 {
        match self {
            Adjustment::Add { stake } => *stake,
            Adjustment::CloseAll { stake } => -*stake,
        }
    }
}

/// How a ladder decides to add stake
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustmentPolicy {
    /// Add the first tranche's stake each time price moves a grid step
    PriceGrid(PriceGrid),
    /// Add a multiple of the current stake at profit thresholds
    ProfitDca(DcaTable),
}

/// Everything a ladder needs to know, fixed for a trade's life
#[derive(Debug, Clone, PartialEq)]
pub struct LadderConfig {
    /// Profit ratio at or below which the whole stake is released
    pub stoploss_floor: f64,
    /// Maximum successful entries per trade, first entry included
    pub max_levels: u32,
    pub policy: AdjustmentPolicy,
    pub exit: ExitPolicy,
}

impl LadderConfig {
    /// Long/short grid anchored on filled entry orders
    pub fn grid(settings: &GridSettings) -> Self {
        Self {
            stoploss_floor: settings.stoploss,
            max_levels: settings.max_grid_levels,
            policy: AdjustmentPolicy::PriceGrid(PriceGrid {
                long_pct: settings.grid_buy_pct,
                short_pct: settings.grid_sell_pct,
                anchor: GridAnchor::FilledOrders,
            }),
            exit: ExitPolicy::from_pct(settings.profit_target_pct),
        }
    }

    /// Short grid anchored on the per-pair level registry
    pub fn short_grid(settings: &ShortGridSettings) -> Self {
        Self {
            stoploss_floor: settings.stoploss,
            max_levels: settings.max_grid_levels,
            policy: AdjustmentPolicy::PriceGrid(PriceGrid {
                long_pct: settings.grid_short_entry_pct,
                short_pct: settings.grid_short_entry_pct,
                anchor: GridAnchor::Registry,
            }),
            exit: ExitPolicy::from_pct(settings.profit_target_pct),
        }
    }

    /// Profit-threshold averaging; exits are left to the host's ROI
    pub fn rsi_short(settings: &RsiShortSettings) -> Self {
        Self {
            stoploss_floor: settings.stoploss_threshold,
            max_levels: settings.max_dca_adjustments,
            policy: AdjustmentPolicy::ProfitDca(DcaTable::new(settings.tiers())),
            exit: ExitPolicy::HostDefault,
        }
    }
}

/// Cap a positive stake at `max_stake`, lifting it to `min_stake` when set.
///
/// None when no valid stake fits between the two.
fn clamp_stake(stake: f64, min_stake: Option<f64>, max_stake: f64) -> Option<f64> {
    if !stake.is_finite() || stake <= 0.0 || !max_stake.is_finite() || max_stake <= 0.0 {
        return None;
    }

    let capped = stake.min(max_stake);
    match min_stake.filter(|m| m.is_finite() && *m > 0.0) {
        Some(min) if min > max_stake => None,
        Some(min) => Some(capped.max(min)),
        None => Some(capped),
    }
}

/// Per-trade stake adjustment and exit confirmation
///
/// Invoked by the host once per open trade per evaluation tick. All
/// decisions are pure over their inputs except for the grid registry,
/// which tracks registered levels per pair for registry-anchored grids.
/// The ladder does no locking; hosts evaluating one pair from several
/// threads must serialise calls.
#[derive(Debug)]
pub struct PositionLadder {
    config: LadderConfig,
    registry: GridRegistry,
}

impl PositionLadder {
    pub fn new(config: LadderConfig) -> Self {
        Self::with_registry(config, GridRegistry::new())
    }

    /// Ladder sharing an existing registry, e.g. one restored by the host
    pub fn with_registry(config: LadderConfig, registry: GridRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &LadderConfig {
        &self.config
    }

    pub fn registry(&self) -> &GridRegistry {
        &self.registry
    }

    /// Decide whether to add to, or fully release, `trade`'s stake
    pub fn evaluate_adjustment(
        &mut self,
        trade: &Trade,
        ctx: &AdjustmentContext<'_>,
    ) -> Option<Adjustment> {
        if !ctx.current_rate.is_finite() || !ctx.current_profit.is_finite() {
            tracing::debug!(
                "Skipping adjustment for {}: rate={} profit={}",
                trade.pair,
                ctx.current_rate,
                ctx.current_profit
            );
            return None;
        }

        if ctx.current_profit <= self.config.stoploss_floor {
            if !trade.stake_amount.is_finite() {
                tracing::error!("Trade {} has no usable stake to release", trade.id);
                return None;
            }
            tracing::info!(
                "🛑 Stoploss floor hit for {}: profit {:.2}% <= {:.2}%, releasing stake {:.4}",
                trade.pair,
                ctx.current_profit * 100.0,
                self.config.stoploss_floor * 100.0,
                trade.stake_amount
            );
            return Some(Adjustment::CloseAll {
                stake: trade.stake_amount,
            });
        }

        if trade.nr_of_successful_entries >= self.config.max_levels {
            tracing::debug!(
                "Ladder for {} full: {}/{} entries",
                trade.pair,
                trade.nr_of_successful_entries,
                self.config.max_levels
            );
            return None;
        }

        let stake = match &self.config.policy {
            AdjustmentPolicy::PriceGrid(grid) => {
                // Registry levels need no candles; order-anchored grids do
                if grid.anchor == GridAnchor::FilledOrders && !ctx.market.is_available() {
                    tracing::debug!(
                        "No market data for {}, profit-only checks applied",
                        trade.pair
                    );
                    return None;
                }
                let grid = grid.clone();
                self.price_grid_stake(&grid, trade, ctx.current_rate)?
            }
            AdjustmentPolicy::ProfitDca(table) => {
                let tier = table.select(ctx.current_profit)?;
                tracing::debug!(
                    "DCA tier {:.2}% breached for {} at {:.2}%, x{}",
                    tier.threshold * 100.0,
                    trade.pair,
                    ctx.current_profit * 100.0,
                    tier.multiplier
                );
                trade.stake_amount * tier.multiplier
            }
        };

        let stake = clamp_stake(stake, ctx.min_stake, ctx.max_stake)?;
        tracing::info!(
            "💰 Adding {:.4} stake to {} (entry {} of {})",
            stake,
            trade.pair,
            trade.nr_of_successful_entries + 1,
            self.config.max_levels
        );
        Some(Adjustment::Add { stake })
    }

    /// Raw stake of the next grid tranche, before min/max clamping
    fn price_grid_stake(&mut self, grid: &PriceGrid, trade: &Trade, current_rate: f64) -> Option<f64> {
        let direction = trade.direction();
        let last_entry = match grid.anchor {
            GridAnchor::FilledOrders => trade.last_filled_entry_price(),
            GridAnchor::Registry => self.registry.state_for(trade).last_level(),
        };
        let trigger = grid.trigger_price(direction, last_entry)?;

        if !direction.reached(current_rate, trigger) {
            return None;
        }

        if grid.anchor == GridAnchor::Registry {
            let max_levels = self.config.max_levels as usize;
            if let Err(e) = self.registry.register_level(trade, trigger, max_levels) {
                tracing::warn!("Grid ladder ahead of host fills: {}", e);
                return None;
            }
        }

        tracing::debug!(
            "Grid step for {} ({:?}): rate {:.6} reached trigger {:.6} from {:.6}",
            trade.pair,
            direction,
            current_rate,
            trigger,
            last_entry
        );

        Some(trade.initial_stake())
    }

    /// Approve or veto a host exit of `amount` at `current_profit`.
    ///
    /// Full and partial exits share the profit target; amounts that are
    /// not a positive part of the position are refused.
    pub fn confirm_exit(
        &self,
        trade: &Trade,
        amount: f64,
        current_rate: f64,
        current_profit: f64,
    ) -> bool {
        let ExitPolicy::ProfitTarget(target) = self.config.exit else {
            return true;
        };

        let size = classify_exit(amount, trade.amount);
        let approved = match size {
            ExitSize::Full | ExitSize::Partial => self.config.exit.target_met(current_profit),
            ExitSize::Invalid => false,
        };

        tracing::debug!(
            "Exit {:?} of {} for {} at {:.6}: profit {:.2}% vs target {:.2}% -> {}",
            size,
            amount,
            trade.pair,
            current_rate,
            current_profit * 100.0,
            target * 100.0,
            if approved { "approved" } else { "denied" }
        );

        approved
    }

    /// [`confirm_exit`](Self::confirm_exit) with the profit taken from the trade at `rate`
    pub fn confirm_exit_at_rate(&self, trade: &Trade, amount: f64, rate: f64) -> bool {
        match trade.calc_profit_ratio(rate) {
            Some(profit) => self.confirm_exit(trade, amount, rate, profit),
            None => self.config.exit == ExitPolicy::HostDefault,
        }
    }

    /// Reason code once the profit target is reached.
    ///
    /// Registry-anchored grids also record the profit against the pair's
    /// current level count.
    pub fn custom_exit_reason(
        &mut self,
        trade: &Trade,
        current_rate: f64,
        current_profit: f64,
    ) -> Option<&'static str> {
        if !self.config.exit.target_met(current_profit) {
            return None;
        }

        if let AdjustmentPolicy::PriceGrid(PriceGrid {
            anchor: GridAnchor::Registry,
            ..
        }) = self.config.policy
        {
            let level = self.registry.record_level_profit(trade, current_profit);
            tracing::debug!("Recorded level {} profit for {}", level, trade.pair);
        }

        tracing::info!(
            "🎯 Profit target reached for {} at {:.6}: {:.2}%",
            trade.pair,
            current_rate,
            current_profit * 100.0
        );
        Some(GRID_PROFIT_TARGET_REACHED)
    }

    /// Drop the pair's grid state once the host has fully closed its trade
    pub fn release(&mut self, pair: &str) -> Option<GridLevelState> {
        self.registry.release(pair)
    }
}
