use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::error::StrategyError;
use crate::models::Trade;

/// Price ladder of one pair's open trade
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridLevelState {
    /// Trade that owns this ladder
    pub trade_id: Uuid,
    pub base_price: f64,
    /// Registered levels, base price first, monotonic against the position
    pub levels: Vec<f64>,
    /// Realized profit ratio keyed by level count at exit time
    pub level_profits: BTreeMap<usize, f64>,
}

impl GridLevelState {
    fn for_trade(trade: &Trade) -> Self {
        Self {
            trade_id: trade.id,
            base_price: trade.open_rate,
            levels: vec![trade.open_rate],
            level_profits: BTreeMap::new(),
        }
    }

    /// Most recently registered level
    pub fn last_level(&self) -> f64 {
        self.levels.last().copied().unwrap_or(self.base_price)
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}

/// Per-pair grid ladders, created on first use and released on full close
#[derive(Debug, Default)]
pub struct GridRegistry {
    pairs: HashMap<String, GridLevelState>,
}

impl GridRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pair: &str) -> Option<&GridLevelState> {
        self.pairs.get(pair)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Ladder for `trade`'s pair.
    ///
    /// Created lazily. A ladder left behind by an earlier trade on the same
    /// pair is discarded and rebuilt from this trade's open rate.
    pub fn state_for(&mut self, trade: &Trade) -> &mut GridLevelState {
        let state = self
            .pairs
            .entry(trade.pair.clone())
            .or_insert_with(|| {
                tracing::debug!(
                    "🔍 New grid ladder for {} at base {:.6}",
                    trade.pair,
                    trade.open_rate
                );
                GridLevelState::for_trade(trade)
            });

        if state.trade_id != trade.id {
            tracing::warn!(
                "Stale grid ladder for {} (trade {} vs {}, {} levels), rebuilding",
                trade.pair,
                state.trade_id,
                trade.id,
                state.depth()
            );
            *state = GridLevelState::for_trade(trade);
        }

        state
    }

    /// Append `price` to the trade's ladder, refusing to grow past `max_levels`.
    ///
    /// Returns the new depth.
    pub fn register_level(
        &mut self,
        trade: &Trade,
        price: f64,
        max_levels: usize,
    ) -> Result<usize, StrategyError> {
        let state = self.state_for(trade);

        if state.depth() >= max_levels {
            return Err(StrategyError::LadderDepthExceeded {
                pair: trade.pair.clone(),
                levels: state.depth(),
                max: max_levels,
            });
        }

        state.levels.push(price);
        Ok(state.depth())
    }

    /// Record `profit` against the pair's current level count
    pub fn record_level_profit(&mut self, trade: &Trade, profit: f64) -> usize {
        let state = self.state_for(trade);
        let level = state.depth();
        state.level_profits.insert(level, profit);
        level
    }

    /// Forget the pair's ladder once its trade has fully closed
    pub fn release(&mut self, pair: &str) -> Option<GridLevelState> {
        let released = self.pairs.remove(pair);
        if let Some(state) = &released {
            tracing::debug!(
                "Released grid ladder for {} ({} levels, {} profit records)",
                pair,
                state.depth(),
                state.level_profits.len()
            );
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_trade(pair: &str, open_rate: f64) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            pair: pair.to_string(),
            open_rate,
            stake_amount: 100.0,
            amount: 1.0,
            is_short: true,
            nr_of_successful_entries: 1,
            open_date: Utc::now(),
            orders: vec![],
        }
    }

    #[test]
    fn test_lazy_creation() {
        let mut registry = GridRegistry::new();
        let trade = create_trade("SOL/USDT", 20.0);

        assert!(registry.get("SOL/USDT").is_none());
        let state = registry.state_for(&trade);
        assert_eq!(state.levels, vec![20.0]);
        assert_eq!(state.last_level(), 20.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_until_full() {
        let mut registry = GridRegistry::new();
        let trade = create_trade("SOL/USDT", 20.0);

        assert_eq!(registry.register_level(&trade, 20.2, 3).unwrap(), 2);
        assert_eq!(registry.register_level(&trade, 20.402, 3).unwrap(), 3);

        let err = registry.register_level(&trade, 20.6, 3).unwrap_err();
        assert!(matches!(
            err,
            StrategyError::LadderDepthExceeded { levels: 3, max: 3, .. }
        ));
        assert_eq!(registry.get("SOL/USDT").unwrap().depth(), 3);
    }

    #[test]
    fn test_new_trade_rebuilds_stale_ladder() {
        let mut registry = GridRegistry::new();
        let first = create_trade("SOL/USDT", 20.0);
        registry.register_level(&first, 20.2, 5).unwrap();

        let second = create_trade("SOL/USDT", 25.0);
        let state = registry.state_for(&second);
        assert_eq!(state.trade_id, second.id);
        assert_eq!(state.levels, vec![25.0]);
    }

    #[test]
    fn test_level_profit_keyed_by_depth() {
        let mut registry = GridRegistry::new();
        let trade = create_trade("SOL/USDT", 20.0);
        registry.register_level(&trade, 20.2, 5).unwrap();

        assert_eq!(registry.record_level_profit(&trade, 0.012), 2);
        let state = registry.get("SOL/USDT").unwrap();
        assert_eq!(state.level_profits.get(&2), Some(&0.012));
    }

    #[test]
    fn test_release() {
        let mut registry = GridRegistry::new();
        let trade = create_trade("SOL/USDT", 20.0);
        registry.state_for(&trade);

        let released = registry.release("SOL/USDT").unwrap();
        assert_eq!(released.base_price, 20.0);
        assert!(registry.is_empty());
        assert!(registry.release("SOL/USDT").is_none());
    }

    #[test]
    fn test_pairs_are_independent() {
        let mut registry = GridRegistry::new();
        let sol = create_trade("SOL/USDT", 20.0);
        let eth = create_trade("ETH/USDT", 3000.0);

        registry.register_level(&sol, 20.2, 5).unwrap();
        registry.state_for(&eth);

        assert_eq!(registry.get("SOL/USDT").unwrap().depth(), 2);
        assert_eq!(registry.get("ETH/USDT").unwrap().depth(), 1);
    }
}
