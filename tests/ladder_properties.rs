//! Property tests for position ladder invariants.
//!
//! Uses proptest to verify:
//! 1. Grid triggers are inclusive at the exact trigger price
//! 2. Ladder depth never exceeds the configured maximum
//! 3. The stoploss floor releases the whole stake at any depth
//! 4. Exit confirmation follows the profit target for any exit size

use chrono::{Duration, TimeZone, Utc};
use gridbot::config::{GridSettings, RsiShortSettings};
use gridbot::ladder::LadderConfig;
use gridbot::synthetic::SyntheticCandles;
use gridbot::{Adjustment, AdjustmentContext, Direction, Order, PositionLadder, Trade};
use proptest::prelude::*;
use uuid::Uuid;

const TRANCHE: f64 = 100.0;

fn open_trade(is_short: bool, open_rate: f64) -> Trade {
    let opened = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let amount = TRANCHE / open_rate;
    Trade {
        id: Uuid::new_v4(),
        pair: "SOL/USDT".to_string(),
        open_rate,
        stake_amount: TRANCHE,
        amount,
        is_short,
        nr_of_successful_entries: 1,
        open_date: opened,
        orders: vec![Order::filled_entry(open_rate, amount, opened)],
    }
}

/// Host side of an add: fill at `rate` and fold it into the trade
fn apply_add(trade: &mut Trade, stake: f64, rate: f64, step: i64) {
    let amount = stake / rate;
    let at = trade.open_date + Duration::minutes(step);
    trade.orders.push(Order::filled_entry(rate, amount, at));
    trade.nr_of_successful_entries += 1;
    trade.stake_amount += stake;
    trade.amount += amount;
}

fn grid_ladder(pct: f64, max_levels: u32) -> PositionLadder {
    PositionLadder::new(LadderConfig::grid(&GridSettings {
        grid_buy_pct: pct,
        grid_sell_pct: pct,
        max_grid_levels: max_levels,
        ..GridSettings::default()
    }))
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..10_000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_grid_pct() -> impl Strategy<Value = f64> {
    (0.1..10.0_f64).prop_map(|g| (g * 10.0).round() / 10.0)
}

// ── 1. Trigger inclusivity ───────────────────────────────────────────

proptest! {
    #[test]
    fn trigger_is_inclusive(price in arb_price(), pct in arb_grid_pct(), is_short in any::<bool>()) {
        let candles = SyntheticCandles::from_closes("SOL/USDT", &[price], 5);
        let mut ladder = grid_ladder(pct, 5);
        let trade = open_trade(is_short, price);

        let direction = if is_short { Direction::Short } else { Direction::Long };
        let trigger = direction.adverse_shift(price, pct);

        let ctx = AdjustmentContext::new(trigger, -0.001, 1e12).with_candles(&candles);
        prop_assert!(ladder.evaluate_adjustment(&trade, &ctx).is_some());

        // Just short of the trigger on the favourable side
        let before = match direction {
            Direction::Long => trigger * (1.0 + 1e-9),
            Direction::Short => trigger * (1.0 - 1e-9),
        };
        let ctx = AdjustmentContext::new(before, -0.001, 1e12).with_candles(&candles);
        prop_assert!(ladder.evaluate_adjustment(&trade, &ctx).is_none());
    }
}

// ── 2. Depth bound ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn depth_never_exceeds_max(
        max_levels in 1u32..8,
        moves in prop::collection::vec(-0.03..0.01_f64, 1..60),
    ) {
        let candles = SyntheticCandles::from_closes("SOL/USDT", &[100.0], 5);
        let mut ladder = grid_ladder(1.0, max_levels);
        let mut trade = open_trade(false, 100.0);
        let mut rate = 100.0;
        let mut depth = trade.nr_of_successful_entries;

        for (step, change) in moves.iter().enumerate() {
            rate = (rate * (1.0 + change)).max(50.0);
            let profit = trade.calc_profit_ratio(rate).unwrap();
            let ctx = AdjustmentContext::new(rate, profit, 1e6).with_candles(&candles);

            match ladder.evaluate_adjustment(&trade, &ctx) {
                Some(Adjustment::Add { stake }) => {
                    prop_assert!(trade.nr_of_successful_entries < max_levels);
                    prop_assert!((stake - TRANCHE).abs() < 1e-6);
                    apply_add(&mut trade, stake, rate, step as i64 + 1);
                }
                Some(Adjustment::CloseAll { .. }) => prop_assert!(false, "floor is out of reach"),
                None => {}
            }

            prop_assert!(trade.nr_of_successful_entries >= depth);
            prop_assert!(trade.nr_of_successful_entries <= max_levels.max(1));
            depth = trade.nr_of_successful_entries;
        }

        if trade.nr_of_successful_entries >= max_levels {
            let ctx = AdjustmentContext::new(rate * 0.5, -0.5, 1e6).with_candles(&candles);
            prop_assert!(ladder.evaluate_adjustment(&trade, &ctx).is_none());
        }
    }
}

// ── 3. Stoploss floor ────────────────────────────────────────────────

proptest! {
    #[test]
    fn floor_releases_whole_stake(
        entries in 1u32..10,
        stake in 1.0..10_000.0_f64,
        below in 0.0..1.0_f64,
    ) {
        let mut ladder = PositionLadder::new(LadderConfig::rsi_short(&RsiShortSettings {
            stoploss_threshold: -0.5,
            max_dca_adjustments: 3,
            ..RsiShortSettings::default()
        }));
        let mut trade = open_trade(true, 100.0);
        trade.nr_of_successful_entries = entries;
        trade.stake_amount = stake;

        let ctx = AdjustmentContext::new(180.0, -0.5 - below, 1e6);
        prop_assert_eq!(
            ladder.evaluate_adjustment(&trade, &ctx),
            Some(Adjustment::CloseAll { stake })
        );
    }
}

// ── 4. Exit confirmation ─────────────────────────────────────────────

proptest! {
    #[test]
    fn exit_follows_profit_target(
        profit in -0.5..0.5_f64,
        fraction in 0.01..1.0_f64,
    ) {
        let ladder = grid_ladder(1.0, 5);
        let trade = open_trade(false, 100.0);

        let full = ladder.confirm_exit(&trade, trade.amount, 100.0, profit);
        let partial = ladder.confirm_exit(&trade, trade.amount * fraction, 100.0, profit);

        prop_assert_eq!(full, profit >= 0.01);
        prop_assert_eq!(partial, profit >= 0.01);
    }
}
