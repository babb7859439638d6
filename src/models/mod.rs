use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Open rates at or below this are treated as unusable for ratio math
const MIN_RATE: f64 = 1e-12;

/// OHLCV candlestick for one timeframe step of a pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub pair: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Typical price: (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Indicator values aligned to a candle sequence.
///
/// `None` marks the warm-up window or an undefined value.
pub type IndicatorSeries = Vec<Option<f64>>;

/// Per-candle entry/exit flags handed back to the host
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignalFlags {
    pub enter_long: bool,
    pub enter_short: bool,
    pub exit_long: bool,
    pub exit_short: bool,
}

impl SignalFlags {
    /// No entry and no exit
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !(self.enter_long || self.enter_short || self.exit_long || self.exit_short)
    }

    /// Host column layout: [enter_long, enter_short, exit_long, exit_short] as 0/1
    pub fn as_row(&self) -> [u8; 4] {
        [
            self.enter_long as u8,
            self.enter_short as u8,
            self.exit_long as u8,
            self.exit_short as u8,
        ]
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Shift `price` by `pct` percent against the position.
    ///
    /// Long positions lose when price falls, shorts when it rises.
    pub fn adverse_shift(self, price: f64, pct: f64) -> f64 {
        let change = pct / 100.0;
        match self {
            Direction::Long => price * (1.0 - change),
            Direction::Short => price * (1.0 + change),
        }
    }

    /// True once `rate` has reached or passed `trigger` in the adverse direction
    pub fn reached(self, rate: f64, trigger: f64) -> bool {
        match self {
            Direction::Long => rate <= trigger,
            Direction::Short => rate >= trigger,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Entry,
    Exit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Closed,
    Canceled,
}

/// Order record attached to a trade by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub side: OrderSide,
    pub status: OrderStatus,
    pub price: f64,
    pub amount: f64,
    pub filled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Entry order filled at `price` and `filled_at`
    pub fn filled_entry(price: f64, amount: f64, filled_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            side: OrderSide::Entry,
            status: OrderStatus::Closed,
            price,
            amount,
            filled_at: Some(filled_at),
        }
    }

    pub fn is_filled_entry(&self) -> bool {
        self.side == OrderSide::Entry && self.status == OrderStatus::Closed
    }
}

/// Read-only view of a host-owned trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub pair: String,
    pub open_rate: f64,            // Price of the first entry
    pub stake_amount: f64,         // Current total stake
    pub amount: f64,               // Current position size
    pub is_short: bool,
    pub nr_of_successful_entries: u32,
    pub open_date: DateTime<Utc>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Trade {
    pub fn direction(&self) -> Direction {
        if self.is_short {
            Direction::Short
        } else {
            Direction::Long
        }
    }

    /// Price of the most recently filled entry order.
    ///
    /// Falls back to `open_rate` before any entry is counted or when no
    /// filled entry order carries a fill time.
    pub fn last_filled_entry_price(&self) -> f64 {
        if self.nr_of_successful_entries == 0 {
            return self.open_rate;
        }

        self.orders
            .iter()
            .filter(|o| o.is_filled_entry())
            .filter_map(|o| o.filled_at.map(|at| (at, o.price)))
            .max_by_key(|(at, _)| *at)
            .map(|(_, price)| price)
            .unwrap_or(self.open_rate)
    }

    /// Stake of the first tranche.
    ///
    /// Taken from the earliest filled entry order, or the average tranche
    /// when orders carry no usable fill.
    pub fn initial_stake(&self) -> f64 {
        let first_fill = self
            .orders
            .iter()
            .filter(|o| o.is_filled_entry())
            .filter_map(|o| o.filled_at.map(|at| (at, o.price * o.amount)))
            .min_by_key(|(at, _)| *at)
            .map(|(_, cost)| cost)
            .filter(|cost| cost.is_finite() && *cost > 0.0);

        first_fill.unwrap_or(self.stake_amount / self.nr_of_successful_entries.max(1) as f64)
    }

    /// Blended entry price over every filled tranche.
    ///
    /// Falls back to `open_rate` when stake and amount cannot produce one.
    pub fn average_entry_price(&self) -> f64 {
        let blended = self.stake_amount / self.amount;
        if blended.is_finite() && blended > MIN_RATE {
            blended
        } else {
            self.open_rate
        }
    }

    /// Profit ratio at `rate` relative to the blended entry, fees excluded.
    ///
    /// Returns None when either price cannot produce a meaningful ratio.
    pub fn calc_profit_ratio(&self, rate: f64) -> Option<f64> {
        let entry = self.average_entry_price();
        if !rate.is_finite() || !entry.is_finite() || entry <= MIN_RATE {
            return None;
        }

        let ratio = match self.direction() {
            Direction::Long => rate / entry - 1.0,
            Direction::Short => 1.0 - rate / entry,
        };

        ratio.is_finite().then_some(ratio)
    }
}
