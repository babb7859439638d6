// Core modules
pub mod config;
pub mod error;
pub mod indicators;
pub mod ladder;
pub mod logging;
pub mod models;
pub mod strategy;
pub mod synthetic;

// Re-export commonly used types
pub use error::StrategyError;
pub use ladder::{Adjustment, AdjustmentContext, MarketData, PositionLadder};
pub use models::*;
pub use strategy::Strategy;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
