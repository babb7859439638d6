use thiserror::Error;

/// Errors surfaced to the host at startup or through its error channel
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("parameter {name} = {value} outside bounds [{low}, {high}]")]
    OutOfBounds {
        name: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("grid ladder for {pair} already holds {levels} levels (max {max})")]
    LadderDepthExceeded {
        pair: String,
        levels: usize,
        max: usize,
    },

    #[error("random source unavailable: {0}")]
    RandomSource(String),
}
