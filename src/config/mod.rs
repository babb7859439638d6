use ::config::{Config as ConfigLoader, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

use crate::error::StrategyError;

/// Environment prefix, e.g. `GRIDBOT__GRID__MAX_GRID_LEVELS=8`
const ENV_PREFIX: &str = "GRIDBOT";
const DEFAULT_CONFIG_NAME: &str = "gridbot";

/// Tunable parameters of every strategy, validated once at startup
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub short_grid: ShortGridSettings,
    #[serde(default)]
    pub rsi_short: RsiShortSettings,
    #[serde(default)]
    pub random_entry: RandomEntrySettings,
}

/// Long/short grid bot
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridSettings {
    /// Percent drop between long grid levels
    pub grid_buy_pct: f64,
    /// Percent rise between short grid levels
    pub grid_sell_pct: f64,
    pub max_grid_levels: u32,
    pub profit_target_pct: f64,
    /// Profit ratio at which the whole stake is released
    pub stoploss: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            grid_buy_pct: 1.0,
            grid_sell_pct: 1.0,
            max_grid_levels: 5,
            profit_target_pct: 1.0,
            stoploss: -1.0,
        }
    }
}

/// Short-only grid bot driven by registered price levels
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShortGridSettings {
    pub grid_short_entry_pct: f64,
    pub profit_target_pct: f64,
    pub max_grid_levels: u32,
    pub stoploss: f64,
}

impl Default for ShortGridSettings {
    fn default() -> Self {
        Self {
            grid_short_entry_pct: 1.0,
            profit_target_pct: 1.0,
            max_grid_levels: 5,
            stoploss: -1.0,
        }
    }
}

/// RSI short strategy with profit-threshold averaging
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RsiShortSettings {
    pub short_rsi: u32,
    pub max_dca_adjustments: u32,
    pub stoploss_threshold: f64,
    pub dca_threshold_1: f64,
    pub dca_threshold_2: f64,
    pub dca_threshold_3: f64,
    pub dca_multiplier_1: f64,
    pub dca_multiplier_2: f64,
    pub dca_multiplier_3: f64,
}

impl Default for RsiShortSettings {
    fn default() -> Self {
        Self {
            short_rsi: 70,
            max_dca_adjustments: 5,
            stoploss_threshold: -1.0,
            dca_threshold_1: -1.0,
            dca_threshold_2: -2.0,
            dca_threshold_3: -4.0,
            dca_multiplier_1: 1.0,
            dca_multiplier_2: 2.0,
            dca_multiplier_3: 2.0,
        }
    }
}

impl RsiShortSettings {
    /// (profit threshold, stake multiplier) pairs in declaration order
    pub fn tiers(&self) -> [(f64, f64); 3] {
        [
            (self.dca_threshold_1, self.dca_multiplier_1),
            (self.dca_threshold_2, self.dca_multiplier_2),
            (self.dca_threshold_3, self.dca_multiplier_3),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RandomEntrySettings {
    /// Chance that a candle's draw goes long rather than short
    pub long_probability: f64,
}

impl Default for RandomEntrySettings {
    fn default() -> Self {
        Self {
            long_probability: 0.5,
        }
    }
}

fn check(name: &'static str, value: f64, low: f64, high: f64) -> Result<(), StrategyError> {
    if value.is_finite() && (low..=high).contains(&value) {
        Ok(())
    } else {
        Err(StrategyError::OutOfBounds {
            name,
            value,
            low,
            high,
        })
    }
}

impl Settings {
    /// Load from an optional file, then `GRIDBOT__*` environment overrides.
    ///
    /// Without `path`, `gridbot.{toml,json,yaml}` in the working directory is
    /// used when present. A `.env` file is read first.
    pub fn load(path: Option<&Path>) -> Result<Self, StrategyError> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => File::from(path).required(false),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings: Settings = ConfigLoader::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::info!("Loaded strategy settings: {:?}", settings);
        Ok(settings)
    }

    /// Parse TOML supplied by the host, without touching the environment
    pub fn from_toml_str(source: &str) -> Result<Self, StrategyError> {
        let settings: Settings = ConfigLoader::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check every tunable against its declared bounds
    pub fn validate(&self) -> Result<(), StrategyError> {
        let grid = &self.grid;
        check("grid.grid_buy_pct", grid.grid_buy_pct, 0.5, 5.0)?;
        check("grid.grid_sell_pct", grid.grid_sell_pct, 0.5, 5.0)?;
        check("grid.max_grid_levels", grid.max_grid_levels as f64, 2.0, 20.0)?;
        check("grid.profit_target_pct", grid.profit_target_pct, 0.5, 5.0)?;
        check("grid.stoploss", grid.stoploss, -1.0, 0.0)?;

        let short_grid = &self.short_grid;
        check("short_grid.grid_short_entry_pct", short_grid.grid_short_entry_pct, 0.5, 5.0)?;
        check("short_grid.profit_target_pct", short_grid.profit_target_pct, 0.5, 5.0)?;
        check("short_grid.max_grid_levels", short_grid.max_grid_levels as f64, 2.0, 20.0)?;
        check("short_grid.stoploss", short_grid.stoploss, -1.0, 0.0)?;

        let rsi = &self.rsi_short;
        check("rsi_short.short_rsi", rsi.short_rsi as f64, 60.0, 90.0)?;
        check("rsi_short.max_dca_adjustments", rsi.max_dca_adjustments as f64, 1.0, 10.0)?;
        check("rsi_short.stoploss_threshold", rsi.stoploss_threshold, -1.0, -0.1)?;
        check("rsi_short.dca_threshold_1", rsi.dca_threshold_1, -10.0, 10.0)?;
        check("rsi_short.dca_threshold_2", rsi.dca_threshold_2, -10.0, 10.0)?;
        check("rsi_short.dca_threshold_3", rsi.dca_threshold_3, -10.0, 10.0)?;
        check("rsi_short.dca_multiplier_1", rsi.dca_multiplier_1, 1.0, 3.0)?;
        check("rsi_short.dca_multiplier_2", rsi.dca_multiplier_2, 1.0, 3.0)?;
        check("rsi_short.dca_multiplier_3", rsi.dca_multiplier_3, 1.0, 3.0)?;

        check(
            "random_entry.long_probability",
            self.random_entry.long_probability,
            0.1,
            0.9,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.grid.max_grid_levels, 5);
        assert_eq!(settings.rsi_short.short_rsi, 70);
    }

    #[test]
    fn test_out_of_bounds_grid_pct() {
        let mut settings = Settings::default();
        settings.grid.grid_buy_pct = 7.5;

        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            StrategyError::OutOfBounds {
                name: "grid.grid_buy_pct",
                ..
            }
        ));
        assert!(err.to_string().contains("outside bounds"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut settings = Settings::default();
        settings.grid.max_grid_levels = 20;
        settings.short_grid.max_grid_levels = 2;
        settings.random_entry.long_probability = 0.9;
        assert!(settings.validate().is_ok());

        settings.short_grid.max_grid_levels = 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_nan_is_a_violation() {
        let mut settings = Settings::default();
        settings.rsi_short.dca_multiplier_2 = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial_override() {
        let settings = Settings::from_toml_str(
            r#"
            [grid]
            grid_buy_pct = 2.5
            max_grid_levels = 8

            [rsi_short]
            dca_threshold_1 = -0.1
            "#,
        )
        .unwrap();

        assert_eq!(settings.grid.grid_buy_pct, 2.5);
        assert_eq!(settings.grid.max_grid_levels, 8);
        assert_eq!(settings.grid.grid_sell_pct, 1.0);
        assert_eq!(settings.rsi_short.dca_threshold_1, -0.1);
        assert_eq!(settings.short_grid, ShortGridSettings::default());
    }

    #[test]
    fn test_from_toml_rejects_out_of_bounds() {
        let result = Settings::from_toml_str(
            r#"
            [random_entry]
            long_probability = 0.95
            "#,
        );
        assert!(matches!(result, Err(StrategyError::OutOfBounds { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("gridbot-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[short_grid]\ngrid_short_entry_pct = 1.5\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.short_grid.grid_short_entry_pct, 1.5);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join(format!("gridbot-missing-{}.toml", uuid::Uuid::new_v4()));
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.random_entry.long_probability, 0.5);
    }
}
