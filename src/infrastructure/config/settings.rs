//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; every section is optional and a
//! missing file means defaults. `REVPACE_STORE` overrides the store location.
//!
//! # Example
//!
//! ```no_run
//! use revpace::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::domain::capacity::{CapacityModel, DEFAULT_INVENTORY};
use crate::domain::forecast::{WeightingMethod, YieldThresholds};
use crate::domain::range::StayRange;
use crate::error::{ConfigError, Result};

/// Environment variable overriding `[storage] path`.
pub const STORE_ENV: &str = "REVPACE_STORE";

/// Snapshot store implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database file.
    #[default]
    Sqlite,
    /// Single long-format CSV file.
    Csv,
    /// Directory of wide CSV files, one per snapshot.
    Wide,
}

impl StorageBackend {
    /// File or directory name used when no path is configured.
    #[must_use]
    pub fn default_location(self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "revpace.db",
            StorageBackend::Csv => "reservas.csv",
            StorageBackend::Wide => "snapshots",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Csv => "csv",
            StorageBackend::Wide => "wide",
        };
        f.write_str(name)
    }
}

/// Where snapshots are persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Database file, CSV file or directory, depending on the backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured path, or the backend's default location under `home`.
    #[must_use]
    pub fn resolved_path(&self, home: &Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| home.join(self.backend.default_location()))
    }
}

/// Price forecast settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub method: WeightingMethod,
    /// Occupancy percent at or above which prices rise the most.
    pub high_threshold: u8,
    /// Occupancy percent below which prices are discounted.
    pub low_threshold: u8,
    pub season_start: NaiveDate,
    pub season_end: NaiveDate,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        let thresholds = YieldThresholds::default();
        Self {
            method: WeightingMethod::default(),
            high_threshold: thresholds.high(),
            low_threshold: thresholds.low(),
            season_start: NaiveDate::from_ymd_opt(2026, 5, 15).unwrap_or_default(),
            season_end: NaiveDate::from_ymd_opt(2026, 9, 13).unwrap_or_default(),
        }
    }
}

impl ForecastConfig {
    /// Validated thresholds.
    pub fn thresholds(&self) -> Result<YieldThresholds> {
        YieldThresholds::try_new(self.high_threshold, self.low_threshold).map_err(|e| {
            ConfigError::InvalidValue {
                field: "forecast.thresholds",
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validated season window.
    pub fn season(&self) -> Result<StayRange> {
        StayRange::try_new(self.season_start, self.season_end).map_err(|e| {
            ConfigError::InvalidValue {
                field: "forecast.season",
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn default_capacity() -> BTreeMap<String, u32> {
    DEFAULT_INVENTORY
        .iter()
        .map(|(code, units)| ((*code).to_string(), *units))
        .collect()
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Units per room type. Also the set of room-type columns read from uploads.
    #[serde(default = "default_capacity")]
    pub capacity: BTreeMap<String, u32>,

    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            capacity: default_capacity(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => Self::parse_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Self::default();
                config.apply_env();
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFile(e).into()),
        }
    }

    fn apply_env(&mut self) {
        if let Some(path) = std::env::var_os(STORE_ENV).filter(|v| !v.is_empty()) {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("'{}' is not one of: pretty, json", self.logging.format),
            }
            .into());
        }
        if self.capacity.is_empty() {
            return Err(ConfigError::MissingField { field: "capacity" }.into());
        }
        self.capacity_model()?;
        self.forecast.thresholds()?;
        self.forecast.season()?;
        Ok(())
    }

    /// Build the room-type inventory.
    pub fn capacity_model(&self) -> Result<CapacityModel> {
        CapacityModel::try_new(self.capacity.iter().map(|(code, units)| (code, *units))).map_err(
            |e| {
                ConfigError::InvalidValue {
                    field: "capacity",
                    reason: e.to_string(),
                }
                .into()
            },
        )
    }

    /// Initialize the tracing subscriber with this configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Render as TOML, for `config show`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::InvalidValue {
                field: "config",
                reason: e.to_string(),
            }
            .into()
        })
    }
}
