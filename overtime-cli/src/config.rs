//! Optional TOML configuration.
//!
//! Every section and key is optional; missing values keep their defaults.
//!
//! ```toml
//! log_level = "debug"
//!
//! [policy]
//! standard_annual_hours = "1950"
//! overtime_premium = "1.5"
//!
//! [validation]
//! min_annual_salary = "100000"
//! max_annual_salary = "5000000"
//! high_overtime_hours = "100"
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "overtime.db"
//!
//! [rates]
//! dir = "rates/"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use overtime_core::db::DbConfig;
use overtime_core::{OvertimePolicy, ValidationLimits};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let DbConfig {
            backend,
            connection_string,
        } = DbConfig::default();
        Self {
            backend,
            connection_string,
        }
    }
}

impl From<DatabaseSection> for DbConfig {
    fn from(section: DatabaseSection) -> Self {
        DbConfig {
            backend: section.backend,
            connection_string: section.connection_string,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RatesSection {
    /// Directory with `brackets.csv` and `years.csv`. Built-in tables when unset.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: Option<String>,
    pub policy: OvertimePolicy,
    pub validation: ValidationLimits,
    pub database: DatabaseSection,
    pub rates: RatesSection,
}

impl AppConfig {
    pub fn from_toml_str(
        text: &str,
        origin: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Defaults when `path` is `None`, the parsed file otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
