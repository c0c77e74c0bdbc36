//! CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use stockbook_core::DEFAULT_LOW_STOCK_THRESHOLD;

/// Default number of rows returned by history listings.
const DEFAULT_HISTORY_LIMIT: u32 = 500;

/// Default number of best sellers shown in a report.
const DEFAULT_TOP_PRODUCTS: usize = 5;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Stock level at or below which a product is listed as low
    pub low_stock_threshold: i64,

    /// Rows shown by `purchase list`, `sale list` and `expense list`
    pub history_limit: u32,

    /// Best sellers shown by `report`
    pub top_products: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// - `STOCKBOOK_DB_PATH` (default: platform data directory)
    /// - `STOCKBOOK_LOW_STOCK_THRESHOLD` (default: 5)
    /// - `STOCKBOOK_HISTORY_LIMIT` (default: 500)
    /// - `STOCKBOOK_TOP_PRODUCTS` (default: 5)
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup("STOCKBOOK_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let config = AppConfig {
            db_path,
            low_stock_threshold: parse_var(
                &lookup,
                "STOCKBOOK_LOW_STOCK_THRESHOLD",
                DEFAULT_LOW_STOCK_THRESHOLD,
            )?,
            history_limit: parse_var(&lookup, "STOCKBOOK_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
            top_products: parse_var(&lookup, "STOCKBOOK_TOP_PRODUCTS", DEFAULT_TOP_PRODUCTS)?,
        };

        if config.history_limit == 0 {
            return Err(ConfigError::InvalidValue("STOCKBOOK_HISTORY_LIMIT".to_string()));
        }

        Ok(config)
    }

    /// Replaces the database path (the `--db` flag).
    pub fn with_db_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.db_path = path;
        }
        self
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Platform-specific database location.
///
/// - **macOS**: `~/Library/Application Support/com.stockbook.stockbook/stockbook.db`
/// - **Windows**: `%APPDATA%\stockbook\stockbook\data\stockbook.db`
/// - **Linux**: `~/.local/share/stockbook/stockbook.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "stockbook", "stockbook")
        .ok_or(ConfigError::NoDataDirectory)?;
    Ok(dirs.data_dir().join("stockbook.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine a data directory; set STOCKBOOK_DB_PATH")]
    NoDataDirectory,
}
