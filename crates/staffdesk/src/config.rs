//! Configuration management for staffdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::CsvStyle;
use crate::store::DEFAULT_COLLECTION;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "staffdesk";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "staff.db";

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "STAFFDESK_";

/// Allowed shape of a collection name.
const COLLECTION_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_-]{0,63}$";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `STAFFDESK_`, sections split on `__`)
/// 2. TOML config file at `~/.config/staffdesk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document store configuration.
    pub store: StoreConfig,
    /// Export configuration.
    pub export: ExportConfig,
    /// Notification configuration.
    pub notifications: NotificationConfig,
}

/// Document store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/staffdesk/staff.db`
    pub database_path: Option<PathBuf>,
    /// Name of the staff collection.
    pub collection: String,
}

/// Export configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory export files are written to.
    /// Defaults to the user's download directory, or the working directory.
    pub directory: Option<PathBuf>,
    /// Quote CSV values containing delimiters instead of writing them raw.
    pub quote_csv: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long a notification stays visible, in milliseconds.
    pub auto_hide_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Resolved at runtime
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { auto_hide_ms: 6000 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `STAFFDESK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let collection = self.store.collection.trim();
        if collection.is_empty() {
            return Err(Error::ConfigValidation {
                message: "store.collection must not be empty".to_string(),
            });
        }

        let pattern = Regex::new(COLLECTION_PATTERN)
            .map_err(|e| Error::internal(format!("invalid collection pattern: {e}")))?;
        if !pattern.is_match(collection) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "invalid collection name '{collection}': use letters, digits, '_' or '-', starting with a letter"
                ),
            });
        }

        if self.notifications.auto_hide_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "notifications.auto_hide_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the CSV style selected by `export.quote_csv`.
    #[must_use]
    pub fn csv_style(&self) -> CsvStyle {
        CsvStyle::from_quote_flag(self.export.quote_csv)
    }

    /// Get the notification auto-hide delay as a Duration.
    #[must_use]
    pub fn auto_hide(&self) -> Duration {
        Duration::from_millis(self.notifications.auto_hide_ms)
    }
}
