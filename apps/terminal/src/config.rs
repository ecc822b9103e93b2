//! # Terminal Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DEPOT_DB_PATH=/srv/depot/depot.db                                  │
//! │     DEPOT_STORE_NAME, DEPOT_CURRENCY,                                  │
//! │     DEPOT_OPENING_BALANCE, DEPOT_LOG_FILTER                            │
//! │                                                                         │
//! │  2. TOML Config File (--config <path>, or the platform default)        │
//! │     ~/.config/depot-pos/depot.toml (Linux)                             │
//! │     ~/Library/Application Support/com.depot.pos/depot.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Corner Depot"
//! currency = "EUR"
//!
//! [database]
//! path = "/srv/depot/depot.db"
//!
//! [cash]
//! opening_balance = "100.00"   # only used when the ledger row is missing
//!
//! [logging]
//! filter = "info,depot=debug,sqlx=warn"
//! file = "/var/log/depot.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use depot_core::Money;

const CONFIG_FILE: &str = "depot.toml";
const DATABASE_FILE: &str = "depot.db";
const LOG_FILE: &str = "depot.log";

// =============================================================================
// Sections
// =============================================================================

/// Store identity shown in the title bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Currency code appended to every amount on screen.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_store_name() -> String {
    "Depot".to_string()
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashSettings {
    /// Balance written when the cash ledger has no row yet.
    #[serde(default = "default_opening_balance")]
    pub opening_balance: Money,
}

fn default_opening_balance() -> Money {
    Money::from_minor_units(10_000)
}

impl Default for CashSettings {
    fn default() -> Self {
        CashSettings {
            opening_balance: default_opening_balance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives. `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Log file. Defaults to the platform data directory.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_filter() -> String {
    "info,depot=debug,sqlx=warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
            file: None,
        }
    }
}

// =============================================================================
// Terminal Configuration
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub cash: CashSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,

    /// Overrides that were ignored while loading.
    #[serde(skip)]
    pub ignored_overrides: Vec<String>,
}

impl TerminalConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`depot.toml`)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// default file is not.
    ///
    /// Nothing is logged here since tracing is configured from the result.
    /// Call [`TerminalConfig::log_loaded`] once the subscriber is installed.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                config = Self::from_file(&path)?;
                config.source = Some(path);
            } else if explicit {
                return Err(AppError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Reports where the configuration came from.
    pub fn log_loaded(&self) {
        match &self.source {
            Some(path) => info!(?path, "Terminal config loaded from file"),
            None => info!("No config file found, using defaults"),
        }
        for ignored in &self.ignored_overrides {
            warn!(setting = %ignored, "Ignoring environment override");
        }
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&contents).map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.store.currency.trim().is_empty() {
            return Err(AppError::config("store.currency must not be empty"));
        }

        if self.cash.opening_balance.is_negative() {
            return Err(AppError::config(format!(
                "cash.opening_balance must not be negative, got {}",
                self.cash.opening_balance
            )));
        }

        if self.cash.opening_balance.to_minor_units().is_none() {
            return Err(AppError::config(format!(
                "cash.opening_balance has more than two decimals: {}",
                self.cash.opening_balance.amount()
            )));
        }

        Ok(())
    }

    /// Applies `DEPOT_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DEPOT_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("DEPOT_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(currency) = lookup("DEPOT_CURRENCY") {
            self.store.currency = currency;
        }

        if let Some(balance) = lookup("DEPOT_OPENING_BALANCE") {
            match Money::parse(&balance) {
                Ok(parsed) => self.cash.opening_balance = parsed,
                Err(e) => self
                    .ignored_overrides
                    .push(format!("DEPOT_OPENING_BALANCE: {}", e)),
            }
        }

        if let Some(filter) = lookup("DEPOT_LOG_FILTER") {
            self.logging.filter = filter;
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "depot", "pos")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Directory for the database and log file, falling back to the
    /// working directory when the platform has no home.
    fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join(DATABASE_FILE))
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join(LOG_FILE))
    }

    pub fn currency(&self) -> &str {
        &self.store.currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = TerminalConfig::default();
        assert_eq!(config.store.currency, "EUR");
        assert_eq!(config.cash.opening_balance, Money::new(dec!(100.00)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: TerminalConfig = toml::from_str(
            r#"
            [store]
            name = "Corner Depot"

            [cash]
            opening_balance = "250.50"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Corner Depot");
        assert_eq!(config.store.currency, "EUR");
        assert_eq!(config.cash.opening_balance, Money::new(dec!(250.50)));
        assert_eq!(config.logging.filter, "info,depot=debug,sqlx=warn");
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("DEPOT_DB_PATH", "/tmp/other.db"),
            ("DEPOT_CURRENCY", "CHF"),
            ("DEPOT_OPENING_BALANCE", "42.10"),
            ("DEPOT_LOG_FILTER", "debug"),
        ]);
        let mut config = TerminalConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.database_path(), PathBuf::from("/tmp/other.db"));
        assert_eq!(config.currency(), "CHF");
        assert_eq!(config.cash.opening_balance, Money::new(dec!(42.10)));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_malformed_balance_override_is_ignored() {
        let vars = env(&[("DEPOT_OPENING_BALANCE", "lots")]);
        let mut config = TerminalConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.cash.opening_balance, Money::new(dec!(100.00)));
        assert_eq!(config.ignored_overrides.len(), 1);
        assert!(config.ignored_overrides[0].starts_with("DEPOT_OPENING_BALANCE"));
    }

    #[test]
    fn test_load_records_source_file() {
        let path = std::env::temp_dir().join(format!("depot-{}.toml", std::process::id()));
        std::fs::write(&path, "[store]\nname = \"Harbour Depot\"\n").unwrap();

        let loaded = TerminalConfig::load(Some(path.clone()));
        std::fs::remove_file(&path).unwrap();

        let config = loaded.unwrap();
        assert_eq!(config.source, Some(path));
        assert_eq!(config.store.name, "Harbour Depot");
    }

    #[test]
    fn test_validation() {
        let mut config = TerminalConfig::default();

        config.store.currency = "  ".to_string();
        assert!(config.validate().is_err());

        config.store.currency = "EUR".to_string();
        config.cash.opening_balance = Money::new(dec!(-1.00));
        assert!(config.validate().is_err());

        config.cash.opening_balance = Money::new(dec!(1.005));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = TerminalConfig::load(Some(PathBuf::from("/nonexistent/depot.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&TerminalConfig::default()).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[cash]"));
    }
}
