//! Store configuration.
//!
//! # Responsibility
//! - Describe where the database lives and how connections wait on locks.
//! - Describe how core logging is initialized.
//!
//! # Invariants
//! - `busy_timeout_ms` is never zero; concurrent writers must be able to wait.
//! - `log_dir`, when set, is absolute.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default database file name used when nothing else is configured.
pub const DEFAULT_DB_PATH: &str = "bookaudit.sqlite3";
/// Default time a connection waits for a competing writer.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub const ENV_DB_PATH: &str = "BOOKAUDIT_DB";
pub const ENV_BUSY_TIMEOUT_MS: &str = "BOOKAUDIT_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "BOOKAUDIT_LOG";
pub const ENV_LOG_DIR: &str = "BOOKAUDIT_LOG_DIR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Connection and logging settings for one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Lock wait applied through `busy_timeout`.
    pub busy_timeout_ms: u64,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Rolling log directory; logs go to stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Builds a config from defaults overridden by `BOOKAUDIT_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_BUSY_TIMEOUT_MS,
                        value: raw.clone(),
                        reason: "expected milliseconds as an unsigned integer",
                    })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: ENV_DB_PATH,
                value: String::new(),
                reason: "database path cannot be empty",
            });
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                value: "0".to_string(),
                reason: "busy timeout must be positive",
            });
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    value: dir.display().to_string(),
                    reason: "log directory must be absolute",
                });
            }
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = StoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/library.db"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_LOG_LEVEL, "warn"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/library.db"));
        assert_eq!(config.busy_timeout_ms, 250);
        assert_eq!(config.log_level, "warn");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn rejects_unparsable_busy_timeout() {
        let err =
            StoreConfig::from_lookup(lookup_from(&[(ENV_BUSY_TIMEOUT_MS, "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_busy_timeout_and_relative_log_dir() {
        let zero = StoreConfig {
            busy_timeout_ms: 0,
            ..StoreConfig::default()
        };
        assert!(zero.validate().is_err());

        let relative = StoreConfig {
            log_dir: Some(PathBuf::from("logs")),
            ..StoreConfig::default()
        };
        assert!(relative.validate().is_err());
    }

    #[test]
    fn deserializes_partial_documents_with_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"db_path": "x.db"}"#).unwrap();
        assert_eq!(config.db_path, PathBuf::from("x.db"));
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }
}
