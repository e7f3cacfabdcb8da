//! Tracker configuration and logging setup.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "Pillbox";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Slot the medication collection is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "medications";

/// File name offered when exporting a snapshot.
pub const EXPORT_FILE_NAME: &str = "medications_backup.json";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "pillbox_core=info";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// SQLite database file; `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    /// Slot name for the medication collection.
    pub storage_key: String,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Read `PILLBOX_DB_PATH`, `PILLBOX_STORAGE_KEY` and `PILLBOX_LOG`,
    /// falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            db_path: non_empty("PILLBOX_DB_PATH").map(PathBuf::from),
            storage_key: non_empty("PILLBOX_STORAGE_KEY").unwrap_or(defaults.storage_key),
            log_filter: non_empty("PILLBOX_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `filter`. Returns `false` if a subscriber was
/// already installed.
pub fn init_logging(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", APP_NAME, APP_VERSION);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.db_path, None);
        assert_eq!(config.storage_key, "medications");
        assert_eq!(config.log_filter, "pillbox_core=info");
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("PILLBOX_DB_PATH", "/tmp/pillbox.db"),
            ("PILLBOX_STORAGE_KEY", "  "),
            ("PILLBOX_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let config = TrackerConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/pillbox.db")));
        assert_eq!(config.storage_key, "medications");
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging("off");
        assert!(!init_logging("off"));
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "Pillbox");
    }
}
