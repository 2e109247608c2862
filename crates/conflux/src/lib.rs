//! # Conflux
//!
//! Schema-checked application settings with declarative logging.
//!
//! This is the main facade crate. It re-exports the config and logging
//! crates and wires them together for application startup.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use conflux::{logging_options, SettingsPaths};
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = SettingsPaths::default().load()?;
//!     let _guard = conflux::telemetry::init_logging(&logging_options(&settings)?)?;
//!
//!     tracing::info!(app = ?settings.application().app_name(), "Settings loaded");
//!     Ok(())
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`config`] - file loading, schema validation, secrets and settings cache
//! - [`telemetry`] - console and file logging sinks

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

pub use conflux_config as config;
pub use conflux_telemetry as telemetry;

pub use conflux_config::{ConfigError, Settings, SettingsCache};
pub use conflux_telemetry::{LoggingGuard, LoggingOptions, TelemetryError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default application config path.
pub const DEFAULT_CONFIG_PATH: &str = "./settings/config.yaml";

/// Default schema path.
pub const DEFAULT_SCHEMA_PATH: &str = "./settings/schema.yaml";

/// Default dotenv path.
pub const DEFAULT_ENV_PATH: &str = "./settings/.env";

/// The three paths settings are assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPaths {
    /// Application config file.
    pub config: PathBuf,
    /// Schema file.
    pub schema: PathBuf,
    /// Dotenv file.
    pub env: PathBuf,
}

impl Default for SettingsPaths {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            schema: PathBuf::from(DEFAULT_SCHEMA_PATH),
            env: PathBuf::from(DEFAULT_ENV_PATH),
        }
    }
}

impl SettingsPaths {
    /// Load settings through the process-wide cache.
    pub fn load(&self) -> Result<Arc<Settings>, ConfigError> {
        self.load_with(SettingsCache::global())
    }

    /// Load settings through `cache`.
    pub fn load_with(&self, cache: &SettingsCache) -> Result<Arc<Settings>, ConfigError> {
        cache.get_or_create(
            Some(self.config.as_path()),
            Some(self.schema.as_path()),
            Some(self.env.as_path()),
        )
    }
}

/// Logging options from the `logging` mapping of the application config,
/// or console logging at `INFO` when the mapping is absent.
pub fn logging_options(settings: &Settings) -> Result<LoggingOptions, TelemetryError> {
    settings
        .application()
        .logging()
        .map_or_else(|| Ok(LoggingOptions::console_default()), LoggingOptions::from_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflux_config::{ApplicationConfig, SecretConfig, SecretSource};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn settings_with(document: serde_json::Value) -> Settings {
        let application =
            ApplicationConfig::from_document(document.as_object().cloned().unwrap()).unwrap();
        Settings::new(application, SecretConfig::default())
    }

    #[test]
    fn test_default_paths() {
        let paths = SettingsPaths::default();
        assert_eq!(paths.config, PathBuf::from("./settings/config.yaml"));
        assert_eq!(paths.schema, PathBuf::from("./settings/schema.yaml"));
        assert_eq!(paths.env, PathBuf::from("./settings/.env"));
    }

    #[test]
    fn test_logging_options_default_to_console() {
        let options = logging_options(&settings_with(json!({"app_name": "demo"}))).unwrap();
        assert_eq!(options, LoggingOptions::console_default());
    }

    #[test]
    fn test_logging_options_from_config() {
        let settings = settings_with(json!({
            "logging": {"file": {"enabled": true, "level": "warning", "file_path": "logs/app.log"}}
        }));
        let options = logging_options(&settings).unwrap();
        assert!(options.console.is_none());
        let file = options.file.unwrap();
        assert!(file.enabled);
        assert_eq!(file.file_path, PathBuf::from("logs/app.log"));
    }

    #[test]
    fn test_load_with_cache() {
        let dir = TempDir::new().unwrap();
        let paths = SettingsPaths {
            config: dir.path().join("config.yaml"),
            schema: dir.path().join("schema.yaml"),
            env: dir.path().join(".env"),
        };
        fs::write(&paths.config, "app_name: demo\n").unwrap();
        fs::write(&paths.schema, "application:\n  app_name: str\nsecrets: {}\n").unwrap();
        fs::write(&paths.env, "SECRET=value\n").unwrap();

        let cache = SettingsCache::with_env(SecretSource::default());
        let first = paths.load_with(&cache).unwrap();
        let second = paths.load_with(&cache).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.application().app_name(), Some("demo"));
        assert_eq!(first.secrets().get_str("secret"), Some("value"));
    }
}
