//! Logging options.
//!
//! The options are read from the `logging` mapping of the application config:
//!
//! ```yaml
//! logging:
//!   console:
//!     enabled: true
//!     level: info
//!     format: "{time} | {level: <8} | {target}:{line} - {message}"
//!   file:
//!     enabled: true
//!     level: debug
//!     file_path: logs/app.log
//!     rotation: daily
//! ```
//!
//! Either block may be omitted; the corresponding sink is then skipped.
//!
//! `time_format` uses chrono strftime syntax (`%Y-%m-%d %H:%M:%S%.3f`).
//! Token styles like `YYYY-MM-DD HH:mm:ss` are not translated; a format with
//! no `%` fields is printed verbatim and reported as a warning at startup.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::LevelFilter;

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Default console template.
pub const DEFAULT_CONSOLE_FORMAT: &str = "{time} | {level: <8} | {target}:{line} - {message}";

/// Default file template.
pub const DEFAULT_FILE_FORMAT: &str = "{time} | {level} | {message}";

/// Default timestamp format (chrono strftime).
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Default log file path.
pub const DEFAULT_FILE_PATH: &str = "app.log";

/// Top-level logging options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingOptions {
    /// Console sink; `None` skips it.
    #[serde(default)]
    pub console: Option<ConsoleSinkOptions>,

    /// File sink; `None` skips it.
    #[serde(default)]
    pub file: Option<FileSinkOptions>,
}

impl LoggingOptions {
    /// Read options from a `logging` mapping.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` if a field has the wrong type.
    pub fn from_map(map: &Map<String, Value>) -> TelemetryResult<Self> {
        serde_json::from_value(Value::Object(map.clone()))
            .map_err(|e| TelemetryError::InvalidConfig(format!("invalid logging options: {e}")))
    }

    /// Console logging at `INFO`, used when no options are configured.
    #[must_use]
    pub fn console_default() -> Self {
        Self {
            console: Some(ConsoleSinkOptions {
                enabled: true,
                level: "INFO".to_string(),
                ..ConsoleSinkOptions::default()
            }),
            file: None,
        }
    }
}

/// Console sink options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsoleSinkOptions {
    /// Whether the sink is installed.
    #[serde(default)]
    pub enabled: bool,

    /// Output template.
    #[serde(default = "default_console_format")]
    pub format: String,

    /// Minimum level, case-insensitive.
    #[serde(default = "default_level")]
    pub level: String,

    /// Timestamp format for `{time}`.
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for ConsoleSinkOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            format: default_console_format(),
            level: default_level(),
            time_format: default_time_format(),
        }
    }
}

impl ConsoleSinkOptions {
    /// The minimum level as a filter.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` for an unknown level.
    pub fn level_filter(&self) -> TelemetryResult<LevelFilter> {
        parse_level(&self.level)
    }
}

/// File sink options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileSinkOptions {
    /// Whether the sink is installed.
    #[serde(default)]
    pub enabled: bool,

    /// Output template.
    #[serde(default = "default_file_format")]
    pub format: String,

    /// Minimum level, case-insensitive.
    #[serde(default = "default_level")]
    pub level: String,

    /// Timestamp format for `{time}`.
    #[serde(default = "default_time_format")]
    pub time_format: String,

    /// Log file path. Missing parent directories are created.
    #[serde(default = "default_file_path")]
    pub file_path: PathBuf,

    /// Rotation period: `minutely`, `hourly`, `daily` or `never`.
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Requested compression of rotated files. Accepted but not performed.
    #[serde(default)]
    pub compression: Option<String>,
}

impl Default for FileSinkOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            format: default_file_format(),
            level: default_level(),
            time_format: default_time_format(),
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
            rotation: default_rotation(),
            compression: None,
        }
    }
}

impl FileSinkOptions {
    /// The minimum level as a filter.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` for an unknown level.
    pub fn level_filter(&self) -> TelemetryResult<LevelFilter> {
        parse_level(&self.level)
    }

    /// The rotation period.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` for an unknown period.
    pub fn rotation(&self) -> TelemetryResult<Rotation> {
        match self.rotation.trim().to_lowercase().as_str() {
            "minutely" => Ok(Rotation::MINUTELY),
            "hourly" => Ok(Rotation::HOURLY),
            "daily" => Ok(Rotation::DAILY),
            "never" => Ok(Rotation::NEVER),
            other => Err(TelemetryError::InvalidConfig(format!(
                "unsupported rotation '{other}', expected minutely, hourly, daily or never"
            ))),
        }
    }
}

/// Parse a level name, case-insensitively.
///
/// Besides the `tracing` levels this accepts `WARNING`, `SUCCESS` (as `INFO`),
/// `CRITICAL` (as `ERROR`) and `OFF`.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` for an unknown level.
pub fn parse_level(level: &str) -> TelemetryResult<LevelFilter> {
    match level.trim().to_uppercase().as_str() {
        "TRACE" => Ok(LevelFilter::TRACE),
        "DEBUG" => Ok(LevelFilter::DEBUG),
        "INFO" | "SUCCESS" => Ok(LevelFilter::INFO),
        "WARN" | "WARNING" => Ok(LevelFilter::WARN),
        "ERROR" | "CRITICAL" => Ok(LevelFilter::ERROR),
        "OFF" => Ok(LevelFilter::OFF),
        other => Err(TelemetryError::InvalidConfig(format!(
            "unknown log level '{other}'"
        ))),
    }
}

fn default_console_format() -> String {
    DEFAULT_CONSOLE_FORMAT.to_string()
}

fn default_file_format() -> String {
    DEFAULT_FILE_FORMAT.to_string()
}

fn default_level() -> String {
    "DEBUG".to_string()
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

fn default_file_path() -> PathBuf {
    PathBuf::from(DEFAULT_FILE_PATH)
}

fn default_rotation() -> String {
    "never".to_string()
}
