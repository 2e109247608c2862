//! Declarative logging setup for Conflux.
//!
//! The `logging` mapping of an application config describes up to two sinks:
//!
//! - **Console**: templated lines on stdout
//! - **File**: templated lines appended through a non-blocking writer, with
//!   optional time-based rotation
//!
//! Each sink has its own minimum level and `{placeholder}` template (see
//! [`TemplateFormat`]).
//!
//! # Architecture
//!
//! ```text
//!   logging: {console: ..., file: ...}
//!                   │
//!                   ▼
//!           LoggingOptions::from_map
//!                   │
//!                   ▼
//!   LoggingSetup ── console layer ── stdout
//!                └─ file layer ───── non_blocking ── RollingFileAppender
//!                   │
//!                   ▼
//!   tracing_subscriber::registry().try_init()
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use conflux_telemetry::{init_logging, LoggingOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LoggingOptions::console_default())?;
//!     tracing::info!("Logging ready");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod format;
pub mod logging;

pub use config::{
    parse_level, ConsoleSinkOptions, FileSinkOptions, LoggingOptions, DEFAULT_CONSOLE_FORMAT,
    DEFAULT_FILE_FORMAT, DEFAULT_TIME_FORMAT,
};
pub use error::TelemetryError;
pub use format::{has_time_fields, TemplateFormat};
pub use logging::{init_logging, LoggingSetup};

use tracing_appender::non_blocking::WorkerGuard;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Guard that flushes the file sink on drop.
///
/// Keep this alive for the lifetime of the application. Dropping it
/// flushes buffered lines and stops the file writer thread.
#[must_use = "dropping the guard stops the file sink"]
pub struct LoggingGuard {
    file_writer: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Creates a new logging guard.
    pub fn new(file_writer: Option<WorkerGuard>) -> Self {
        Self { file_writer }
    }

    /// Whether a file sink is active.
    pub fn has_file_sink(&self) -> bool {
        self.file_writer.is_some()
    }
}

impl std::fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingGuard")
            .field("file_sink", &self.has_file_sink())
            .finish()
    }
}
