//! Console and file sinks.
//!
//! # Example
//!
//! ```rust,ignore
//! use conflux_telemetry::{init_logging, LoggingOptions};
//!
//! let options = LoggingOptions::from_map(settings.application().logging().unwrap())?;
//! let _guard = init_logging(&options)?;
//!
//! tracing::info!("Application started");
//! ```

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::config::{ConsoleSinkOptions, FileSinkOptions, LoggingOptions};
use crate::error::TelemetryError;
use crate::format::{has_time_fields, TemplateFormat};
use crate::{LoggingGuard, TelemetryResult};

/// A sink layer over the bare registry.
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Sink layers built from [`LoggingOptions`], not yet installed.
pub struct LoggingSetup {
    /// One layer per enabled sink.
    pub layers: Vec<BoxedLayer>,

    /// Flush guard for the file sink's writer thread.
    pub guard: Option<WorkerGuard>,

    /// Warnings to log once a subscriber is installed.
    pub warnings: Vec<String>,
}

impl std::fmt::Debug for LoggingSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingSetup")
            .field("layers", &self.layers.len())
            .field("file_sink", &self.guard.is_some())
            .field("warnings", &self.warnings)
            .finish()
    }
}

impl LoggingSetup {
    /// Build the layers for every enabled sink.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` for an unknown level, rotation
    /// or time format, and `TelemetryError::Io` if the log directory cannot
    /// be created.
    pub fn new(options: &LoggingOptions) -> TelemetryResult<Self> {
        let mut layers = Vec::new();
        let mut guard = None;
        let mut warnings = Vec::new();

        if options.console.is_none() && options.file.is_none() {
            warnings.push("No logging configuration provided, no sinks installed".to_string());
        }

        match &options.console {
            Some(console) if console.enabled => {
                layers.push(console_layer(console)?);
                warn_without_time_fields(&mut warnings, "console", &console.time_format);
            }
            Some(_) => warnings.push("Console logging is disabled".to_string()),
            None => warnings.push(
                "Console logging configuration not found, skipping console sink".to_string(),
            ),
        }

        match &options.file {
            Some(file) if file.enabled => {
                let (layer, worker) = file_layer(file)?;
                layers.push(layer);
                guard = Some(worker);
                warn_without_time_fields(&mut warnings, "file", &file.time_format);
                if let Some(compression) = file.compression.as_deref() {
                    if !compression.eq_ignore_ascii_case("none") {
                        warnings.push(format!(
                            "Compression '{compression}' of rotated log files is not supported, ignoring"
                        ));
                    }
                }
            }
            Some(_) => warnings.push("File logging is disabled".to_string()),
            None => {
                warnings.push("File logging configuration not found, skipping file sink".to_string());
            }
        }

        Ok(Self {
            layers,
            guard,
            warnings,
        })
    }

    /// Install the layers as the global subscriber and log pending warnings.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::LoggingInit` if a global subscriber is
    /// already set.
    pub fn install(self) -> TelemetryResult<LoggingGuard> {
        tracing_subscriber::registry()
            .with(self.layers)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

        for warning in &self.warnings {
            tracing::warn!("{warning}");
        }

        Ok(LoggingGuard::new(self.guard))
    }
}

/// Initializes logging from the given options.
///
/// Keep the returned guard alive; dropping it flushes the file sink.
///
/// # Errors
///
/// Returns `TelemetryError` if the options are invalid or a global
/// subscriber is already installed.
pub fn init_logging(options: &LoggingOptions) -> TelemetryResult<LoggingGuard> {
    LoggingSetup::new(options)?.install()
}

fn warn_without_time_fields(warnings: &mut Vec<String>, sink: &str, time_format: &str) {
    if !has_time_fields(time_format) {
        warnings.push(format!(
            "The {sink} time_format '{time_format}' has no strftime fields and is printed as-is"
        ));
    }
}

fn console_layer(options: &ConsoleSinkOptions) -> TelemetryResult<BoxedLayer> {
    let level = options.level_filter()?;
    let format = TemplateFormat::new(&options.format, &options.time_format)?;

    Ok(tracing_subscriber::fmt::layer()
        .event_format(format)
        .with_writer(std::io::stdout)
        .with_filter(level)
        .boxed())
}

fn file_layer(options: &FileSinkOptions) -> TelemetryResult<(BoxedLayer, WorkerGuard)> {
    let level = options.level_filter()?;
    let rotation = options.rotation()?;
    let format = TemplateFormat::new(&options.format, &options.time_format)?;

    let file_name = options.file_path.file_name().ok_or_else(|| {
        TelemetryError::InvalidConfig(format!(
            "log file path '{}' has no file name",
            options.file_path.display()
        ))
    })?;
    let directory = options
        .file_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(directory)?;

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .map_err(|e| TelemetryError::LoggingInit(format!("cannot open log file: {e}")))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .event_format(format)
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(level)
        .boxed();

    Ok((layer, guard))
}
