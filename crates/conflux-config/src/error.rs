//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::format::ConfigFormat;

/// Boxed parser error, shared by the format-specific parsers.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while loading, validating or assembling configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read an existing configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not one of the supported formats.
    #[error("unsupported configuration file format '{extension}': {path}")]
    UnsupportedFormat {
        /// Path to the file.
        path: PathBuf,
        /// The offending extension (empty when the file has none).
        extension: String,
    },

    /// The file content is not valid for its declared format.
    #[error("failed to parse {format} configuration {path}: {source}")]
    Parse {
        /// Path to the file, or `<string>` for in-memory content.
        path: PathBuf,
        /// Format the content was parsed as.
        format: ConfigFormat,
        /// Underlying parser error.
        #[source]
        source: BoxedSource,
    },

    /// A dotenv file is malformed.
    #[error("failed to parse dotenv file {path}: {source}")]
    Dotenv {
        /// Path to the dotenv file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: dotenvy::Error,
    },

    /// A field declared by the schema is absent from the document.
    #[error("missing required configuration field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// A field's runtime type disagrees with the schema.
    #[error("incorrect type for field '{field}', expected {expected} but got {actual}")]
    TypeMismatch {
        /// The field name.
        field: String,
        /// Type tag declared by the schema.
        expected: String,
        /// Type tag of the value found.
        actual: String,
    },

    /// A schema node is neither a known type tag nor a nested mapping.
    #[error("invalid schema definition for field {field}: {reason}")]
    InvalidSchemaDefinition {
        /// The field whose schema node is malformed.
        field: String,
        /// Explanation of what is wrong with the node.
        reason: String,
    },

    /// A schema file was supplied but lacks a required section.
    #[error("the schema does not contain the '{section}' section")]
    MissingSchemaSection {
        /// The missing section name.
        section: String,
    },

    /// The `logging` field of the application config is not a mapping.
    #[error("invalid format for 'logging', expected a mapping")]
    InvalidLoggingFormat,

    /// A typed accessor could not deserialize a value.
    #[error("failed to deserialize configuration value '{key}': {source}")]
    Deserialize {
        /// Key that was looked up.
        key: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new unsupported format error.
    pub fn unsupported_format(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            extension: extension.into(),
        }
    }

    /// Create a new parse error.
    pub fn parse(path: impl Into<PathBuf>, format: ConfigFormat, source: impl Into<BoxedSource>) -> Self {
        Self::Parse {
            path: path.into(),
            format,
            source: source.into(),
        }
    }

    /// Create a new missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a new type mismatch error.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a new invalid schema definition error.
    pub fn invalid_schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchemaDefinition {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new missing schema section error.
    pub fn missing_schema_section(section: impl Into<String>) -> Self {
        Self::MissingSchemaSection {
            section: section.into(),
        }
    }

    /// Whether this error came from reading a file's format or content,
    /// as opposed to its absence or its validation.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::Parse { .. } | Self::Dotenv { .. }
        )
    }
}
