//! Resolution of named sections from a schema file.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::format::Document;
use crate::loader::FileLoader;
use crate::schema::{type_name, Schema};
use crate::ConfigError;

/// Section of the schema describing the application config.
pub const APPLICATION_SECTION: &str = "application";

/// Section of the schema describing the secrets overlay.
pub const SECRETS_SECTION: &str = "secrets";

/// Extract section `name` from a full schema document.
///
/// # Errors
///
/// - [`ConfigError::MissingSchemaSection`] if the document has no such key
/// - [`ConfigError::InvalidSchemaDefinition`] if the section is not a mapping
pub fn section_of<'a>(schema: &'a Document, name: &str) -> Result<&'a Schema, ConfigError> {
    match schema.get(name) {
        Some(Value::Object(section)) => Ok(section),
        Some(other) => Err(ConfigError::invalid_schema(
            name,
            format!("schema section must be a mapping, found {}", type_name(other)),
        )),
        None => Err(ConfigError::missing_schema_section(name)),
    }
}

/// Resolves schema sections through a [`FileLoader`].
///
/// Schema validation is optional: with no schema file, or a path that does
/// not exist, every section resolves to `None` and callers skip validation.
/// A schema file that exists but lacks the section is an error.
#[derive(Debug, Clone, Copy)]
pub struct SectionResolver<'a> {
    loader: &'a FileLoader,
}

impl<'a> SectionResolver<'a> {
    /// Create a resolver that reads schema files through `loader`.
    pub fn new(loader: &'a FileLoader) -> Self {
        Self { loader }
    }

    /// Resolve section `name` of the schema file at `schema_path`.
    ///
    /// # Errors
    ///
    /// Returns any error from loading the schema file, or from
    /// [`section_of`].
    pub fn section(
        &self,
        schema_path: Option<&Path>,
        name: &str,
    ) -> Result<Option<Schema>, ConfigError> {
        let Some(path) = schema_path else {
            debug!(section = name, "no schema file given, skipping validation");
            return Ok(None);
        };

        if !path.exists() {
            debug!(
                section = name,
                path = %path.display(),
                "schema file does not exist, skipping validation"
            );
            return Ok(None);
        }

        let schema = self.loader.load(path)?;
        section_of(&schema, name).map(|section| Some(section.clone()))
    }
}
