//! Supported configuration file formats.
//!
//! The format of a file is decided by its extension alone; content is never
//! sniffed. The table is closed: YAML (`.yaml`, `.yml`), JSON (`.json`) and
//! TOML (`.toml`).

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::BoxedSource;
use crate::ConfigError;

/// A parsed configuration document: string keys to arbitrary values.
///
/// Key order follows the source file.
pub type Document = Map<String, Value>;

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    /// YAML, via `serde_yaml`.
    Yaml,
    /// JSON, via `serde_json`.
    Json,
    /// TOML, via `toml`.
    Toml,
}

impl ConfigFormat {
    /// All supported formats.
    pub const ALL: [Self; 3] = [Self::Yaml, Self::Json, Self::Toml];

    /// Look up a format by file extension (case-insensitive, without the dot).
    ///
    /// ```
    /// use conflux_config::ConfigFormat;
    ///
    /// assert_eq!(ConfigFormat::from_extension("YML"), Some(ConfigFormat::Yaml));
    /// assert_eq!(ConfigFormat::from_extension("ini"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Determine the format of a file from its path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] when the extension is missing
    /// or not in the table.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        Self::from_extension(extension)
            .ok_or_else(|| ConfigError::unsupported_format(path, extension))
    }

    /// Canonical extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    /// Parse content into a document.
    ///
    /// Empty content and a top-level null both yield an empty document. Any
    /// other non-mapping top level is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] naming `origin` when the content is
    /// malformed or its top level is not a mapping.
    pub fn parse(self, content: &str, origin: &Path) -> Result<Document, ConfigError> {
        self.parse_value(content)
            .and_then(into_document)
            .map_err(|source| ConfigError::parse(origin, self, source))
    }

    /// Serialize a document in this format.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error, e.g. TOML cannot represent nulls.
    pub fn serialize(self, document: &Document) -> Result<String, BoxedSource> {
        Ok(match self {
            Self::Yaml => serde_yaml::to_string(document)?,
            Self::Json => serde_json::to_string_pretty(document)?,
            Self::Toml => toml::to_string(document)?,
        })
    }

    fn parse_value(self, content: &str) -> Result<Value, BoxedSource> {
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(match self {
            Self::Yaml => serde_yaml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
            Self::Toml => toml::from_str(content)?,
        })
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn into_document(value: Value) -> Result<Document, BoxedSource> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Document::new()),
        other => Err(format!(
            "expected a mapping at the top level, found {}",
            crate::schema::type_name(&other)
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn origin() -> &'static Path {
        Path::new("<string>")
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(ConfigFormat::from_extension("yaml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("ini"), None);
        assert_eq!(ConfigFormat::from_extension(""), None);
    }

    #[test]
    fn test_from_path_unsupported() {
        let err = ConfigFormat::from_path(Path::new("settings/config.ini")).unwrap_err();
        match err {
            ConfigError::UnsupportedFormat { extension, .. } => assert_eq!(extension, "ini"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_path_without_extension() {
        let err = ConfigFormat::from_path(Path::new("settings/config")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_parse_yaml() {
        let doc = ConfigFormat::Yaml
            .parse("app_name: demo\napp:\n  app_version: '1.0'\n", origin())
            .unwrap();
        assert_eq!(doc["app_name"], json!("demo"));
        assert_eq!(doc["app"]["app_version"], json!("1.0"));
    }

    #[test]
    fn test_parse_toml_keeps_int_and_float_apart() {
        let doc = ConfigFormat::Toml
            .parse("workers = 4\nratio = 0.5\n", origin())
            .unwrap();
        assert!(doc["workers"].is_i64());
        assert!(doc["ratio"].is_f64());
    }

    #[test]
    fn test_parse_empty_content() {
        for format in ConfigFormat::ALL {
            let doc = format.parse("  \n", origin()).unwrap();
            assert!(doc.is_empty(), "{format} should yield an empty document");
        }
    }

    #[test]
    fn test_parse_yaml_uses_1_2_booleans() {
        let doc = ConfigFormat::Yaml
            .parse("debug: yes\nverbose: off\nenabled: true\n", origin())
            .unwrap();
        assert_eq!(doc["debug"], json!("yes"));
        assert_eq!(doc["verbose"], json!("off"));
        assert_eq!(doc["enabled"], json!(true));
    }

    #[test]
    fn test_parse_yaml_null_document() {
        let doc = ConfigFormat::Yaml.parse("~\n", origin()).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_mapping_top_level() {
        let err = ConfigFormat::Yaml.parse("- a\n- b\n", origin()).unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("list"));
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = ConfigFormat::Json
            .parse("{\"app_name\": ", Path::new("config.json"))
            .unwrap_err();
        match err {
            ConfigError::Parse { path, format, .. } => {
                assert_eq!(path, Path::new("config.json"));
                assert_eq!(format, ConfigFormat::Json);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_preserves_key_order() {
        let doc = ConfigFormat::Json
            .parse(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#, origin())
            .unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
