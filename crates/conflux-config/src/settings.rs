//! Assembled settings types.
//!
//! Both halves of [`Settings`] are backed by a plain [`Document`]: they expose
//! a few declared accessors and open-ended lookup by key, and keep every field
//! of their source even when no schema mentions it.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::format::Document;
use crate::ConfigError;

fn lookup<'a>(values: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = values.get(segments.next()?)?;
    segments.try_fold(first, |value, segment| value.as_object()?.get(segment))
}

fn get_as<T: DeserializeOwned>(values: &Document, key: &str) -> Result<Option<T>, ConfigError> {
    lookup(values, key)
        .map(|value| {
            serde_json::from_value(value.clone()).map_err(|source| ConfigError::Deserialize {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

/// Application configuration loaded from the main config file.
///
/// # Example
///
/// ```
/// use conflux_config::ApplicationConfig;
/// use serde_json::json;
///
/// let config = ApplicationConfig::from_document(
///     json!({"app_name": "demo", "app": {"app_version": "1.0"}})
///         .as_object()
///         .cloned()
///         .unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(config.app_name(), Some("demo"));
/// assert_eq!(config.lookup("app.app_version"), Some(&json!("1.0")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationConfig {
    values: Document,
}

impl ApplicationConfig {
    /// Key of the logging block handed to the logging subsystem.
    pub const LOGGING_KEY: &'static str = "logging";

    /// Build an application config from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLoggingFormat`] if the document has a
    /// `logging` key whose value is not a mapping.
    pub fn from_document(values: Document) -> Result<Self, ConfigError> {
        match values.get(Self::LOGGING_KEY) {
            Some(Value::Object(_)) | None => Ok(Self { values }),
            Some(_) => Err(ConfigError::InvalidLoggingFormat),
        }
    }

    /// The `app_name` field, when it is a string.
    pub fn app_name(&self) -> Option<&str> {
        self.values.get("app_name").and_then(Value::as_str)
    }

    /// The `logging` block, if present.
    pub fn logging(&self) -> Option<&Map<String, Value>> {
        self.values.get(Self::LOGGING_KEY).and_then(Value::as_object)
    }

    /// Value of a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Value at a dotted path through nested mappings, e.g. `"app.app_version"`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup(&self.values, path)
    }

    /// Deserialize the value at a dotted path.
    ///
    /// Returns `Ok(None)` when the path does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Deserialize`] if the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ConfigError> {
        get_as(&self.values, path)
    }

    /// Whether a top-level key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Top-level keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// The underlying mapping.
    pub fn as_map(&self) -> &Document {
        &self.values
    }
}

/// Secrets read from the environment and an optional dotenv file.
///
/// Keys are lower-case and every value is a string. `Debug` output lists the
/// keys only.
#[derive(Clone, Default, PartialEq)]
pub struct SecretConfig {
    values: Document,
}

impl SecretConfig {
    /// Build a secret config from string pairs.
    ///
    /// Keys are lower-cased; a later pair overrides an earlier one.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_lowercase(), Value::String(value.into())))
            .collect();
        Self { values }
    }

    /// Value of a secret.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&key.to_lowercase())
    }

    /// Value of a secret as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Deserialize a secret.
    ///
    /// Secrets are always strings, so `T` must deserialize from one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Deserialize`] if the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        get_as(&self.values, &key.to_lowercase())
    }

    /// Whether a secret is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_lowercase())
    }

    /// Secret names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of secrets.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no secrets.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The underlying mapping.
    pub fn as_map(&self) -> &Document {
        &self.values
    }
}

impl fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.keys().map(|key| (key, "<redacted>")))
            .finish()
    }
}

/// Validated settings: application config plus secrets.
///
/// Immutable once assembled. Obtain one from
/// [`ConfigAssembler`](crate::ConfigAssembler) or
/// [`SettingsCache`](crate::SettingsCache).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    application: ApplicationConfig,
    secrets: SecretConfig,
}

impl Settings {
    /// Combine both halves.
    pub fn new(application: ApplicationConfig, secrets: SecretConfig) -> Self {
        Self {
            application,
            secrets,
        }
    }

    /// The application config.
    pub fn application(&self) -> &ApplicationConfig {
        &self.application
    }

    /// The secrets.
    pub fn secrets(&self) -> &SecretConfig {
        &self.secrets
    }
}
