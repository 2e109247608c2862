//! Schema-driven validation of configuration documents.
//!
//! A schema is itself a document: each key names a field that must be present
//! in the validated document, and each value is either a type tag or a nested
//! schema.
//!
//! ```yaml
//! application:
//!   app_name: str
//!   app:
//!     app_version: str
//!     workers: int
//! ```
//!
//! Schemas state minimum requirements. Fields the schema does not mention are
//! never checked, so documents may carry any number of extra keys.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::format::Document;
use crate::ConfigError;

/// A schema mapping, same shape as a [`Document`].
pub type Schema = Document;

/// The closed vocabulary of type tags a schema may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `str`
    Str,
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `list`
    List,
    /// `dict`
    Dict,
    /// `NoneType`
    NoneType,
    /// `tuple`; matches sequences, since no supported format has tuples.
    Tuple,
}

impl TypeTag {
    /// All type tags.
    pub const ALL: [Self; 8] = [
        Self::Str,
        Self::Bool,
        Self::Int,
        Self::Float,
        Self::List,
        Self::Dict,
        Self::NoneType,
        Self::Tuple,
    ];

    /// The tag as written in schema files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::List => "list",
            Self::Dict => "dict",
            Self::NoneType => "NoneType",
            Self::Tuple => "tuple",
        }
    }

    /// Whether `value` has exactly this runtime type.
    ///
    /// Booleans are not integers and integers are not floats.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Str => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Float => value.is_f64(),
            Self::List | Self::Tuple => value.is_array(),
            Self::Dict => value.is_object(),
            Self::NoneType => value.is_null(),
        }
    }

    /// The tag describing the runtime type of `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::NoneType,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Int,
            Value::String(_) => Self::Str,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Dict,
        }
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("unsupported type tag '{s}'"))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the runtime type of `value`, in type-tag vocabulary.
pub fn type_name(value: &Value) -> &'static str {
    TypeTag::of(value).as_str()
}

/// Validate `document` against `schema`.
///
/// Every key of the schema must be present in the document with a matching
/// type. Nested schemas recurse into nested mappings. Errors name only the
/// immediate key at the level where validation failed.
///
/// # Errors
///
/// - [`ConfigError::MissingField`] if a declared key is absent
/// - [`ConfigError::TypeMismatch`] if a value has the wrong type
/// - [`ConfigError::InvalidSchemaDefinition`] if a schema node is neither a
///   known type tag nor a mapping
///
/// # Example
///
/// ```
/// use conflux_config::validate;
/// use serde_json::json;
///
/// let schema = json!({"app_name": "str", "app": {"app_version": "str"}});
/// let document = json!({"app_name": "demo", "app": {"app_version": "1.0"}, "extra": 1});
///
/// validate(
///     document.as_object().unwrap(),
///     schema.as_object().unwrap(),
/// ).unwrap();
/// ```
pub fn validate(document: &Document, schema: &Schema) -> Result<(), ConfigError> {
    for (key, expected) in schema {
        let value = document
            .get(key)
            .ok_or_else(|| ConfigError::missing_field(key))?;
        validate_value(key, value, expected)?;
    }

    Ok(())
}

fn validate_value(key: &str, value: &Value, expected: &Value) -> Result<(), ConfigError> {
    match expected {
        Value::String(tag) => {
            let tag: TypeTag = tag
                .parse()
                .map_err(|reason| ConfigError::invalid_schema(key, reason))?;

            if tag.matches(value) {
                Ok(())
            } else {
                Err(ConfigError::type_mismatch(key, tag.as_str(), type_name(value)))
            }
        }
        Value::Object(nested) => match value {
            Value::Object(inner) => validate(inner, nested),
            other => Err(ConfigError::type_mismatch(
                key,
                TypeTag::Dict.as_str(),
                type_name(other),
            )),
        },
        other => Err(ConfigError::invalid_schema(
            key,
            format!(
                "expected a type tag or a nested mapping, found {}",
                type_name(other)
            ),
        )),
    }
}
