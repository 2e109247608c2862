//! Schema-checked configuration loading for Conflux.
//!
//! This crate loads application configuration at startup with support for:
//! - YAML, JSON and TOML files, selected by extension
//! - A per-file parse cache invalidated by modification time
//! - Schema files declaring required fields and their types
//! - Secrets from the environment overlaid with a dotenv file
//! - Memoized assembly of the final [`Settings`]
//!
//! # Overview
//!
//! - [`FileLoader`] - reads and caches parsed documents
//! - [`validate`] - checks a document against a schema
//! - [`SectionResolver`] - picks the `application` / `secrets` sections of a schema file
//! - [`ConfigAssembler`] - builds [`Settings`] from config, schema and dotenv paths
//! - [`SettingsCache`] - memoizes assembled settings per path triple
//!
//! # Example
//!
//! ```no_run
//! use conflux_config::SettingsCache;
//!
//! # fn main() -> Result<(), conflux_config::ConfigError> {
//! let settings = SettingsCache::global().get_or_create(
//!     Some("settings/config.yaml".as_ref()),
//!     Some("settings/schema.yaml".as_ref()),
//!     Some("settings/.env".as_ref()),
//! )?;
//!
//! println!("Application name: {:?}", settings.application().app_name());
//! # Ok(())
//! # }
//! ```
//!
//! # Schema File Format
//!
//! ```yaml
//! application:
//!   app_name: str
//!   app:
//!     app_version: str
//!   logging: dict
//! secrets:
//!   secret: str
//! ```
//!
//! Type tags: `str`, `bool`, `int`, `float`, `list`, `dict`, `NoneType`,
//! `tuple`. A schema file is optional; when it is absent validation is
//! skipped. When it is present it must contain every section the assembler
//! asks for.

#![warn(missing_docs)]

mod assembler;
mod cache;
mod error;
mod format;
mod loader;
mod schema;
mod secrets;
mod section;
mod settings;

pub use assembler::ConfigAssembler;
pub use cache::{SettingsCache, SettingsCacheKey};
pub use error::{BoxedSource, ConfigError};
pub use format::{ConfigFormat, Document};
pub use loader::FileLoader;
pub use schema::{type_name, validate, Schema, TypeTag};
pub use secrets::SecretSource;
pub use section::{section_of, SectionResolver, APPLICATION_SECTION, SECRETS_SECTION};
pub use settings::{ApplicationConfig, SecretConfig, Settings};
