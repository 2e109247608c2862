//! Settings assembly from a config file, a schema file and a secrets overlay.

use std::path::Path;

use tracing::{debug, error};

use crate::format::Document;
use crate::loader::FileLoader;
use crate::schema::validate;
use crate::secrets::SecretSource;
use crate::section::{SectionResolver, APPLICATION_SECTION, SECRETS_SECTION};
use crate::settings::{ApplicationConfig, SecretConfig, Settings};
use crate::ConfigError;

/// Assembles [`Settings`] from up to three optional files.
///
/// 1. The `application` section of the schema is resolved (optional).
/// 2. The config file is loaded and validated against it.
/// 3. Secrets are read from the environment snapshot and the dotenv file.
/// 4. The `secrets` section, if any, validates them.
/// 5. A `logging` entry must be a mapping.
///
/// Assembly is all-or-nothing: the first error is returned unchanged and no
/// partial settings are produced.
///
/// # Example
///
/// ```no_run
/// use conflux_config::{ConfigAssembler, FileLoader};
///
/// # fn main() -> Result<(), conflux_config::ConfigError> {
/// let loader = FileLoader::new();
/// let settings = ConfigAssembler::new(&loader).assemble(
///     Some("settings/config.yaml".as_ref()),
///     Some("settings/schema.yaml".as_ref()),
///     Some("settings/.env".as_ref()),
/// )?;
///
/// println!("{:?}", settings.application().app_name());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigAssembler<'a> {
    loader: &'a FileLoader,
    env: SecretSource,
}

impl<'a> ConfigAssembler<'a> {
    /// Create an assembler reading files through `loader` and secrets from
    /// the current process environment.
    pub fn new(loader: &'a FileLoader) -> Self {
        Self {
            loader,
            env: SecretSource::from_process_env(),
        }
    }

    /// Replace the environment snapshot.
    #[must_use]
    pub fn with_env(mut self, env: SecretSource) -> Self {
        self.env = env;
        self
    }

    /// Replace the environment snapshot with explicit variables.
    #[must_use]
    pub fn with_env_vars<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.with_env(SecretSource::from_vars(vars))
    }

    /// Assemble settings.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` raised while loading, parsing or
    /// validating any of the inputs.
    pub fn assemble(
        &self,
        config_path: Option<&Path>,
        schema_path: Option<&Path>,
        env_path: Option<&Path>,
    ) -> Result<Settings, ConfigError> {
        let application = self.load_application(config_path, schema_path)?;
        let secrets = self.load_secrets(schema_path, env_path)?;

        debug!(
            config = ?config_path,
            schema = ?schema_path,
            env = ?env_path,
            secrets = secrets.len(),
            "assembled settings"
        );

        Ok(Settings::new(application, secrets))
    }

    fn resolver(&self) -> SectionResolver<'a> {
        SectionResolver::new(self.loader)
    }

    fn load_application(
        &self,
        config_path: Option<&Path>,
        schema_path: Option<&Path>,
    ) -> Result<ApplicationConfig, ConfigError> {
        let Some(config_path) = config_path else {
            return Ok(ApplicationConfig::default());
        };

        let schema = self.resolver().section(schema_path, APPLICATION_SECTION)?;
        let document = self.loader.load(config_path)?;
        if let Some(schema) = &schema {
            validate(&document, schema)?;
        }

        ApplicationConfig::from_document(Document::clone(&document))
    }

    fn load_secrets(
        &self,
        schema_path: Option<&Path>,
        env_path: Option<&Path>,
    ) -> Result<SecretConfig, ConfigError> {
        let schema = self.resolver().section(schema_path, SECRETS_SECTION)?;
        let declared = schema.iter().flat_map(|s| s.keys().map(String::as_str));
        let secrets = self.env.read(env_path, declared)?;

        if let Some(schema) = &schema {
            if let Err(e) = validate(secrets.as_map(), schema) {
                error!(error = %e, "secret configuration validation failed");
                return Err(e);
            }
        }

        Ok(secrets)
    }
}
