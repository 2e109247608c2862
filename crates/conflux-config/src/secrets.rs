//! Secrets from the environment and dotenv files.
//!
//! The process environment is captured once as a snapshot so that assembling
//! settings never depends on, or changes, the live environment. Dotenv files
//! are read with `dotenvy` without exporting their entries.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::settings::SecretConfig;
use crate::ConfigError;

/// A case-insensitive snapshot of environment variables.
#[derive(Debug, Clone, Default)]
pub struct SecretSource {
    vars: HashMap<String, String>,
}

impl SecretSource {
    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process_env() -> Self {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?))),
        )
    }

    /// Build a source from explicit variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_lowercase(), value.into()))
            .collect();
        Self { vars }
    }

    /// Value of a variable, matched case-insensitively.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Read secrets.
    ///
    /// Every entry of the dotenv file at `dotenv_path` becomes a secret, with
    /// the environment taking precedence for the same name. Names in
    /// `declared` are also taken from the environment when the file lacks
    /// them. A missing dotenv file is skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Dotenv`] if the dotenv file is malformed.
    pub fn read<'a>(
        &self,
        dotenv_path: Option<&Path>,
        declared: impl IntoIterator<Item = &'a str>,
    ) -> Result<SecretConfig, ConfigError> {
        let mut pairs = match dotenv_path {
            Some(path) => read_dotenv(path)?,
            None => Vec::new(),
        };

        for (key, value) in &mut pairs {
            if let Some(overridden) = self.var(key) {
                debug!(key = %key, "environment overrides dotenv secret");
                overridden.clone_into(value);
            }
        }

        for name in declared {
            let present = pairs.iter().any(|(key, _)| key.eq_ignore_ascii_case(name));
            if !present {
                if let Some(value) = self.var(name) {
                    pairs.push((name.to_string(), value.to_string()));
                }
            }
        }

        Ok(SecretConfig::from_pairs(pairs))
    }
}

fn read_dotenv(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => {
            warn!(path = %path.display(), "dotenv file not found, skipping");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(ConfigError::Dotenv {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    entries
        .map(|entry| {
            entry.map_err(|source| ConfigError::Dotenv {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}
