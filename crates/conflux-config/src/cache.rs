//! Memoization of assembled settings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use crate::assembler::ConfigAssembler;
use crate::loader::FileLoader;
use crate::secrets::SecretSource;
use crate::settings::Settings;
use crate::ConfigError;

/// Key of a [`SettingsCache`] entry: config, schema and env paths as given.
pub type SettingsCacheKey = (Option<PathBuf>, Option<PathBuf>, Option<PathBuf>);

/// Caches assembled [`Settings`] by the exact triple of input paths.
///
/// The first request for a triple assembles the settings; every later request
/// for the same triple returns the same `Arc`, even if the files have since
/// changed on disk. Entries are never invalidated. Use a different triple or a
/// new cache to see fresh settings. Failed assemblies are not cached.
///
/// The cache owns the [`FileLoader`] used for assembly, so file contents shared
/// between triples (typically the schema) are parsed once per mtime.
///
/// # Example
///
/// ```no_run
/// use conflux_config::SettingsCache;
///
/// # fn main() -> Result<(), conflux_config::ConfigError> {
/// let cache = SettingsCache::new();
/// let config = Some("settings/config.yaml".as_ref());
///
/// let first = cache.get_or_create(config, None, None)?;
/// let second = cache.get_or_create(config, None, None)?;
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsCache {
    loader: FileLoader,
    env: Option<SecretSource>,
    entries: Mutex<HashMap<SettingsCacheKey, Arc<Settings>>>,
}

impl SettingsCache {
    /// Create an empty cache that reads secrets from the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache whose assemblies use a fixed environment
    /// snapshot.
    #[must_use]
    pub fn with_env(env: SecretSource) -> Self {
        Self {
            env: Some(env),
            ..Self::default()
        }
    }

    /// The process-wide cache, created on first use and never torn down.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<SettingsCache> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Return the settings for a triple, assembling them on first request.
    ///
    /// # Errors
    ///
    /// Returns any error from [`ConfigAssembler::assemble`].
    pub fn get_or_create(
        &self,
        config_path: Option<&Path>,
        schema_path: Option<&Path>,
        env_path: Option<&Path>,
    ) -> Result<Arc<Settings>, ConfigError> {
        let key: SettingsCacheKey = (
            config_path.map(Path::to_path_buf),
            schema_path.map(Path::to_path_buf),
            env_path.map(Path::to_path_buf),
        );

        let cached = self.entries.lock().get(&key).cloned();
        if let Some(settings) = cached {
            return Ok(settings);
        }

        let mut assembler = ConfigAssembler::new(&self.loader);
        if let Some(env) = &self.env {
            assembler = assembler.with_env(env.clone());
        }
        let settings = Arc::new(assembler.assemble(config_path, schema_path, env_path)?);
        debug!(?key, "cached assembled settings");

        // A concurrent first request may have stored an entry meanwhile;
        // that one wins so every caller shares a single instance.
        let mut entries = self.entries.lock();
        Ok(Arc::clone(entries.entry(key).or_insert(settings)))
    }

    /// Number of cached settings.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no settings have been cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The file loader used for assembly.
    pub fn loader(&self) -> &FileLoader {
        &self.loader
    }
}
