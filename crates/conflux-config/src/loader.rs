//! Configuration file loading with an mtime-checked cache.
//!
//! The [`FileLoader`] reads a file, picks a parser from the file extension and
//! keeps the parsed [`Document`] keyed by canonical path. A later load of the
//! same path returns the cached document as long as the file's modification
//! time has not changed; otherwise the file is parsed again and the entry is
//! replaced.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::format::{ConfigFormat, Document};
use crate::ConfigError;

/// A parsed document paired with the mtime of the file it came from.
#[derive(Debug, Clone)]
struct CacheEntry {
    document: Arc<Document>,
    modified: SystemTime,
}

/// Loads configuration files and caches the parsed result.
///
/// The cache has no size bound and no eviction. A process typically reads a
/// handful of configuration files, so entries live as long as the loader.
///
/// # Example
///
/// ```no_run
/// use conflux_config::FileLoader;
///
/// # fn main() -> Result<(), conflux_config::ConfigError> {
/// let loader = FileLoader::new();
/// let first = loader.load("settings/config.yaml")?;
/// let second = loader.load("settings/config.yaml")?;
///
/// // Unchanged file, same document.
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct FileLoader {
    cache: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl FileLoader {
    /// Create a loader with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist ([`ConfigError::FileNotFound`])
    /// - The extension is not supported ([`ConfigError::UnsupportedFormat`])
    /// - The file cannot be read ([`ConfigError::ReadError`])
    /// - The content is malformed for its format ([`ConfigError::Parse`])
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Document>, ConfigError> {
        let path = path.as_ref();

        let result = self.load_inner(path);
        match &result {
            Err(ConfigError::FileNotFound { .. }) => {
                warn!(path = %path.display(), "configuration file not found");
            }
            Err(e) if e.is_parse_error() => {
                error!(path = %path.display(), error = %e, "invalid configuration file");
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load configuration file");
            }
            Ok(_) => {}
        }

        result
    }

    /// Parse in-memory content without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the content is malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use conflux_config::{ConfigFormat, FileLoader};
    ///
    /// let doc = FileLoader::parse_str("app_name = \"demo\"", ConfigFormat::Toml).unwrap();
    /// assert_eq!(doc["app_name"], "demo");
    /// ```
    pub fn parse_str(content: &str, format: ConfigFormat) -> Result<Document, ConfigError> {
        format.parse(content, Path::new("<string>"))
    }

    /// Number of cached documents.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Drop every cached document.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    fn load_inner(&self, path: &Path) -> Result<Arc<Document>, ConfigError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::file_not_found(path));
            }
            Err(e) => return Err(ConfigError::read_error(path, e)),
        };
        let modified = metadata
            .modified()
            .map_err(|e| ConfigError::read_error(path, e))?;
        let key = fs::canonicalize(path).map_err(|e| ConfigError::read_error(path, e))?;

        let cached = self.cache.lock().get(&key).cloned();
        if let Some(entry) = cached {
            if entry.modified == modified {
                trace!(path = %key.display(), "configuration cache hit");
                return Ok(entry.document);
            }
            debug!(path = %key.display(), "configuration file changed, reloading");
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::file_not_found(path),
            _ => ConfigError::read_error(path, e),
        })?;
        let document = Arc::new(format.parse(&content, path)?);

        self.cache.lock().insert(
            key,
            CacheEntry {
                document: Arc::clone(&document),
                modified,
            },
        );
        debug!(path = %path.display(), %format, "loaded configuration file");

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use filetime::FileTime;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn bump_mtime(path: &Path) {
        let modified = fs::metadata(path).unwrap().modified().unwrap() + Duration::from_secs(10);
        filetime::set_file_mtime(path, FileTime::from_system_time(modified)).unwrap();
    }

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.yaml", "app_name: demo\n");

        let doc = FileLoader::new().load(&path).unwrap();
        assert_eq!(doc["app_name"], json!("demo"));
    }

    #[test]
    fn test_load_each_extension() {
        let dir = TempDir::new().unwrap();
        let loader = FileLoader::new();

        for (name, content) in [
            ("a.yml", "key: 1\n"),
            ("b.YAML", "key: 1\n"),
            ("c.json", "{\"key\": 1}"),
            ("d.toml", "key = 1\n"),
        ] {
            let doc = loader.load(write(&dir, name, content)).unwrap();
            assert_eq!(doc["key"], json!(1), "{name}");
        }
        assert_eq!(loader.cached_len(), 4);
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.ini", "[section]\n");

        let err = FileLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { ref extension, .. } if extension == "ini"));
    }

    #[test]
    fn test_load_file_not_found() {
        let dir = TempDir::new().unwrap();
        let err = FileLoader::new()
            .load(dir.path().join("missing.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_malformed_content() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.toml", "app_name = \n");

        let loader = FileLoader::new();
        let err = loader.load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: ConfigFormat::Toml, .. }));
        assert_eq!(loader.cached_len(), 0);
    }

    #[test]
    fn test_cache_hit_returns_same_document() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.json", r#"{"app_name": "demo"}"#);

        let loader = FileLoader::new();
        let first = loader.load(&path).unwrap();
        let second = loader.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_first_loads_agree() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.toml", "app_name = \"demo\"\nworkers = 4\n");

        let loader = FileLoader::new();
        let documents: Vec<Arc<Document>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| loader.load(&path).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(loader.cached_len(), 1);
        let cached = loader.load(&path).unwrap();
        for document in &documents {
            assert_eq!(**document, *cached);
        }
        assert!(Arc::ptr_eq(&cached, &loader.load(&path).unwrap()));
    }

    #[test]
    fn test_cache_keyed_by_canonical_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        let path = write(&dir, "config.yaml", "app_name: demo\n");
        let indirect = dir.path().join("nested").join("..").join("config.yaml");

        let loader = FileLoader::new();
        let first = loader.load(&path).unwrap();
        let second = loader.load(&indirect).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cached_len(), 1);
    }

    #[test]
    fn test_changed_mtime_reloads() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.yaml", "app_name: before\n");

        let loader = FileLoader::new();
        let first = loader.load(&path).unwrap();

        fs::write(&path, "app_name: after\n").unwrap();
        bump_mtime(&path);

        let second = loader.load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second["app_name"], json!("after"));
        assert_eq!(first["app_name"], json!("before"));
        assert_eq!(loader.cached_len(), 1);
    }

    #[test]
    fn test_unchanged_mtime_serves_cached_content() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.yaml", "app_name: before\n");
        let loader = FileLoader::new();
        loader.load(&path).unwrap();

        let original = FileTime::from_last_modification_time(&fs::metadata(&path).unwrap());
        fs::write(&path, "app_name: after\n").unwrap();
        filetime::set_file_mtime(&path, original).unwrap();

        let doc = loader.load(&path).unwrap();
        assert_eq!(doc["app_name"], json!("before"));
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.yaml", "a: 1\n");
        let loader = FileLoader::new();

        let first = loader.load(&path).unwrap();
        loader.clear();
        assert_eq!(loader.cached_len(), 0);

        let second = loader.load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_str() {
        let doc = FileLoader::parse_str(r#"{"a": {"b": true}}"#, ConfigFormat::Json).unwrap();
        assert_eq!(doc["a"]["b"], json!(true));
    }
}
