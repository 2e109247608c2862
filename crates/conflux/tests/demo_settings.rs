//! The bundled demo settings load, validate and yield usable logging options.

use std::path::PathBuf;

use conflux::config::SecretSource;
use conflux::telemetry::{LoggingSetup, TemplateFormat};
use conflux::{logging_options, SettingsCache, SettingsPaths};

fn demo_paths() -> SettingsPaths {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/settings");
    SettingsPaths {
        config: root.join("config.yaml"),
        schema: root.join("schema.yaml"),
        env: root.join(".env"),
    }
}

#[test]
fn demo_settings_validate() {
    let cache = SettingsCache::with_env(SecretSource::default());
    let settings = demo_paths().load_with(&cache).unwrap();

    assert_eq!(settings.application().app_name(), Some("conflux-demo"));
    assert_eq!(
        settings
            .application()
            .lookup("app.app_version")
            .and_then(|v| v.as_str()),
        Some("1.0")
    );
    assert_eq!(settings.secrets().get_str("secret"), Some("change-me"));
}

#[test]
fn environment_overrides_demo_secret() {
    let cache = SettingsCache::with_env(SecretSource::from_vars([("SECRET", "from-env")]));
    let settings = demo_paths().load_with(&cache).unwrap();
    assert_eq!(settings.secrets().get_str("secret"), Some("from-env"));
}

#[test]
fn demo_logging_options_are_valid() {
    let cache = SettingsCache::with_env(SecretSource::default());
    let settings = demo_paths().load_with(&cache).unwrap();
    let options = logging_options(&settings).unwrap();

    let console = options.console.as_ref().unwrap();
    assert!(console.enabled);
    assert!(TemplateFormat::new(&console.format, &console.time_format).is_ok());

    let file = options.file.as_ref().unwrap();
    assert_eq!(file.file_path, PathBuf::from("logs/app.log"));
    assert!(file.rotation().is_ok());
    assert!(TemplateFormat::new(&file.format, &file.time_format).is_ok());
}

#[test]
fn file_sink_writes_under_temp_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let cache = SettingsCache::with_env(SecretSource::default());
    let settings = demo_paths().load_with(&cache).unwrap();

    let mut options = logging_options(&settings).unwrap();
    options.console = None;
    if let Some(file) = options.file.as_mut() {
        file.file_path = dir.path().join("logs").join("app.log");
    }

    let setup = LoggingSetup::new(&options).unwrap();
    assert_eq!(setup.layers.len(), 1);
    assert!(setup.guard.is_some());
    assert!(dir.path().join("logs").is_dir());
}
