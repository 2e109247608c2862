//! Conflux - Entry point
//!
//! Loads and validates the application settings, installs logging from
//! them, and reports what was loaded.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use conflux::{logging_options, SettingsPaths};

/// Command-line arguments.
struct Args {
    /// Settings file paths.
    paths: SettingsPaths,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut paths = SettingsPaths::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => paths.config = required(&arg, args.next()),
                "--schema" | "-s" => paths.schema = required(&arg, args.next()),
                "--env" | "-e" => paths.env = required(&arg, args.next()),
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("conflux {}", conflux::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { paths }
    }
}

fn required(flag: &str, value: Option<String>) -> PathBuf {
    match value {
        Some(value) => PathBuf::from(value),
        None => {
            eprintln!("Missing value for {flag}");
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!(
        r"Conflux - Schema-checked application settings

USAGE:
    conflux [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Application config file, YAML, JSON or TOML
                           (default: ./settings/config.yaml)
    -s, --schema <PATH>    Schema file (default: ./settings/schema.yaml)
    -e, --env <PATH>       Dotenv file with secrets (default: ./settings/.env)
    -h, --help             Print help information
    -v, --version          Print version information

Environment variables override dotenv entries of the same name.

EXAMPLES:
    # Validate the settings in ./settings
    conflux

    # Validate a TOML config against a custom schema
    conflux --config deploy/app.toml --schema deploy/schema.yaml
"
    );
}

fn run(args: &Args) -> anyhow::Result<()> {
    let settings = args.paths.load().context("Failed to load settings")?;

    let options = logging_options(&settings).context("Invalid logging configuration")?;
    let _guard = conflux::telemetry::init_logging(&options)
        .context("Failed to initialize logging")?;

    let application = settings.application();
    info!(
        config = %args.paths.config.display(),
        schema = %args.paths.schema.display(),
        "Settings loaded"
    );
    info!(
        "Application name: {}",
        application.app_name().unwrap_or("<unset>")
    );
    if let Some(version) = application
        .lookup("app.app_version")
        .and_then(|value| value.as_str())
    {
        info!("Application version: {version}");
    }
    info!(count = settings.secrets().len(), "Secrets loaded");

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
