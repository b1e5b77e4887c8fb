//! Handler for the `config` command group.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::json;

use super::diagnostic::{self, ConfigDiagnostic};
use super::output;
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::config::settings::{Config, STORE_ENV};

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Load the config file, falling back to defaults when it does not exist.
///
/// TOML syntax errors are rendered with their location before being returned.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Config::load_or_default(path),
        Err(e) => return Err(ConfigError::ReadFile(e).into()),
    };
    Config::parse_toml(&content).map_err(|err| {
        if let Error::Config(ConfigError::Parse(toml_err)) = &err {
            let name = path.display().to_string();
            if let Some(d) = ConfigDiagnostic::from_toml(name, &content, toml_err) {
                diagnostic::report(d);
            }
        }
        err
    })
}

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    if output::is_json() {
        output::json_output(json!({
            "command": "config init",
            "path": path.display().to_string(),
        }));
        return Ok(());
    }
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} with your room types and capacity", path.display()));
    output::note(&format!("2. Run: revpace config validate -c {}", path.display()));
    output::note("3. Run: revpace import <export.csv>");
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = load_config(path)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config show",
            "path": path.display().to_string(),
            "file_exists": path.exists(),
            "config": serde_json::to_value(&config)?,
        }));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("File", path.display());
    if !path.exists() {
        output::note("(file not found, showing defaults)");
    }

    output::section("Storage");
    output::field("Backend", config.storage.backend);
    match &config.storage.path {
        Some(store) => output::field("Path", store.display()),
        None => output::field(
            "Path",
            format!("{} (default)", config.storage.backend.default_location()),
        ),
    }
    if std::env::var_os(STORE_ENV).is_some() {
        output::note(&format!("path taken from {STORE_ENV}"));
    }

    output::section("Capacity");
    for (code, units) in &config.capacity {
        output::field(code, units);
    }

    output::section("Forecast");
    output::field("Method", config.forecast.method);
    output::field("High", format!("{}%", config.forecast.high_threshold));
    output::field("Low", format!("{}%", config.forecast.low_threshold));
    output::field(
        "Season",
        format!("{} .. {}", config.forecast.season_start, config.forecast.season_end),
    );

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);
    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    output::section("Config Validation");
    output::field("Path", path.display());

    let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
    let config = load_config(path)?;
    let mut warnings = Vec::new();
    if !content.contains("[capacity]") {
        warnings.push("no [capacity] section, using the default inventory".to_string());
    }
    if config.storage.path.is_none() {
        warnings.push(format!(
            "no [storage] path, using ~/.revpace/{}",
            config.storage.backend.default_location()
        ));
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "config validate",
            "path": path.display().to_string(),
            "valid": true,
            "warnings": warnings,
        }));
        return Ok(());
    }

    output::success("Config file is valid");
    if !warnings.is_empty() {
        output::section("Warnings");
        for warning in &warnings {
            output::warning(warning);
        }
    }
    output::field("Next", format!("revpace config show -c {}", path.display()));
    Ok(())
}
