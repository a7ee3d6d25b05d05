//! Config file discovery and parsing

use crate::domain::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CANDIDATES: [&str; 5] =
    ["testgen.toml", ".testgen.toml", "testgen.yml", "testgen.yaml", ".testgen.yaml"];

/// Nested section name accepted at the top of a config file.
const SECTION: &str = "testgen";

/// Load the config from `config_path`, or from a file discovered in `root`.
///
/// An explicit file that fails to parse is an error. A discovered one only
/// logs a warning and yields the defaults.
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();
    let Some(config_file) = config_path.map(Path::to_path_buf).or_else(|| discover_config(root))
    else {
        return Ok(Config::default());
    };

    match parse_config_file(&config_file) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", config_file.display());
            Ok(config)
        }
        Err(err) if explicit => Err(err),
        Err(err) => {
            tracing::warn!("Ignoring config {}: {:#}", config_file.display(), err);
            Ok(Config::default())
        }
    }
}

fn parse_config_file(config_file: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;
    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    match ext.as_str() {
        "toml" => parse_toml_config(&content, config_file),
        "yaml" | "yml" => parse_yaml_config(&content, config_file),
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    }
}

fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;
    let config_val = raw.get(SECTION).cloned().unwrap_or(raw);
    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;
    let config_val = raw.get(SECTION).cloned().unwrap_or(raw);
    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(root: &Path) -> Option<PathBuf> {
    CANDIDATES.iter().map(|name| root.join(name)).find(|path| path.is_file())
}
