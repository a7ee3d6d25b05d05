//! Configuration loading and merging
//!
//! Precedence: CLI > environment > config file > defaults.

pub mod loader;
pub mod merge;

pub use loader::load_config;
pub use merge::{apply_env_overrides, merge_cli_with_config, CliOverrides};

use crate::domain::Config;
use anyhow::Result;
use std::path::Path;

/// Load, then layer environment and CLI overrides.
pub fn resolve_config(root: &Path, config_path: Option<&Path>, cli: &CliOverrides) -> Result<Config> {
    let mut config = load_config(root, config_path)?;
    apply_env_overrides(&mut config);
    Ok(merge_cli_with_config(config, cli))
}
