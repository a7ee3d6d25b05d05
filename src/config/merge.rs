//! Environment and CLI overrides on top of a loaded config

use crate::domain::{normalize_extension, Config};
use std::path::PathBuf;

/// Values given on the command line. `None` leaves the config untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub clone_base: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
    pub tests_dir: Option<PathBuf>,
    pub prompt_rules: Option<PathBuf>,
    pub model: Option<String>,
    pub top_k: Option<usize>,
    pub include_extensions: Option<Vec<String>>,
    pub exclude_globs: Option<Vec<String>>,
    pub respect_gitignore: Option<bool>,
}

/// Apply `GROQ_API_KEY`, `GROQ_MODEL`, `LLM_BASE_URL` and `CLONE_BASE`.
pub fn apply_env_overrides(config: &mut Config) {
    apply_env_from(config, |key| std::env::var(key).ok());
}

fn apply_env_from(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = get("GROQ_API_KEY") {
        config.llm.api_key = Some(key);
    }
    if let Some(model) = get("GROQ_MODEL") {
        config.llm.model = model;
    }
    if let Some(url) = get("LLM_BASE_URL") {
        config.llm.base_url = url;
    }
    if let Some(base) = get("CLONE_BASE") {
        config.clone_base = PathBuf::from(base);
    }
}

pub fn merge_cli_with_config(mut config: Config, cli: &CliOverrides) -> Config {
    if let Some(path) = &cli.clone_base {
        config.clone_base = path.clone();
    }
    if let Some(path) = &cli.store_path {
        config.store_path = path.clone();
    }
    if let Some(path) = &cli.tests_dir {
        config.tests_dir = path.clone();
    }
    if let Some(path) = &cli.prompt_rules {
        config.prompt_rules = path.clone();
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(top_k) = cli.top_k {
        config.retrieval.top_k = top_k;
    }
    if let Some(exts) = &cli.include_extensions {
        config.extract.include_extensions = exts.iter().map(|e| normalize_extension(e)).collect();
    }
    if let Some(globs) = &cli.exclude_globs {
        config.extract.exclude_globs = globs.clone();
    }
    if let Some(respect) = cli.respect_gitignore {
        config.extract.respect_gitignore = respect;
    }
    config
}
