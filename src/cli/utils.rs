//! Shared CLI utilities.

use crate::config::{resolve_config, CliOverrides};
use crate::domain::Config;
use crate::store::DocumentStore;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Resolve the effective config, discovering config files in the working directory.
pub fn effective_config(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Config> {
    let cwd = std::env::current_dir()?;
    resolve_config(&cwd, config_path, overrides)
}

/// Open an existing store; retrieval against a missing one is a usage error.
pub fn open_existing_store(path: &Path) -> Result<DocumentStore> {
    if !path.is_file() {
        anyhow::bail!(
            "No document store at {}; run `testgen-rag ingest` first",
            path.display()
        );
    }
    DocumentStore::open(path).with_context(|| format!("Failed opening store: {}", path.display()))
}

/// Write to `output`, or stdout when absent.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_trims_and_drops_empty() {
        assert_eq!(
            parse_csv(&Some(" .py, ,java ".to_string())),
            Some(vec![".py".to_string(), "java".to_string()])
        );
        assert_eq!(parse_csv(&None), None);
    }
}
