//! Copy the relevant part of a repository into a scratch workspace.

use super::scanner::FileScanner;
use crate::domain::{ExtractConfig, ScanStats};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Copy every file of `repo_path` that passes `config` into `workspace`,
/// preserving relative paths. Returns the scan statistics.
pub fn extract_relevant_files(
    repo_path: &Path,
    workspace: &Path,
    config: &ExtractConfig,
) -> Result<ScanStats> {
    let mut scanner = FileScanner::new(repo_path.to_path_buf())
        .include_extensions(config.include_extensions.clone())
        .skip_dirs(config.skip_dirs.clone())
        .exclude_globs(config.exclude_globs.clone())
        .max_file_bytes(config.max_file_bytes)
        .respect_gitignore(config.respect_gitignore);

    let files = scanner.scan()?;
    for file in &files {
        let target = workspace.join(&file.relative_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed creating directory: {}", parent.display()))?;
        }
        fs::copy(&file.path, &target).with_context(|| {
            format!("Failed copying {} to {}", file.path.display(), target.display())
        })?;
    }

    tracing::info!("Extracted {} files to workspace {}", files.len(), workspace.display());
    Ok(scanner.stats().clone())
}
