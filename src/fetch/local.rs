//! Local path validation

use crate::fetch::RepoContext;
use anyhow::{Context, Result};
use std::path::Path;

pub fn validate_local_path(path: &Path) -> Result<RepoContext> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !canonical.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    Ok(RepoContext::new(canonical, path.to_string_lossy()))
}
