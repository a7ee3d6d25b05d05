//! Repository and scratch-directory handles

use std::env;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A repository checked out on disk, ready to be extracted.
#[derive(Debug, Clone)]
pub struct RepoContext {
    pub root_path: PathBuf,
    /// The URL or path the caller asked for.
    pub origin: String,
    pub commit: Option<String>,
}

impl RepoContext {
    pub fn new(root_path: PathBuf, origin: impl Into<String>) -> Self {
        let commit = head_commit(&root_path);
        Self { root_path, origin: origin.into(), commit }
    }
}

fn head_commit(root: &Path) -> Option<String> {
    let repo = git2::Repository::open(root).ok()?;
    let head = repo.head().ok()?;
    head.target().map(|oid| oid.to_string())
}

/// A uniquely named temporary directory, removed when dropped.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn create(prefix: &str) -> std::io::Result<Self> {
        let nanos =
            SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
        let pid = std::process::id();
        let path = env::temp_dir().join(format!("{prefix}-{pid}-{nanos}"));
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
