//! Repository fetching (cached git clones or local paths)

use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod clone;
pub mod context;
pub mod local;

pub use context::{RepoContext, ScratchDir};

/// Where a repository comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    Remote(String),
    Local(PathBuf),
}

impl RepoSource {
    /// URLs (`scheme://…`, `git@host:…`) are remote; anything else is a path.
    pub fn parse(value: &str) -> Self {
        if value.contains("://") || value.starts_with("git@") {
            RepoSource::Remote(value.to_string())
        } else {
            RepoSource::Local(PathBuf::from(value))
        }
    }
}

/// Fetch a repository. Remote sources are cached under `clone_base`.
pub fn fetch_repository(source: &RepoSource, clone_base: &Path) -> Result<RepoContext> {
    match source {
        RepoSource::Remote(url) => clone::clone_repository(url, clone_base),
        RepoSource::Local(path) => local::validate_local_path(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_distinguishes_urls_from_paths() {
        assert_eq!(
            RepoSource::parse("https://github.com/acme/shop"),
            RepoSource::Remote("https://github.com/acme/shop".into())
        );
        assert_eq!(
            RepoSource::parse("git@github.com:acme/shop.git"),
            RepoSource::Remote("git@github.com:acme/shop.git".into())
        );
        assert_eq!(RepoSource::parse("./shop"), RepoSource::Local(PathBuf::from("./shop")));
    }
}
