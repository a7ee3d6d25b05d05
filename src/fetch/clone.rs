//! Cached git clones

use crate::fetch::RepoContext;
use crate::utils::short_sha256;
use anyhow::{Context, Result};
use git2::{build::RepoBuilder, FetchOptions, Repository, ResetType};
use std::path::{Path, PathBuf};

/// Cache location for `url`: `clone_base/<first 10 hex chars of sha256(url)>`.
pub fn cache_dir_for(url: &str, clone_base: &Path) -> PathBuf {
    clone_base.join(short_sha256(url, 10))
}

/// Clone `url` into the cache, or bring an existing cached clone up to date.
///
/// A cached directory that cannot be opened or updated is deleted and
/// cloned again from scratch.
pub fn clone_repository(url: &str, clone_base: &Path) -> Result<RepoContext> {
    let path = cache_dir_for(url, clone_base);

    if path.exists() {
        match update_existing(&path) {
            Ok(()) => {
                tracing::info!("Updated cached clone of {} at {}", url, path.display());
                return Ok(RepoContext::new(path, url));
            }
            Err(err) => {
                tracing::warn!("Discarding cached clone {}: {:#}", path.display(), err);
                std::fs::remove_dir_all(&path).with_context(|| {
                    format!("Failed removing stale clone: {}", path.display())
                })?;
            }
        }
    }

    std::fs::create_dir_all(clone_base)
        .with_context(|| format!("Failed creating clone base: {}", clone_base.display()))?;

    shallow_clone(url, &path).or_else(|err| {
        tracing::debug!("Shallow clone failed ({err:#}); retrying with a full clone");
        let _ = std::fs::remove_dir_all(&path);
        Repository::clone(url, &path).with_context(|| format!("Failed cloning repository from {url}"))
    })?;
    tracing::info!("Cloned {} into {}", url, path.display());
    Ok(RepoContext::new(path, url))
}

/// Shallow clone (depth=1) the default branch.
fn shallow_clone(url: &str, dest: &Path) -> Result<Repository> {
    let mut fo = FetchOptions::new();
    fo.depth(1);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fo);

    builder.clone(url, dest).with_context(|| format!("Shallow clone from {url} failed"))
}

/// Fetch `origin` and hard-reset the checked-out branch to its remote head.
fn update_existing(path: &Path) -> Result<()> {
    let repo = Repository::open(path).context("Not a git repository")?;
    let branch = repo
        .head()
        .context("Repository has no HEAD")?
        .shorthand()
        .map(str::to_string)
        .context("HEAD is not a named branch")?;

    {
        let mut remote = repo.find_remote("origin").context("No origin remote")?;
        let mut fo = FetchOptions::new();
        fo.depth(1);
        remote
            .fetch(&[branch.as_str()], Some(&mut fo), None)
            .with_context(|| format!("Failed fetching branch {branch}"))?;
    }

    let target = repo
        .find_reference("FETCH_HEAD")
        .or_else(|_| repo.find_reference(&format!("refs/remotes/origin/{branch}")))
        .context("No fetched head to reset to")?
        .peel_to_commit()?;
    repo.reset(target.as_object(), ResetType::Hard, None)
        .with_context(|| format!("Failed resetting {branch} to {}", target.id()))?;
    Ok(())
}
