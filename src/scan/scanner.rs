//! Workspace file discovery

use crate::domain::{
    default_include_extensions, default_skip_dirs, normalize_extension, FileInfo, ScanStats,
};
use crate::utils::encoding::DEFAULT_SAMPLE_SIZE;
use crate::utils::{is_binary_file, normalize_path};
use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::PathBuf;

/// Discovers files under a root, pruning skipped directories by name.
pub struct FileScanner {
    root_path: PathBuf,
    /// Empty means every extension is accepted.
    include_extensions: Vec<String>,
    skip_dirs: HashSet<String>,
    exclude_globs: Vec<String>,
    max_file_bytes: u64,
    respect_gitignore: bool,
    stats: ScanStats,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            include_extensions: default_include_extensions().iter().map(|s| s.to_string()).collect(),
            skip_dirs: default_skip_dirs().iter().map(|s| s.to_string()).collect(),
            exclude_globs: Vec::new(),
            max_file_bytes: 1_000_000,
            respect_gitignore: false,
            stats: ScanStats::default(),
        }
    }

    /// Extensions to keep (e.g. ".py"); a missing leading dot is added.
    pub fn include_extensions(mut self, extensions: Vec<String>) -> Self {
        self.include_extensions = extensions.into_iter().map(|e| normalize_extension(&e)).collect();
        self
    }

    pub fn skip_dirs(mut self, dirs: Vec<String>) -> Self {
        self.skip_dirs = dirs.into_iter().collect();
        self
    }

    pub fn exclude_globs(mut self, globs: Vec<String>) -> Self {
        self.exclude_globs = globs;
        self
    }

    pub fn max_file_bytes(mut self, max_bytes: u64) -> Self {
        self.max_file_bytes = max_bytes;
        self
    }

    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    fn build_exclude_globset(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_globs {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => tracing::warn!("Ignoring invalid exclude glob {pattern:?}: {err}"),
            }
        }
        Ok(builder.build()?)
    }

    fn should_include_extension(&self, extension: &str) -> bool {
        self.include_extensions.is_empty() || self.include_extensions.iter().any(|e| e == extension)
    }

    /// Scan the root; files come back sorted by relative path.
    pub fn scan(&mut self) -> Result<Vec<FileInfo>> {
        self.stats = ScanStats::default();
        let exclude_globset = self.build_exclude_globset()?;

        let skip_dirs = self.skip_dirs.clone();
        let mut builder = WalkBuilder::new(&self.root_path);
        builder
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .hidden(false)
            .parents(self.respect_gitignore)
            .follow_links(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && entry.file_name().to_str().is_some_and(|n| skip_dirs.contains(n)))
            });

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::debug!("Skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            self.stats.files_scanned += 1;

            let path = entry.path();
            let Ok(rel) = path.strip_prefix(&self.root_path) else {
                continue;
            };
            let relative_path = normalize_path(&rel.to_string_lossy());

            if exclude_globset.is_match(&relative_path) {
                self.stats.files_skipped_glob += 1;
                continue;
            }

            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(normalize_extension)
                .unwrap_or_default();
            if !self.should_include_extension(&extension) {
                self.stats.files_skipped_extension += 1;
                continue;
            }

            let size_bytes = match entry.metadata() {
                Ok(m) => m.len(),
                Err(_) => continue,
            };
            if size_bytes > self.max_file_bytes {
                tracing::info!("Skipping large file: {}", relative_path);
                self.stats.files_skipped_size += 1;
                continue;
            }

            if is_binary_file(path, DEFAULT_SAMPLE_SIZE) {
                self.stats.files_skipped_binary += 1;
                continue;
            }

            *self.stats.extensions_detected.entry(extension.clone()).or_insert(0) += 1;
            self.stats.files_included += 1;
            self.stats.total_bytes_included += size_bytes;
            files.push(FileInfo { path: path.to_path_buf(), relative_path, size_bytes, extension });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}
