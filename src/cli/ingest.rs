//! Ingest command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::utils::{effective_config, parse_csv};
use crate::config::CliOverrides;
use crate::embed::build_embedder;
use crate::fetch::RepoSource;
use crate::ingest::ingest_repository;
use crate::store::DocumentStore;

#[derive(Args)]
pub struct IngestArgs {
    /// Local directory to ingest
    #[arg(short, long, value_name = "PATH", conflicts_with = "repo", required_unless_present = "repo")]
    pub path: Option<PathBuf>,

    /// Git repository URL to clone (cached under the clone base) and ingest
    #[arg(short = 'r', long, value_name = "URL")]
    pub repo: Option<String>,

    /// Path to config file (testgen.toml or testgen.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Vector store file to rebuild
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Directory holding cached clones
    #[arg(long, value_name = "DIR")]
    pub clone_base: Option<PathBuf>,

    /// Include only these extensions (comma-separated, e.g., '.py,.bpmn')
    #[arg(short = 'i', long, value_name = "EXTS")]
    pub include_ext: Option<String>,

    /// Exclude paths matching these globs (comma-separated)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub exclude_glob: Option<String>,

    /// Honor .gitignore rules while extracting
    #[arg(long)]
    pub gitignore: bool,
}

pub fn run(args: IngestArgs) -> Result<()> {
    let overrides = CliOverrides {
        clone_base: args.clone_base.clone(),
        store_path: args.store.clone(),
        include_extensions: parse_csv(&args.include_ext),
        exclude_globs: parse_csv(&args.exclude_glob),
        respect_gitignore: args.gitignore.then_some(true),
        ..CliOverrides::default()
    };
    let config = effective_config(args.config.as_deref(), &overrides)?;

    let source = match (args.repo, args.path) {
        (Some(url), _) => RepoSource::parse(&url),
        (None, Some(path)) => RepoSource::Local(path),
        (None, None) => anyhow::bail!("Either --path or --repo is required"),
    };

    let mut store = DocumentStore::open(&config.store_path)
        .with_context(|| format!("Failed opening store: {}", config.store_path.display()))?;
    let embedder = build_embedder(config.embedding.dimension);

    let summary = ingest_repository(&source, &config, embedder.as_ref(), &mut store)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
