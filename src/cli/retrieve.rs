//! Retrieve command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::utils::{effective_config, open_existing_store};
use crate::config::CliOverrides;
use crate::embed::build_embedder;
use crate::render::render_jsonl;

#[derive(Args)]
pub struct RetrieveArgs {
    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Path to config file (testgen.toml or testgen.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Vector store file to search
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Number of documents to return
    #[arg(short = 'k', long, value_name = "N")]
    pub top_k: Option<usize>,

    /// Print full documents as JSONL instead of a ranked list
    #[arg(long)]
    pub jsonl: bool,
}

pub fn run(args: RetrieveArgs) -> Result<()> {
    let overrides = CliOverrides {
        store_path: args.store.clone(),
        top_k: args.top_k,
        ..CliOverrides::default()
    };
    let config = effective_config(args.config.as_deref(), &overrides)?;

    let store = open_existing_store(&config.store_path)?;
    let embedder = build_embedder(config.embedding.dimension);
    let query = embedder.embed_one(&args.query)?;
    let hits = store.search(&query, config.retrieval.top_k)?;

    if args.jsonl {
        let documents: Vec<_> = hits.into_iter().map(|hit| hit.document).collect();
        print!("{}", render_jsonl(&documents));
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>2}. {:.3}  {:<4}  {}  ({})",
            rank + 1,
            hit.score,
            hit.document.kind.as_str(),
            hit.document.source,
            hit.document.id
        );
    }
    Ok(())
}
