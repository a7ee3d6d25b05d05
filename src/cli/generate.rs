//! Generate command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::utils::{effective_config, open_existing_store};
use crate::config::CliOverrides;
use crate::embed::build_embedder;
use crate::generate::{ChatCompletionsClient, Generator};

#[derive(Args)]
pub struct GenerateArgs {
    /// What the tests should cover
    #[arg(value_name = "PROMPT")]
    pub prompt: String,

    /// Path to config file (testgen.toml or testgen.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Vector store file to retrieve from
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Directory the generated .robot files are written to
    #[arg(long, value_name = "DIR")]
    pub tests_dir: Option<PathBuf>,

    /// System prompt rules file
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Model name (overrides GROQ_MODEL)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Number of documents to retrieve as context
    #[arg(short = 'k', long, value_name = "N")]
    pub top_k: Option<usize>,

    /// Save the suites without running Robot Framework
    #[arg(long)]
    pub no_run: bool,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let overrides = CliOverrides {
        store_path: args.store.clone(),
        tests_dir: args.tests_dir.clone(),
        prompt_rules: args.rules.clone(),
        model: args.model.clone(),
        top_k: args.top_k,
        ..CliOverrides::default()
    };
    let config = effective_config(args.config.as_deref(), &overrides)?;

    let store = open_existing_store(&config.store_path)?;
    let embedder = build_embedder(config.embedding.dimension);
    let llm = ChatCompletionsClient::from_config(&config.llm)?;

    let generator =
        Generator { config: &config, store: &store, embedder: embedder.as_ref(), llm: &llm };
    let report = generator.generate(&args.prompt, !args.no_run)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
