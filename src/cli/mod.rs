//! Command-line interface for testgen-rag
//!
//! `ingest` fills the store, `generate` turns a prompt into Robot suites,
//! `chunk` and `retrieve` expose the intermediate steps.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod chunk;
mod generate;
mod ingest;
mod retrieve;
mod utils;

/// Ingest repositories and BPMN diagrams, then generate Robot Framework tests
#[derive(Parser)]
#[command(name = "testgen-rag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone or read a repository, chunk it and rebuild the vector store
    Ingest(ingest::IngestArgs),

    /// Chunk a workspace and print the documents as JSONL
    Chunk(chunk::ChunkArgs),

    /// Generate Robot Framework tests for a prompt and run them
    Generate(generate::GenerateArgs),

    /// Show the stored documents closest to a query
    Retrieve(retrieve::RetrieveArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG directives still apply; --verbose raises the floor to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Ingest(args) => ingest::run(args),
        Commands::Chunk(args) => chunk::run(args),
        Commands::Generate(args) => generate::run(args),
        Commands::Retrieve(args) => retrieve::run(args),
    }
}
