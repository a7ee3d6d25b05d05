//! Chunk command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::utils::{effective_config, write_output};
use crate::bpmn::DiagnosticReport;
use crate::config::CliOverrides;
use crate::fetch::local::validate_local_path;
use crate::ingest::chunk_workspace;
use crate::render::render_jsonl;

#[derive(Args)]
pub struct ChunkArgs {
    /// Workspace directory to chunk
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Only emit BPMN semantic chunks
    #[arg(long)]
    pub bpmn_only: bool,

    /// Write JSONL here instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to config file (testgen.toml or testgen.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn run(args: ChunkArgs) -> Result<()> {
    let config = effective_config(args.config.as_deref(), &CliOverrides::default())?;
    let workspace = validate_local_path(&args.path)?;

    let mut report = DiagnosticReport::echoing();
    let chunks = chunk_workspace(&workspace.root_path, &config, &mut report)?;
    let documents =
        if args.bpmn_only { chunks.bpmn_documents } else { chunks.into_documents() };

    write_output(args.output.as_ref(), &render_jsonl(&documents))?;
    if !report.is_empty() {
        eprintln!(
            "{} diagnostics ({} unparsable diagrams, {} dangling references)",
            report.len(),
            report.parse_failures(),
            report.dangling_references()
        );
    }
    Ok(())
}
