//! BPMN semantic chunking.
//!
//! Diagrams from a whole workspace are parsed into one [`Graph`] (nodes keyed
//! by element id, edges from sequence flows, call targets from sub-processes),
//! then [`ChunkAssembler`] groups nodes into [`SemanticChunk`]s by walking
//! outgoing edges breadth-first from each unvisited node.
//!
//! The graph must be complete before assembly: an edge may only be resolved
//! once every diagram that could declare its target has been read.

use crate::utils::paths::relative_to;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod assembler;
pub mod builder;
pub mod diagnostics;
pub mod graph;

pub use assembler::{ChunkAssembler, SemanticChunk};
pub use builder::GraphBuilder;
pub use diagnostics::{Diagnostic, DiagnosticReport, DiagnosticSink, TracingSink};
pub use graph::{Graph, GraphNode, NodeCategory};

pub const DIAGRAM_EXTENSION: &str = "bpmn";

pub fn is_diagram_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DIAGRAM_EXTENSION))
}

/// All `*.bpmn` files under `workspace`, sorted by path.
pub fn discover_diagram_files(workspace: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(workspace)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_diagram_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Build one graph from the given diagram files. Origins are recorded
/// relative to `workspace` when possible.
pub fn build_graph(workspace: &Path, files: &[PathBuf], sink: &mut dyn DiagnosticSink) -> Graph {
    let mut builder = GraphBuilder::new();
    for path in files {
        let origin =
            relative_to(workspace, path).unwrap_or_else(|| path.to_string_lossy().into_owned());
        builder.add_file(path, &origin, sink);
    }
    let graph = builder.finish();
    tracing::debug!(
        "BPMN graph: {} nodes, {} edges, {} call mappings",
        graph.len(),
        graph.edge_count(),
        graph.call_count()
    );
    graph
}

/// Parse every diagram under `workspace` and return its semantic chunks.
pub fn semantic_chunk_workspace(
    workspace: &Path,
    sink: &mut dyn DiagnosticSink,
) -> Vec<SemanticChunk> {
    let files = discover_diagram_files(workspace);
    tracing::info!("Found {} BPMN files in workspace", files.len());

    let graph = build_graph(workspace, &files, sink);
    let chunks = ChunkAssembler::new(&graph).assemble(sink);
    tracing::info!("Generated {} semantic chunks from BPMN graph", chunks.len());
    chunks
}
