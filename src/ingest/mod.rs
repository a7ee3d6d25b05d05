//! Repository ingestion: fetch, extract, chunk, embed, persist.

use crate::bpmn::{build_graph, is_diagram_file, ChunkAssembler, DiagnosticReport, DiagnosticSink};
use crate::chunk::chunk_file;
use crate::domain::{Config, Document, ScanStats};
use crate::embed::Embedder;
use crate::fetch::{fetch_repository, RepoSource, ScratchDir};
use crate::scan::{extract_relevant_files, FileScanner};
use crate::store::DocumentStore;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub status: &'static str,
    pub repo: String,
    pub commit: Option<String>,
    /// Files copied into the workspace.
    pub files: usize,
    /// Documents written to the store, BPMN chunks included.
    pub chunks: usize,
    pub bpmn_chunks: usize,
    pub diagnostics: usize,
    /// Unparsable diagrams and dangling references among `diagnostics`.
    pub warnings: usize,
    pub scan: ScanStats,
}

/// Chunks produced from one workspace.
#[derive(Debug, Default)]
pub struct WorkspaceChunks {
    pub file_documents: Vec<Document>,
    pub bpmn_documents: Vec<Document>,
}

impl WorkspaceChunks {
    pub fn len(&self) -> usize {
        self.file_documents.len() + self.bpmn_documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// File documents first (sorted by path), then BPMN chunks in assembly order.
    pub fn into_documents(self) -> Vec<Document> {
        let mut docs = self.file_documents;
        docs.extend(self.bpmn_documents);
        docs
    }
}

/// Chunk every file under `workspace` that passes the extraction filters.
///
/// Non-diagram files are chunked in parallel; a file that cannot be read is
/// skipped with a warning. The accepted diagrams are built into one BPMN
/// graph, in path order, and assembled as a whole.
pub fn chunk_workspace(
    workspace: &Path,
    config: &Config,
    sink: &mut dyn DiagnosticSink,
) -> Result<WorkspaceChunks> {
    let extract = &config.extract;
    let mut scanner = FileScanner::new(workspace.to_path_buf())
        .include_extensions(extract.include_extensions.clone())
        .skip_dirs(extract.skip_dirs.clone())
        .exclude_globs(extract.exclude_globs.clone())
        .max_file_bytes(extract.max_file_bytes)
        .respect_gitignore(extract.respect_gitignore);
    let files = scanner.scan()?;

    let file_documents: Vec<Document> = files
        .par_iter()
        .filter(|file| !is_diagram_file(&file.path))
        .flat_map_iter(|file| match chunk_file(file, &config.chunking) {
            Ok(docs) => docs,
            Err(err) => {
                tracing::warn!("Skipping {}: {:#}", file.relative_path, err);
                Vec::new()
            }
        })
        .collect();

    let diagrams: Vec<PathBuf> =
        files.iter().filter(|f| is_diagram_file(&f.path)).map(|f| f.path.clone()).collect();
    tracing::info!("Found {} BPMN files in workspace", diagrams.len());

    let graph = build_graph(workspace, &diagrams, sink);
    let bpmn_documents: Vec<Document> = ChunkAssembler::new(&graph)
        .assemble(sink)
        .into_iter()
        .map(|chunk| chunk.into_document())
        .collect();
    tracing::info!("Generated {} semantic chunks from BPMN graph", bpmn_documents.len());

    Ok(WorkspaceChunks { file_documents, bpmn_documents })
}

/// Run the full ingestion pipeline and replace the store's contents.
pub fn ingest_repository(
    source: &RepoSource,
    config: &Config,
    embedder: &dyn Embedder,
    store: &mut DocumentStore,
) -> Result<IngestSummary> {
    let repo = fetch_repository(source, &config.clone_base)?;
    tracing::info!("Ingesting {} from {}", repo.origin, repo.root_path.display());

    let scratch = ScratchDir::create("testgen-workspace").context("Failed creating workspace")?;
    let scan = extract_relevant_files(&repo.root_path, scratch.path(), &config.extract)?;

    let mut report = DiagnosticReport::echoing();
    let chunks = chunk_workspace(scratch.path(), config, &mut report)?;
    let bpmn_chunks = chunks.bpmn_documents.len();
    let documents = chunks.into_documents();

    let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
    let embeddings = embedder.embed(&texts).context("Embedding failed")?;
    let stored = store.replace_all(&documents, &embeddings, &repo.origin)?;

    tracing::info!(
        "Stored {} documents ({} BPMN chunks, {} diagnostics)",
        stored,
        bpmn_chunks,
        report.len()
    );

    Ok(IngestSummary {
        status: "success",
        repo: repo.origin,
        commit: repo.commit,
        files: scan.files_included,
        chunks: stored,
        bpmn_chunks,
        diagnostics: report.len(),
        warnings: report.warnings(),
        scan,
    })
}
