//! Per-file chunking strategies
//!
//! BPMN diagrams are not chunked here: they need the whole workspace graph
//! and go through [`crate::bpmn`] instead.

use crate::bpmn::is_diagram_file;
use crate::domain::{ChunkingConfig, Document, FileInfo};
use crate::utils::read_file_safe;
use anyhow::Result;

use code_chunker::{CodeChunker, CodeLanguage};
use line_chunker::LineChunker;
use xml_chunker::XmlChunker;

pub mod code_chunker;
pub mod line_chunker;
pub mod xml_chunker;

pub fn chunk_file(file_info: &FileInfo, options: &ChunkingConfig) -> Result<Vec<Document>> {
    let (content, _encoding) = read_file_safe(&file_info.path)?;
    Ok(chunk_content(file_info, &content, options))
}

pub fn chunk_content(file_info: &FileInfo, content: &str, options: &ChunkingConfig) -> Vec<Document> {
    match chunker_for(file_info) {
        ChunkerKind::Code(language) => CodeChunker::new(language).chunk(file_info, content, options),
        ChunkerKind::Xml => XmlChunker::new().chunk(file_info, content),
        ChunkerKind::Text => LineChunker::new().chunk(
            file_info,
            content,
            options.text_chunk_tokens,
            options.text_overlap_tokens,
        ),
        ChunkerKind::Diagram => Vec::new(),
    }
}

enum ChunkerKind {
    Code(CodeLanguage),
    Xml,
    Text,
    Diagram,
}

fn chunker_for(file_info: &FileInfo) -> ChunkerKind {
    if is_diagram_file(&file_info.path) {
        return ChunkerKind::Diagram;
    }
    if let Some(language) = CodeLanguage::from_extension(&file_info.extension) {
        return ChunkerKind::Code(language);
    }
    match file_info.extension.as_str() {
        ".xml" => ChunkerKind::Xml,
        _ => ChunkerKind::Text,
    }
}
