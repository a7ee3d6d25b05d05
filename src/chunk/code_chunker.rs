//! Code-aware chunking.
//!
//! Top-level definitions found by tree-sitter become section boundaries;
//! neighboring sections are packed together while they fit the line and
//! character budget, and a section that is too big on its own is cut into
//! overlapping line windows.

use crate::chunk::line_chunker::{line_windows, window_document, LineWindow};
use crate::domain::{ChunkingConfig, Document, DocumentKind, FileInfo};
use tree_sitter::{Language, Node, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLanguage {
    Python,
    Java,
}

impl CodeLanguage {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".py" => Some(CodeLanguage::Python),
            ".java" => Some(CodeLanguage::Java),
            _ => None,
        }
    }

    fn grammar(self) -> Language {
        match self {
            CodeLanguage::Python => tree_sitter_python::LANGUAGE.into(),
            CodeLanguage::Java => tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn definition_kinds(self) -> &'static [&'static str] {
        match self {
            CodeLanguage::Python => {
                &["function_definition", "class_definition", "decorated_definition"]
            }
            CodeLanguage::Java => &[
                "method_declaration",
                "constructor_declaration",
                "class_declaration",
                "interface_declaration",
                "enum_declaration",
                "record_declaration",
            ],
        }
    }

    /// Java wraps everything in a type body; look one level inside it.
    fn container_body(self, node: Node<'_>) -> Option<Node<'_>> {
        match (self, node.kind()) {
            (
                CodeLanguage::Java,
                "class_declaration" | "interface_declaration" | "enum_declaration"
                | "record_declaration",
            ) => node.child_by_field_name("body"),
            _ => None,
        }
    }

    fn line_starts_definition(self, trimmed: &str) -> bool {
        match self {
            CodeLanguage::Python => {
                trimmed.starts_with("def ")
                    || trimmed.starts_with("async def ")
                    || trimmed.starts_with("class ")
            }
            CodeLanguage::Java => {
                (trimmed.starts_with("public ")
                    || trimmed.starts_with("private ")
                    || trimmed.starts_with("protected "))
                    && (trimmed.contains('(') || trimmed.contains(" class "))
            }
        }
    }
}

pub struct CodeChunker {
    language: CodeLanguage,
}

impl CodeChunker {
    pub fn new(language: CodeLanguage) -> Self {
        Self { language }
    }

    pub fn chunk(
        &self,
        file_info: &FileInfo,
        content: &str,
        options: &ChunkingConfig,
    ) -> Vec<Document> {
        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        if lines.is_empty() {
            return Vec::new();
        }

        let boundaries = self
            .tree_sitter_boundaries(content, lines.len())
            .unwrap_or_else(|| self.textual_boundaries(&lines));

        pack_sections(&lines, &boundaries, options)
            .into_iter()
            .map(|window| window_document(file_info, DocumentKind::Code, window))
            .collect()
    }

    fn tree_sitter_boundaries(&self, content: &str, line_count: usize) -> Option<Vec<usize>> {
        let mut parser = Parser::new();
        parser.set_language(&self.language.grammar()).ok()?;
        let tree = parser.parse(content, None)?;

        let mut rows = vec![0usize];
        let kinds = self.language.definition_kinds();
        let mut cursor = tree.walk();
        for child in tree.root_node().named_children(&mut cursor) {
            if kinds.contains(&child.kind()) {
                rows.push(child.start_position().row);
            }
            if let Some(body) = self.language.container_body(child) {
                let mut body_cursor = body.walk();
                for member in body.named_children(&mut body_cursor) {
                    if kinds.contains(&member.kind()) {
                        rows.push(member.start_position().row);
                    }
                }
            }
        }
        rows.push(line_count);
        rows.sort_unstable();
        rows.dedup();
        Some(rows)
    }

    fn textual_boundaries(&self, lines: &[&str]) -> Vec<usize> {
        let mut rows = vec![0usize];
        for (idx, line) in lines.iter().enumerate().skip(1) {
            if self.language.line_starts_definition(line.trim_start()) {
                rows.push(idx);
            }
        }
        rows.push(lines.len());
        rows.dedup();
        rows
    }
}

/// Greedily merge `[boundaries[i], boundaries[i+1])` sections into windows.
fn pack_sections(lines: &[&str], boundaries: &[usize], options: &ChunkingConfig) -> Vec<LineWindow> {
    let max_lines = options.code_chunk_lines.max(1);
    let max_chars = options.code_max_chars.max(1);
    let section_chars =
        |start: usize, end: usize| lines[start..end].iter().map(|l| l.chars().count()).sum::<usize>();

    let mut windows = Vec::new();
    let mut pending: Option<(usize, usize)> = None;

    let flush = |range: Option<(usize, usize)>, windows: &mut Vec<LineWindow>| {
        if let Some((start, end)) = range {
            let text = lines[start..end].join("");
            if !text.trim().is_empty() {
                windows.push(LineWindow { start_line: start + 1, end_line: end, text });
            }
        }
    };

    for pair in boundaries.windows(2) {
        let (start, end) = (pair[0], pair[1].min(lines.len()));
        if end <= start {
            continue;
        }

        if end - start > max_lines || section_chars(start, end) > max_chars {
            flush(pending.take(), &mut windows);
            windows.extend(line_windows(
                &lines[start..end],
                start + 1,
                max_lines,
                options.code_overlap_lines,
                max_chars,
            ));
            continue;
        }

        pending = match pending {
            Some((p_start, _)) if end - p_start <= max_lines && section_chars(p_start, end) <= max_chars => {
                Some((p_start, end))
            }
            other => {
                flush(other, &mut windows);
                Some((start, end))
            }
        };
    }
    flush(pending, &mut windows);

    windows
}
