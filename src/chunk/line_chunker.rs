//! Line-window chunking for prose and as the fallback for oversized code.

use crate::domain::{Document, DocumentKind, FileInfo};
use crate::utils::{estimate_tokens, stable_hash};
use serde_json::{json, Map};

/// A contiguous run of lines, 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWindow {
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
}

/// Cut `lines` into windows of at most `max_lines` lines and `max_chars`
/// characters, consecutive windows sharing `overlap_lines` lines.
///
/// A window always takes at least one line, so a single line longer than
/// `max_chars` becomes a window of its own. Whitespace-only windows are
/// dropped. `first_line` is the 1-based number of `lines[0]`.
pub fn line_windows(
    lines: &[&str],
    first_line: usize,
    max_lines: usize,
    overlap_lines: usize,
    max_chars: usize,
) -> Vec<LineWindow> {
    let max_lines = max_lines.max(1);
    let mut windows = Vec::new();
    let mut start = 0usize;

    while start < lines.len() {
        let mut end = start;
        let mut chars = 0usize;
        while end < lines.len() && end - start < max_lines {
            let len = lines[end].chars().count();
            if end > start && chars + len > max_chars {
                break;
            }
            chars += len;
            end += 1;
        }

        let text = lines[start..end].join("");
        if !text.trim().is_empty() {
            windows.push(LineWindow {
                start_line: first_line + start,
                end_line: first_line + end - 1,
                text,
            });
        }

        if end >= lines.len() {
            break;
        }
        let next_start = end.saturating_sub(overlap_lines);
        start = if next_start <= start { end } else { next_start };
    }

    windows
}

pub struct LineChunker;

impl Default for LineChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl LineChunker {
    pub fn new() -> Self {
        Self
    }

    /// Token-budgeted windows for plain text files.
    pub fn chunk(
        &self,
        file_info: &FileInfo,
        content: &str,
        max_tokens: usize,
        overlap_tokens: usize,
    ) -> Vec<Document> {
        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        if lines.is_empty() {
            return Vec::new();
        }

        let total_tokens = estimate_tokens(content).max(1);
        let avg_tokens_per_line = (total_tokens / lines.len()).max(1);
        let target_lines = (max_tokens / avg_tokens_per_line).max(1);
        let overlap_lines = overlap_tokens / avg_tokens_per_line;
        let max_chars = max_tokens.saturating_mul(4).max(1);

        line_windows(&lines, 1, target_lines, overlap_lines, max_chars)
            .into_iter()
            .map(|window| window_document(file_info, DocumentKind::Text, window))
            .collect()
    }
}

/// Wrap a window as a document of `kind` sourced from `file_info`.
pub fn window_document(file_info: &FileInfo, kind: DocumentKind, window: LineWindow) -> Document {
    let locator = format!("{}-{}", window.start_line, window.end_line);
    let mut metadata = Map::new();
    metadata.insert("source".into(), json!(file_info.relative_path));
    if kind == DocumentKind::Code {
        metadata.insert("file_type".into(), json!(file_info.file_type()));
    }
    metadata.insert("start_line".into(), json!(window.start_line));
    metadata.insert("end_line".into(), json!(window.end_line));

    Document {
        id: stable_hash(&window.text, &file_info.relative_path, &locator),
        kind,
        source: file_info.relative_path.clone(),
        text: window.text,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn info(name: &str) -> FileInfo {
        FileInfo {
            path: PathBuf::from(format!("/tmp/{name}")),
            relative_path: name.to_string(),
            size_bytes: 0,
            extension: ".txt".to_string(),
        }
    }

    #[test]
    fn windows_overlap_by_requested_lines() {
        let content = "l\n".repeat(10);
        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        let windows = line_windows(&lines, 1, 4, 1, 10_000);

        let ranges: Vec<(usize, usize)> =
            windows.iter().map(|w| (w.start_line, w.end_line)).collect();
        assert_eq!(ranges, vec![(1, 4), (4, 7), (7, 10)]);
    }

    #[test]
    fn windows_close_before_char_budget() {
        let content = "abcdefghi\n".repeat(6);
        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        let windows = line_windows(&lines, 1, 100, 0, 25);

        assert!(windows.iter().all(|w| w.text.chars().count() <= 25));
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2].end_line, 6);
    }

    #[test]
    fn overlong_line_still_progresses() {
        let long = "x".repeat(50);
        let lines = vec![long.as_str(), "tail\n"];
        let windows = line_windows(&lines, 1, 10, 5, 10);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].text, long);
    }

    #[test]
    fn blank_windows_are_dropped() {
        let lines = vec!["\n", "  \n", "\n"];
        assert!(line_windows(&lines, 1, 1, 0, 100).is_empty());
    }

    #[test]
    fn text_chunks_carry_source_and_lines() {
        let content = "word ".repeat(40) + "\n";
        let content = content.repeat(30);
        let docs = LineChunker::new().chunk(&info("notes.txt"), &content, 200, 20);

        assert!(docs.len() > 1);
        assert!(docs.iter().all(|d| d.kind == DocumentKind::Text));
        assert_eq!(docs[0].metadata["source"], json!("notes.txt"));
        assert_eq!(docs[0].metadata["start_line"], json!(1));
        assert!(docs[0].metadata.get("file_type").is_none());
    }
}
