//! Core records shared across ingestion, storage and generation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// What produced a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Code,
    Text,
    Xml,
    Bpmn,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Code => "code",
            DocumentKind::Text => "text",
            DocumentKind::Xml => "xml",
            DocumentKind::Bpmn => "bpmn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "code" => Some(DocumentKind::Code),
            "text" => Some(DocumentKind::Text),
            "xml" => Some(DocumentKind::Xml),
            "bpmn" => Some(DocumentKind::Bpmn),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One embeddable text unit with attached metadata.
///
/// The store and the embedder treat every document the same way; BPMN,
/// XML and code semantics only live in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub kind: DocumentKind,
    pub source: String,
    pub text: String,
    pub metadata: Map<String, Value>,
}

/// A file discovered in a workspace.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub relative_path: String,
    pub size_bytes: u64,
    /// Lower-cased, with leading dot (`.py`). Empty for extensionless files.
    pub extension: String,
}

impl FileInfo {
    /// Extension without the leading dot, as stored in `file_type` metadata.
    pub fn file_type(&self) -> &str {
        self.extension.trim_start_matches('.')
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_included: usize,
    pub files_skipped_size: usize,
    pub files_skipped_extension: usize,
    pub files_skipped_binary: usize,
    pub files_skipped_glob: usize,
    pub total_bytes_included: u64,
    pub extensions_detected: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding cached clones, one sub-directory per repository URL.
    pub clone_base: PathBuf,
    pub store_path: PathBuf,
    pub tests_dir: PathBuf,
    pub prompt_rules: PathBuf,
    pub extract: ExtractConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub robot: RobotConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clone_base: PathBuf::from("/tmp/repos"),
            store_path: PathBuf::from(".testgen/store.sqlite"),
            tests_dir: PathBuf::from("tests"),
            prompt_rules: PathBuf::from("prompt_rules.txt"),
            extract: ExtractConfig::default(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
            robot: RobotConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    #[serde(deserialize_with = "extension_list")]
    pub include_extensions: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub skip_dirs: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub exclude_globs: Vec<String>,
    pub max_file_bytes: u64,
    pub respect_gitignore: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            include_extensions: default_include_extensions().iter().map(|s| s.to_string()).collect(),
            skip_dirs: default_skip_dirs().iter().map(|s| s.to_string()).collect(),
            exclude_globs: Vec::new(),
            max_file_bytes: 1_000_000,
            respect_gitignore: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub code_chunk_lines: usize,
    pub code_overlap_lines: usize,
    pub code_max_chars: usize,
    pub text_chunk_tokens: usize,
    pub text_overlap_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            code_chunk_lines: 80,
            code_overlap_lines: 20,
            code_max_chars: 3000,
            text_chunk_tokens: 1024,
            text_overlap_tokens: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimension: 384 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 6 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Never read from config files; only from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key: None,
            temperature: 0.0,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub command: Vec<String>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self { command: vec!["robot".to_string(), ".".to_string()] }
    }
}

pub fn default_include_extensions() -> &'static [&'static str] {
    &[".py", ".java", ".xml", ".bpmn"]
}

pub fn default_skip_dirs() -> &'static [&'static str] {
    &[
        ".git",
        "__pycache__",
        "node_modules",
        "venv",
        "env",
        ".venv",
        "dist",
        "build",
        ".pytest_cache",
        ".tox",
        "db_data",
        "venv_old",
        "tests",
    ]
}

/// Lower-case an extension and give it a leading dot (`PY` -> `.py`).
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_ascii_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

/// Accept either a list or a comma-separated string; trims and drops empties.
fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match StringOrList::deserialize(deserializer)? {
        StringOrList::One(joined) => joined.split(',').map(str::to_string).collect(),
        StringOrList::Many(items) => items,
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}

fn extension_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(string_list(deserializer)?.iter().map(|e| normalize_extension(e)).collect())
}
