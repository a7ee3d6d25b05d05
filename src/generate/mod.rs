//! Test generation: retrieve context, ask the model, save and run suites.

pub mod error;
pub mod llm;
pub mod prompt;
pub mod robot;

pub use error::GenerateError;
pub use llm::{ChatCompletionsClient, LlmClient};
pub use prompt::{
    build_user_prompt, load_system_prompt, parse_generated_tests, GeneratedTests,
    DEFAULT_SYSTEM_PROMPT, INVALID_JSON_ERROR,
};
pub use robot::{run_robot, save_tests, RobotRun};

use crate::domain::Config;
use crate::embed::Embedder;
use crate::store::DocumentStore;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

const CONTEXT_PREVIEW_CHARS: usize = 1000;
const ROBOT_OUTPUT_CHARS: usize = 20_000;
const ROBOT_ERRORS_CHARS: usize = 5000;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub saved_files: Vec<PathBuf>,
    pub retrieved_context_preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    pub robot_output: String,
    pub robot_errors: String,
    pub exit_code: Option<i32>,
}

/// Texts of the `top_k` documents closest to `prompt`, separated by a blank line.
pub fn retrieve_context(
    prompt: &str,
    store: &DocumentStore,
    embedder: &dyn Embedder,
    top_k: usize,
) -> Result<String> {
    if let Some(stored) = store.embed_dim()? {
        if stored != embedder.dimension() {
            anyhow::bail!(
                "Store holds {stored}-dimensional embeddings but the {} embedder produces {}; re-run ingest",
                embedder.name(),
                embedder.dimension()
            );
        }
    }

    let query = embedder.embed_one(prompt)?;
    let hits = store.search(&query, top_k)?;
    tracing::debug!("Retrieved {} documents for prompt", hits.len());
    Ok(hits.iter().map(|hit| hit.document.text.as_str()).collect::<Vec<_>>().join("\n\n"))
}

/// Everything a generation run needs besides the prompt.
pub struct Generator<'a> {
    pub config: &'a Config,
    pub store: &'a DocumentStore,
    pub embedder: &'a dyn Embedder,
    pub llm: &'a dyn LlmClient,
}

impl Generator<'_> {
    /// Generate suites for `prompt`, save them and (if `run_tests`) run Robot.
    ///
    /// A reply that is not a JSON object is reported, not raised.
    pub fn generate(&self, prompt: &str, run_tests: bool) -> Result<GenerationReport> {
        let context = retrieve_context(prompt, self.store, self.embedder, self.config.retrieval.top_k)?;
        let system_prompt = load_system_prompt(&self.config.prompt_rules);
        let user_prompt = build_user_prompt(&context, prompt);

        let raw = self
            .llm
            .complete(&system_prompt, &user_prompt)
            .with_context(|| format!("Test generation with {} failed", self.llm.model()))?;

        let mut report = GenerationReport {
            retrieved_context_preview: truncate_chars(&context, CONTEXT_PREVIEW_CHARS),
            ..GenerationReport::default()
        };

        match parse_generated_tests(&raw) {
            GeneratedTests::Files(files) => {
                report.saved_files = save_tests(&self.config.tests_dir, &files)?;
                tracing::info!("Saved {} test files", report.saved_files.len());
            }
            GeneratedTests::InvalidJson { raw } => {
                tracing::warn!("Model reply was not a JSON object");
                report.error = Some(INVALID_JSON_ERROR.to_string());
                report.raw_output = Some(raw);
                return Ok(report);
            }
        }

        if run_tests {
            let run = run_robot(&self.config.tests_dir, &self.config.robot.command)?;
            report.robot_output = truncate_chars(&run.stdout, ROBOT_OUTPUT_CHARS);
            report.robot_errors = truncate_chars(&run.stderr, ROBOT_ERRORS_CHARS);
            report.exit_code = run.exit_code;
        }
        Ok(report)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, DocumentKind};
    use crate::embed::HashEmbedder;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct ScriptedLlm {
        reply: String,
        seen: RefCell<Vec<(String, String)>>,
    }

    impl ScriptedLlm {
        fn new(reply: &str) -> Self {
            Self { reply: reply.to_string(), seen: RefCell::new(Vec::new()) }
        }
    }

    impl LlmClient for ScriptedLlm {
        fn model(&self) -> &str {
            "scripted"
        }

        fn complete(&self, system: &str, user: &str) -> Result<String, GenerateError> {
            self.seen.borrow_mut().push((system.to_string(), user.to_string()));
            Ok(self.reply.clone())
        }
    }

    fn seeded_store(embedder: &HashEmbedder) -> DocumentStore {
        let docs: Vec<Document> = ["login form validates password", "ship order to customer"]
            .iter()
            .enumerate()
            .map(|(i, text)| Document {
                id: format!("doc{i}"),
                kind: DocumentKind::Text,
                source: format!("doc{i}.txt"),
                text: text.to_string(),
                metadata: Default::default(),
            })
            .collect();
        let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        let embeddings = embedder.embed(&texts).unwrap();
        let mut store = DocumentStore::open_in_memory().unwrap();
        store.replace_all(&docs, &embeddings, "repo").unwrap();
        store
    }

    fn config_in(dir: &TempDir) -> Config {
        Config {
            tests_dir: dir.path().join("tests"),
            prompt_rules: dir.path().join("missing_rules.txt"),
            ..Config::default()
        }
    }

    #[test]
    fn retrieve_context_orders_by_similarity() {
        let embedder = HashEmbedder::new(128);
        let store = seeded_store(&embedder);
        let context = retrieve_context("ship the order", &store, &embedder, 1).unwrap();
        assert_eq!(context, "ship order to customer");

        let both = retrieve_context("ship the order", &store, &embedder, 6).unwrap();
        assert_eq!(both, "ship order to customer\n\nlogin form validates password");
    }

    #[test]
    fn empty_store_gives_empty_context() {
        let embedder = HashEmbedder::new(16);
        let store = DocumentStore::open_in_memory().unwrap();
        assert_eq!(retrieve_context("anything", &store, &embedder, 6).unwrap(), "");
    }

    #[test]
    fn embedder_must_match_store_dimension() {
        let store = seeded_store(&HashEmbedder::new(128));
        let err = retrieve_context("ship", &store, &HashEmbedder::new(64), 6).unwrap_err();
        assert!(err.to_string().contains("Store holds 128-dimensional embeddings"));
    }

    #[test]
    fn saves_files_from_json_reply() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let embedder = HashEmbedder::new(128);
        let store = seeded_store(&embedder);
        let llm = ScriptedLlm::new(r#"{"shipping": "*** Test Cases ***\nShip\n    No Operation\n"}"#);

        let generator = Generator { config: &config, store: &store, embedder: &embedder, llm: &llm };
        let report = generator.generate("ship the order", false).unwrap();

        assert_eq!(report.saved_files, vec![config.tests_dir.join("shipping.robot")]);
        assert!(report.error.is_none());
        assert_eq!(report.exit_code, None);

        let seen = llm.seen.borrow();
        assert_eq!(seen[0].0, DEFAULT_SYSTEM_PROMPT);
        assert!(seen[0].1.starts_with("Context:\nship order to customer"));
        assert!(seen[0].1.contains("User Request:\nship the order"));
    }

    #[test]
    fn invalid_json_is_reported_without_saving() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let embedder = HashEmbedder::new(128);
        let store = seeded_store(&embedder);
        let llm = ScriptedLlm::new("Here are some tests!");

        let generator = Generator { config: &config, store: &store, embedder: &embedder, llm: &llm };
        let report = generator.generate("login", true).unwrap();

        assert_eq!(report.error.as_deref(), Some(INVALID_JSON_ERROR));
        assert_eq!(report.raw_output.as_deref(), Some("Here are some tests!"));
        assert!(report.saved_files.is_empty());
        assert!(!config.tests_dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn runs_configured_robot_command() {
        let tmp = TempDir::new().unwrap();
        let mut config = config_in(&tmp);
        config.robot.command = vec!["ls".to_string()];
        let embedder = HashEmbedder::new(128);
        let store = seeded_store(&embedder);
        let llm = ScriptedLlm::new(r#"{"a.robot": "x"}"#);

        let generator = Generator { config: &config, store: &store, embedder: &embedder, llm: &llm };
        let report = generator.generate("login", true).unwrap();
        assert_eq!(report.exit_code, Some(0));
        assert!(report.robot_output.contains("a.robot"));
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
