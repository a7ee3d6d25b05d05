//! Prompt assembly and model reply parsing.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub const INVALID_JSON_ERROR: &str = "model_returned_invalid_json";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a QA engineer writing Robot Framework tests.
Use only the application behaviour described in the provided context.
Answer with a single JSON object whose keys are test file names and whose
values are the complete contents of each .robot file.";

/// The system prompt from the rules file, or the built-in default.
pub fn load_system_prompt(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(rules) if !rules.trim().is_empty() => rules,
        Ok(_) => {
            tracing::warn!("Prompt rules file {} is empty; using default", path.display());
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
        Err(err) => {
            tracing::debug!("No prompt rules at {} ({err}); using default", path.display());
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}

pub fn build_user_prompt(context: &str, prompt: &str) -> String {
    format!(
        "Context:\n{context}\n\nUser Request:\n{prompt}\n\nReturn ONLY valid JSON. No text outside JSON. "
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedTests {
    /// File name to file content.
    Files(BTreeMap<String, String>),
    /// The reply was not a JSON object.
    InvalidJson { raw: String },
}

/// Parse a model reply into test files.
///
/// Non-string values are kept as their JSON text.
pub fn parse_generated_tests(raw: &str) -> GeneratedTests {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => GeneratedTests::Files(
            map.into_iter()
                .map(|(name, value)| match value {
                    Value::String(content) => (name, content),
                    other => (name, other.to_string()),
                })
                .collect(),
        ),
        _ => GeneratedTests::InvalidJson { raw: raw.to_string() },
    }
}
