//! JSONL rendering of documents

use crate::domain::Document;
use serde_json::Value;
use std::collections::BTreeMap;

/// One JSON object per line, keys in alphabetical order.
pub fn render_jsonl(documents: &[Document]) -> String {
    let mut lines = Vec::with_capacity(documents.len());
    for doc in documents {
        let mut entry: BTreeMap<&str, Value> = BTreeMap::new();
        entry.insert("id", Value::String(doc.id.clone()));
        entry.insert("kind", Value::String(doc.kind.as_str().to_string()));
        entry.insert("metadata", Value::Object(doc.metadata.clone()));
        entry.insert("source", Value::String(doc.source.clone()));
        entry.insert("text", Value::String(doc.text.clone()));

        match serde_json::to_string(&entry) {
            Ok(line) => lines.push(line),
            Err(err) => tracing::warn!("Skipping document {}: {err}", doc.id),
        }
    }
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}
