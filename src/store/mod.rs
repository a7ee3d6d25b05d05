//! SQLite-backed vector store.
//!
//! Every document is stored alongside its embedding. Search is a full scan
//! ranked by cosine similarity, which is plenty for a single repository.

pub mod schema;

use crate::domain::{Document, DocumentKind};
use crate::embed::cosine_similarity;
use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid stored metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported store schema version {found}; expected {expected}")]
    UnsupportedSchema { found: i64, expected: i64 },

    #[error("Embedding dimension mismatch: store has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Got {documents} documents but {embeddings} embeddings")]
    LengthMismatch { documents: usize, embeddings: usize },

    #[error("Unknown document kind '{0}' in store")]
    UnknownKind(String),
}

#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

pub struct DocumentStore {
    conn: Connection,
}

impl DocumentStore {
    /// Open (or create) the store at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Replace the whole collection in one transaction.
    pub fn replace_all(
        &mut self,
        documents: &[Document],
        embeddings: &[Vec<f32>],
        repo: &str,
    ) -> Result<usize, StoreError> {
        if documents.len() != embeddings.len() {
            return Err(StoreError::LengthMismatch {
                documents: documents.len(),
                embeddings: embeddings.len(),
            });
        }
        let dimension = embeddings.first().map(Vec::len);
        if let Some(expected) = dimension {
            if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
                return Err(StoreError::DimensionMismatch { expected, actual: bad.len() });
            }
        }

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM documents", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO documents(id, kind, source, text, metadata_json, embedding)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (doc, embedding) in documents.iter().zip(embeddings) {
                let metadata_json = serde_json::to_string(&doc.metadata)?;
                stmt.execute(params![
                    doc.id,
                    doc.kind.as_str(),
                    doc.source,
                    doc.text,
                    metadata_json,
                    encode_embedding(embedding),
                ])?;
            }
        }
        match dimension {
            Some(dim) => schema::write_meta(&tx, "embed_dim", &dim.to_string())?,
            None => {
                tx.execute("DELETE FROM metadata WHERE key = 'embed_dim'", [])?;
            }
        }
        schema::write_meta(&tx, "indexed_at", &chrono::Utc::now().to_rfc3339())?;
        schema::write_meta(&tx, "repo", repo)?;
        tx.commit()?;

        tracing::debug!("Stored {} documents", documents.len());
        Ok(documents.len())
    }

    /// Top `top_k` documents by cosine similarity, ties broken by id.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredDocument>, StoreError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        if let Some(expected) = self.embed_dim()? {
            if expected != query.len() {
                return Err(StoreError::DimensionMismatch { expected, actual: query.len() });
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, kind, source, text, metadata_json, embedding FROM documents",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Vec<u8>>(5)?,
            ))
        })?;

        let mut scored = Vec::new();
        for row in rows {
            let (id, kind, source, text, metadata_json, blob) = row?;
            let kind = DocumentKind::parse(&kind).ok_or(StoreError::UnknownKind(kind))?;
            let metadata = serde_json::from_str(&metadata_json)?;
            let score = cosine_similarity(query, &decode_embedding(&blob));
            scored.push(ScoredDocument { document: Document { id, kind, source, text, metadata }, score });
        }

        scored.sort_by(|a, b| {
            b.score.total_cmp(&a.score).then_with(|| a.document.id.cmp(&b.document.id))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn embed_dim(&self) -> Result<Option<usize>, StoreError> {
        Ok(schema::read_meta(&self.conn, "embed_dim")?.and_then(|v| v.parse().ok()))
    }

    pub fn metadata(&self, key: &str) -> Result<Option<String>, StoreError> {
        schema::read_meta(&self.conn, key)
    }
}

fn encode_embedding(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tempfile::TempDir;

    fn doc(id: &str, text: &str) -> Document {
        Document {
            id: id.to_string(),
            kind: DocumentKind::Code,
            source: format!("{id}.py"),
            text: text.to_string(),
            metadata: Map::new(),
        }
    }

    #[test]
    fn search_ranks_by_similarity_then_id() {
        let mut store = DocumentStore::open_in_memory().unwrap();
        let docs = vec![doc("b", "tie"), doc("a", "tie"), doc("c", "far")];
        let embeddings = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        store.replace_all(&docs, &embeddings, "repo").unwrap();

        let hits = store.search(&[1.0, 0.0], 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.document.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let top = store.search(&[0.0, 1.0], 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].document.id, "c");
    }

    #[test]
    fn replace_all_discards_previous_collection() {
        let mut store = DocumentStore::open_in_memory().unwrap();
        store.replace_all(&[doc("old", "x")], &[vec![1.0]], "first").unwrap();
        store.replace_all(&[doc("new", "y")], &[vec![1.0]], "second").unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.metadata("repo").unwrap().as_deref(), Some("second"));
        assert!(store.metadata("indexed_at").unwrap().is_some());
    }

    #[test]
    fn query_dimension_must_match() {
        let mut store = DocumentStore::open_in_memory().unwrap();
        store.replace_all(&[doc("a", "x")], &[vec![1.0, 0.0]], "repo").unwrap();
        let err = store.search(&[1.0, 0.0, 0.0], 2).unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let mut store = DocumentStore::open_in_memory().unwrap();
        let err = store.replace_all(&[doc("a", "x")], &[], "repo").unwrap_err();
        assert!(matches!(err, StoreError::LengthMismatch { .. }));
    }

    #[test]
    fn empty_store_returns_nothing() {
        let store = DocumentStore::open_in_memory().unwrap();
        assert!(store.search(&[1.0], 6).unwrap().is_empty());
    }

    #[test]
    fn persists_metadata_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("store.sqlite");
        {
            let mut store = DocumentStore::open(&path).unwrap();
            let mut d = doc("a", "x");
            d.kind = DocumentKind::Bpmn;
            d.metadata.insert("node_ids".into(), serde_json::json!(["A", "B"]));
            store.replace_all(&[d], &[vec![0.5, 0.5]], "repo").unwrap();
        }
        let store = DocumentStore::open(&path).unwrap();
        let hits = store.search(&[0.5, 0.5], 1).unwrap();
        assert_eq!(hits[0].document.kind, DocumentKind::Bpmn);
        assert_eq!(hits[0].document.metadata["node_ids"], serde_json::json!(["A", "B"]));
        assert_eq!(store.embed_dim().unwrap(), Some(2));
    }
}
