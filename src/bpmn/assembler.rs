//! Breadth-first grouping of graph nodes into semantic chunks.

use super::diagnostics::{Diagnostic, DiagnosticSink};
use super::graph::{Graph, NodeCategory};
use crate::domain::{Document, DocumentKind};
use crate::utils::stable_hash;
use serde_json::{json, Map};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// One group of nodes reached from a single seed. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticChunk {
    text: String,
    sources: BTreeSet<String>,
    node_ids: Vec<String>,
    categories: Vec<NodeCategory>,
    called_processes: Vec<String>,
}

impl SemanticChunk {
    /// Member node texts joined by newlines, in visit order.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    pub fn categories(&self) -> &[NodeCategory] {
        &self.categories
    }

    /// Call targets of member sub-processes, whether or not they were ingested.
    pub fn called_processes(&self) -> &[String] {
        &self.called_processes
    }

    pub fn seed(&self) -> &str {
        &self.node_ids[0]
    }

    pub fn into_document(self) -> Document {
        let source = self.sources.iter().next().cloned().unwrap_or_default();
        let id = stable_hash(&self.text, &source, self.seed());
        let types: Vec<&str> = self.categories.iter().map(|c| c.as_str()).collect();

        let mut metadata = Map::new();
        metadata.insert("sources".into(), json!(self.sources));
        metadata.insert("node_ids".into(), json!(self.node_ids));
        metadata.insert("types".into(), json!(types));
        metadata.insert("called_processes".into(), json!(self.called_processes));

        Document { id, kind: DocumentKind::Bpmn, source, text: self.text, metadata }
    }
}

/// Walks a finished [`Graph`]; holds no traversal state between calls.
pub struct ChunkAssembler<'g> {
    graph: &'g Graph,
}

impl<'g> ChunkAssembler<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Seeds are taken in node insertion order; a seed already consumed by
    /// an earlier walk yields no chunk. Group boundaries therefore follow
    /// visitation order and edge direction, not undirected connectivity.
    pub fn assemble(&self, sink: &mut dyn DiagnosticSink) -> Vec<SemanticChunk> {
        let mut visited: HashSet<&str> = HashSet::with_capacity(self.graph.len());
        let mut chunks = Vec::new();

        for seed in self.graph.nodes() {
            if visited.contains(seed.id.as_str()) {
                continue;
            }
            if let Some(chunk) = self.walk_from(&seed.id, &mut visited, sink) {
                chunks.push(chunk);
            }
        }

        chunks
    }

    fn walk_from(
        &self,
        seed: &'g str,
        visited: &mut HashSet<&'g str>,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<SemanticChunk> {
        let mut texts: Vec<&str> = Vec::new();
        let mut sources = BTreeSet::new();
        let mut node_ids = Vec::new();
        let mut categories = Vec::new();
        let mut called_processes = Vec::new();

        let mut queue: VecDeque<&'g str> = VecDeque::from([seed]);
        while let Some(current) = queue.pop_front() {
            if visited.contains(current) {
                continue;
            }
            let Some(node) = self.graph.node(current) else {
                continue;
            };
            visited.insert(node.id.as_str());

            texts.push(&node.text);
            sources.insert(node.file_path.clone());
            node_ids.push(node.id.clone());
            categories.push(node.category);
            if let Some(called) = self.graph.called_process(&node.id) {
                called_processes.push(called.to_string());
            }

            for next in &node.next {
                if visited.contains(next.as_str()) {
                    continue;
                }
                if self.graph.contains(next) {
                    queue.push_back(next.as_str());
                } else {
                    sink.report(Diagnostic::DanglingReference {
                        from: node.id.clone(),
                        to: next.clone(),
                    });
                }
            }
        }

        if node_ids.is_empty() {
            return None;
        }

        Some(SemanticChunk {
            text: texts.join("\n"),
            sources,
            node_ids,
            categories,
            called_processes,
        })
    }
}
