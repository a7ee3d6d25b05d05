//! Diagram parsing into the shared process graph.

use super::diagnostics::{Diagnostic, DiagnosticSink};
use super::graph::{Graph, GraphNode, NodeCategory};
use crate::utils::read_file_safe;
use roxmltree::{Document, ParsingOptions};
use std::path::Path;

const SEQUENCE_FLOW: &str = "sequenceFlow";

/// Accumulates nodes, edges and call targets from any number of diagrams.
///
/// Flows are resolved against everything registered so far, so a flow whose
/// source lives in a file that has not been added yet is dropped.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and add one diagram file. `origin` is recorded as each node's
    /// file path. Failures become a [`Diagnostic::ParseFailure`].
    pub fn add_file(&mut self, path: &Path, origin: &str, sink: &mut dyn DiagnosticSink) {
        match read_file_safe(path) {
            Ok((content, _encoding)) => self.add_document(origin, &content, sink),
            Err(err) => sink.report(Diagnostic::ParseFailure {
                path: origin.to_string(),
                reason: format!("{err:#}"),
            }),
        }
    }

    /// Add one diagram from memory.
    pub fn add_document(&mut self, origin: &str, xml: &str, sink: &mut dyn DiagnosticSink) {
        let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
        let doc = match Document::parse_with_options(xml, options) {
            Ok(doc) => doc,
            Err(err) => {
                sink.report(Diagnostic::ParseFailure {
                    path: origin.to_string(),
                    reason: err.to_string(),
                });
                return;
            }
        };

        // Nodes first so flows can reference elements declared after them.
        for element in doc.descendants().filter(|n| n.is_element()) {
            let Some(id) = element.attribute("id").filter(|id| !id.is_empty()) else {
                continue;
            };
            let Some(category) = NodeCategory::from_tag(element.tag_name().name()) else {
                continue;
            };

            let text = &xml[element.range()];
            self.graph.add_node(GraphNode::new(id, text, category, origin));

            if category == NodeCategory::SubProcess {
                if let Some(called) = element.attribute("calledElement").filter(|c| !c.is_empty())
                {
                    self.graph.add_call_mapping(id, called);
                }
            }
        }

        let root = doc.root_element();
        let namespace = root.tag_name().namespace();
        let flows = root.descendants().filter(|n| {
            n.is_element()
                && n.tag_name().name() == SEQUENCE_FLOW
                && n.tag_name().namespace() == namespace
                && *n != root
        });
        for flow in flows {
            let source = flow.attribute("sourceRef").filter(|s| !s.is_empty());
            let target = flow.attribute("targetRef").filter(|t| !t.is_empty());
            let (Some(source), Some(target)) = (source, target) else {
                continue;
            };
            if !self.graph.add_edge(source, target) {
                sink.report(Diagnostic::UnknownFlowSource {
                    path: origin.to_string(),
                    source: source.to_string(),
                    target: target.to_string(),
                });
            }
        }
    }

    pub fn finish(self) -> Graph {
        self.graph
    }
}
