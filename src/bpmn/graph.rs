//! Process graph: an arena of nodes addressed by their diagram identifier.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Recognized flow-element categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCategory {
    Task,
    StartEvent,
    EndEvent,
    ExclusiveGateway,
    SubProcess,
}

impl NodeCategory {
    /// Classify an element by its local tag name, case-insensitively.
    ///
    /// Matching is by suffix so `userTask`, `serviceTask` and friends all
    /// land in [`NodeCategory::Task`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.to_ascii_lowercase();
        if tag.ends_with("subprocess") {
            Some(NodeCategory::SubProcess)
        } else if tag.ends_with("task") {
            Some(NodeCategory::Task)
        } else if tag.ends_with("startevent") {
            Some(NodeCategory::StartEvent)
        } else if tag.ends_with("endevent") {
            Some(NodeCategory::EndEvent)
        } else if tag.ends_with("exclusivegateway") {
            Some(NodeCategory::ExclusiveGateway)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeCategory::Task => "task",
            NodeCategory::StartEvent => "start-event",
            NodeCategory::EndEvent => "end-event",
            NodeCategory::ExclusiveGateway => "exclusive-gateway",
            NodeCategory::SubProcess => "sub-process",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    /// Source text of the element, exactly as it appears in the diagram.
    pub text: String,
    pub category: NodeCategory,
    pub file_path: String,
    /// Outgoing neighbor identifiers in flow order. May name unknown nodes.
    pub next: Vec<String>,
}

impl GraphNode {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: NodeCategory,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category,
            file_path: file_path.into(),
            next: Vec::new(),
        }
    }
}

/// Nodes in insertion order plus sub-process call targets.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    calls: HashMap<String, String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    /// Nodes in the order their identifier was first registered.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn called_process(&self, id: &str) -> Option<&str> {
        self.calls.get(id).map(String::as_str)
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.next.len()).sum()
    }

    /// Register a node. Re-registering an identifier replaces the node
    /// (outgoing edges included) but keeps its original position.
    pub fn add_node(&mut self, node: GraphNode) {
        match self.index.get(&node.id) {
            Some(&slot) => self.nodes[slot] = node,
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Add `from -> to`. Returns `false` (and adds nothing) if `from` is
    /// unknown. `to` is not checked.
    pub fn add_edge(&mut self, from: &str, to: impl Into<String>) -> bool {
        match self.index.get(from) {
            Some(&slot) => {
                self.nodes[slot].next.push(to.into());
                true
            }
            None => false,
        }
    }

    pub fn add_call_mapping(&mut self, id: impl Into<String>, called: impl Into<String>) {
        self.calls.insert(id.into(), called.into());
    }
}
