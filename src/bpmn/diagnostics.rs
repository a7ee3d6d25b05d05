//! Diagnostics raised while building and walking a process graph.
//!
//! Nothing in the BPMN core logs directly or returns an error: every
//! recoverable problem is handed to a caller-supplied [`DiagnosticSink`].

use std::fmt;
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A diagram file could not be read or parsed; it contributed nothing.
    ParseFailure { path: String, reason: String },
    /// A node points at an identifier that was never registered.
    DanglingReference { from: String, to: String },
    /// A sequence flow whose source node is unknown at the time it is read.
    UnknownFlowSource { path: String, source: String, target: String },
}

impl Diagnostic {
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::ParseFailure { .. } | Diagnostic::DanglingReference { .. } => Level::WARN,
            Diagnostic::UnknownFlowSource { .. } => Level::DEBUG,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ParseFailure { path, reason } => {
                write!(f, "Error parsing BPMN file {path}: {reason}")
            }
            Diagnostic::DanglingReference { from, to } => {
                write!(f, "Node {to} referenced by {from} not found in graph")
            }
            Diagnostic::UnknownFlowSource { path, source, target } => {
                write!(f, "Dropping sequence flow {source} -> {target} in {path}: unknown source")
            }
        }
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Forwards every diagnostic to `tracing` at its own level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        emit(&diagnostic);
    }
}

/// Buffers diagnostics for later inspection.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticReport {
    entries: Vec<Diagnostic>,
    echo: bool,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A report that also forwards each entry to `tracing` as it arrives.
    pub fn echoing() -> Self {
        Self { entries: Vec::new(), echo: true }
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn parse_failures(&self) -> usize {
        self.entries.iter().filter(|d| matches!(d, Diagnostic::ParseFailure { .. })).count()
    }

    pub fn dangling_references(&self) -> usize {
        self.entries.iter().filter(|d| matches!(d, Diagnostic::DanglingReference { .. })).count()
    }

    pub fn warnings(&self) -> usize {
        self.entries.iter().filter(|d| d.level() == Level::WARN).count()
    }
}

impl DiagnosticSink for DiagnosticReport {
    fn report(&mut self, diagnostic: Diagnostic) {
        if self.echo {
            emit(&diagnostic);
        }
        self.entries.push(diagnostic);
    }
}

fn emit(diagnostic: &Diagnostic) {
    if diagnostic.level() == Level::WARN {
        tracing::warn!("{}", diagnostic);
    } else {
        tracing::debug!("{}", diagnostic);
    }
}
