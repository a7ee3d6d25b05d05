//! testgen-rag: turn a repository and its BPMN process diagrams into a
//! retrieval store, then generate Robot Framework tests from it.
//!
//! The BPMN chunker in [`bpmn`] links every flow node across all diagrams of a
//! workspace into one graph and cuts it into connected, semantically coherent
//! chunks. The remaining modules are the pipeline around it.

pub mod bpmn;
pub mod chunk;
pub mod cli;
pub mod config;
pub mod domain;
pub mod embed;
pub mod fetch;
pub mod generate;
pub mod ingest;
pub mod render;
pub mod scan;
pub mod store;
pub mod utils;
