//! Workspace-level BPMN chunking across several diagram files

use std::fs;
use tempfile::TempDir;
use testgen_rag::bpmn::{
    discover_diagram_files, semantic_chunk_workspace, Diagnostic, DiagnosticReport, NodeCategory,
    TracingSink,
};

const NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";

fn diagram(body: &str) -> String {
    format!(r#"<definitions xmlns="{NS}"><process id="p">{body}</process></definitions>"#)
}

fn write(dir: &TempDir, name: &str, content: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn call_resolved_across_files() {
    let ws = TempDir::new().unwrap();
    // The caller is read first, so its flow targets A before A exists.
    write(
        &ws,
        "a/caller.bpmn",
        &diagram(r#"<task id="B"/><sequenceFlow id="f" sourceRef="B" targetRef="A"/>"#),
    );
    write(&ws, "b/main.bpmn", &diagram(r#"<subProcess id="A" calledElement="P2"/>"#));

    let mut report = DiagnosticReport::new();
    let chunks = semantic_chunk_workspace(ws.path(), &mut report);

    let joint = chunks
        .iter()
        .find(|c| c.node_ids().iter().any(|id| id == "B"))
        .expect("chunk containing B");
    assert_eq!(joint.node_ids(), ["B".to_string(), "A".to_string()]);
    assert_eq!(joint.called_processes(), ["P2".to_string()]);
    assert_eq!(joint.categories(), [NodeCategory::Task, NodeCategory::SubProcess]);
    assert_eq!(joint.sources().len(), 2);
    assert!(report.is_empty());
}

#[test]
fn every_node_lands_in_exactly_one_chunk() {
    let ws = TempDir::new().unwrap();
    write(
        &ws,
        "one.bpmn",
        &diagram(
            r#"<startEvent id="A"/><task id="B"/><task id="C"/><endEvent id="D"/>
               <sequenceFlow id="f1" sourceRef="A" targetRef="B"/>
               <sequenceFlow id="f2" sourceRef="B" targetRef="C"/>"#,
        ),
    );
    write(&ws, "two.bpmn", &diagram(r#"<exclusiveGateway id="G"/>"#));

    let chunks = semantic_chunk_workspace(ws.path(), &mut TracingSink);
    let mut seen: Vec<&str> =
        chunks.iter().flat_map(|c| c.node_ids().iter().map(String::as_str)).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec!["A", "B", "C", "D", "G"]);
    assert_eq!(chunks.len(), 3);
}

#[test]
fn dangling_and_malformed_inputs_are_contained() {
    let ws = TempDir::new().unwrap();
    write(&ws, "ok.bpmn", &diagram(r#"<task id="E"/><sequenceFlow id="f" sourceRef="E" targetRef="F"/>"#));
    write(&ws, "bad.bpmn", "<definitions><process>");
    write(&ws, "notes.txt", "not a diagram");

    assert_eq!(discover_diagram_files(ws.path()).len(), 2);

    let mut report = DiagnosticReport::new();
    let chunks = semantic_chunk_workspace(ws.path(), &mut report);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].node_ids(), ["E".to_string()]);
    assert_eq!(report.parse_failures(), 1);
    assert!(report
        .entries()
        .iter()
        .any(|d| matches!(d, Diagnostic::DanglingReference { from, to } if from == "E" && to == "F")));
}

#[test]
fn empty_workspace_yields_nothing() {
    let ws = TempDir::new().unwrap();
    let mut report = DiagnosticReport::new();
    assert!(semantic_chunk_workspace(ws.path(), &mut report).is_empty());
    assert!(report.is_empty());
}
