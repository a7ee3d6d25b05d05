//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const FLOW: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="checkout">
    <bpmn:startEvent id="start"/>
    <bpmn:task id="pay" name="Take payment"/>
    <bpmn:endEvent id="done"/>
    <bpmn:sequenceFlow id="f1" sourceRef="start" targetRef="pay"/>
    <bpmn:sequenceFlow id="f2" sourceRef="pay" targetRef="done"/>
  </bpmn:process>
</bpmn:definitions>"#;

fn testgen() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("testgen-rag"));
    cmd.env_remove("GROQ_API_KEY").env_remove("GROQ_MODEL").env_remove("CLONE_BASE");
    cmd
}

fn sample_workspace() -> TempDir {
    let tmp = TempDir::new().expect("tmp");
    fs::create_dir_all(tmp.path().join("flows")).unwrap();
    fs::write(tmp.path().join("flows/checkout.bpmn"), FLOW).unwrap();
    fs::write(tmp.path().join("payment.py"), "def take_payment(order):\n    return True\n").unwrap();
    tmp
}

#[test]
fn test_cli_version() {
    testgen().arg("--version").assert().success().stdout(predicate::str::contains("testgen-rag"));
}

#[test]
fn test_cli_help() {
    testgen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Robot Framework"))
        .stdout(predicate::str::contains("ingest"))
        .stdout(predicate::str::contains("chunk"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("retrieve"));
}

#[test]
fn test_ingest_requires_path_or_repo() {
    testgen().arg("ingest").assert().failure().stderr(predicate::str::contains("--path"));
}

#[test]
fn test_ingest_rejects_both_path_and_repo() {
    testgen()
        .args(["ingest", "--path", ".", "--repo", "https://github.com/acme/shop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_chunk_bpmn_only_emits_one_chunk_per_flow() {
    let ws = sample_workspace();
    let output = testgen()
        .current_dir(ws.path())
        .args(["chunk", "--bpmn-only", "."])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    let doc: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(doc["kind"], "bpmn");
    assert_eq!(doc["metadata"]["node_ids"], serde_json::json!(["start", "pay", "done"]));
    assert_eq!(doc["metadata"]["sources"], serde_json::json!(["flows/checkout.bpmn"]));
}

#[test]
fn test_chunk_writes_all_documents_to_file() {
    let ws = sample_workspace();
    let out = ws.path().join("out/chunks.jsonl");
    testgen()
        .current_dir(ws.path())
        .args(["chunk", ".", "-o"])
        .arg(&out)
        .assert()
        .success();

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.lines().any(|l| l.contains("\"kind\":\"code\"")));
    assert!(content.lines().any(|l| l.contains("\"kind\":\"bpmn\"")));
}

#[test]
fn test_chunk_reports_broken_diagrams() {
    let ws = sample_workspace();
    fs::write(ws.path().join("flows/broken.bpmn"), "<definitions><task id=").unwrap();
    testgen()
        .current_dir(ws.path())
        .args(["chunk", "--bpmn-only", "."])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 unparsable diagrams"));
}

#[test]
fn test_ingest_then_retrieve() {
    let ws = sample_workspace();
    let store = ws.path().join(".testgen/store.sqlite");

    testgen()
        .current_dir(ws.path())
        .args(["ingest", "--path", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"success\""))
        .stdout(predicate::str::contains("\"bpmn_chunks\": 1"));
    assert!(store.is_file());

    testgen()
        .current_dir(ws.path())
        .args(["retrieve", "take payment", "-k", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" 1. "));
}

#[test]
fn test_retrieve_without_store_fails() {
    let ws = TempDir::new().unwrap();
    testgen()
        .current_dir(ws.path())
        .args(["retrieve", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `testgen-rag ingest` first"));
}

#[test]
fn test_generate_requires_api_key() {
    let ws = sample_workspace();
    testgen().current_dir(ws.path()).args(["ingest", "--path", "."]).assert().success();

    testgen()
        .current_dir(ws.path())
        .args(["generate", "test checkout", "--no-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROQ_API_KEY"));
}

#[test]
fn test_explicit_bad_config_is_fatal() {
    let ws = sample_workspace();
    fs::write(ws.path().join("custom.toml"), "[retrieval]\ntop_k = 'lots'\n").unwrap();
    testgen()
        .current_dir(ws.path())
        .args(["chunk", ".", "-c", "custom.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid TOML config"));
}
