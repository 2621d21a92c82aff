//! E2E CLI tests covering:
//! - Summaries (`aopnet hypergraph`, `aopnet communities`, `aopnet stats`)
//! - Path search (`aopnet path`, `aopnet paths`, `aopnet paths all-types`,
//!   `aopnet outcome-paths`)
//! - Config file overrides and stdin input
//! - Error codes for invalid parameters, unreadable input, and bad graphs
//!
//! Each test runs the `aopnet` binary as a subprocess against a graph written
//! to an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const GRAPH: &str = r#"{
    "nodes": [
        {"id": "MIE:1", "label": "Receptor binding", "type": "MolecularInitiatingEvent", "aop": "Aop:1"},
        {"id": "KE:1", "label": "Hepatocyte injury", "type": "KeyEvent", "aop": "Aop:1"},
        {"id": "KE:2", "label": "Inflammation", "type": "KeyEvent", "aop": "Aop:1"},
        {"id": "AO:1", "label": "Liver fibrosis", "type": "AdverseOutcome", "aop": "Aop:1"},
        {"id": "S:1", "label": "Carbon tetrachloride", "type": "Stressor", "aop": "Aop:1"}
    ],
    "edges": [
        {"source": "MIE:1", "target": "KE:1", "aop": "Aop:1", "confidence": "high"},
        {"source": "KE:1", "target": "AO:1", "aop": "Aop:1"},
        {"source": "MIE:1", "target": "KE:2", "aop": "Aop:1"},
        {"source": "KE:2", "target": "KE:1", "aop": "Aop:1"},
        {"source": "S:1", "target": "MIE:1", "type": "stressor"}
    ],
    "pathway_names": {"Aop:1": "Liver fibrosis"}
}"#;

/// Build a Command targeting the aopnet binary, isolated from user config.
fn aopnet_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("aopnet"));
    cmd.current_dir(dir);
    cmd.env("AOPNET_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join("config-home"));
    cmd.env_remove("AOPNET_FORMAT");
    cmd
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let graph = write_file(dir.path(), "graph.json", GRAPH);
    (dir, graph)
}

/// Run a command expected to succeed and parse its stdout as JSON.
fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = aopnet_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("aopnet should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

/// Run a command expected to fail and return the JSON error code.
fn error_code(dir: &Path, args: &[&str]) -> String {
    let output = aopnet_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("aopnet should not crash");
    assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
    let json: Value =
        serde_json::from_slice(&output.stderr).expect("stderr should be a JSON error");
    json["error"]["error_code"]
        .as_str()
        .expect("error_code field")
        .to_string()
}

fn path_ids(record: &Value) -> Vec<&str> {
    record["path"]
        .as_array()
        .expect("path array")
        .iter()
        .map(|id| id.as_str().expect("id string"))
        .collect()
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[test]
fn hypergraph_json_contains_hypernodes_and_stats() {
    let (dir, graph) = setup();
    let json = run_json(dir.path(), &["hypergraph", "-i", graph.to_str().expect("utf8")]);

    assert_eq!(json["stats"]["original_nodes"], 5);
    assert_eq!(json["stats"]["original_edges"], 5);
    assert_eq!(json["stats"]["stressor_hypernodes"], 1);

    let nodes = json["nodes"].as_array().expect("nodes array");
    assert!(nodes.iter().any(|n| n["type"] == "type-hypernode"));
    let stressor_group = nodes
        .iter()
        .find(|n| n["type"] == "stressor-hypernode")
        .expect("stressor hypernode");
    assert_eq!(stressor_group["label"], "Stressors (AOP 1: Liver fibrosis)");
    assert_eq!(
        json["stats"]["total_nodes"].as_u64(),
        Some(nodes.len() as u64)
    );
}

#[test]
fn hypergraph_stats_only_text() {
    let (dir, graph) = setup();
    aopnet_cmd(dir.path())
        .args(["hypergraph", "--stats-only", "--format", "text", "-i"])
        .arg(&graph)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("nodes="))
        .stdout(predicate::str::contains("stressor_hypernodes=1"));
}

#[test]
fn hypergraph_excluding_stressors() {
    let (dir, graph) = setup();
    let json = run_json(
        dir.path(),
        &["hypergraph", "--exclude-stressors", "-i", graph.to_str().expect("utf8")],
    );
    assert_eq!(json["stats"]["stressor_hypernodes"], 0);
    let nodes = json["nodes"].as_array().expect("nodes array");
    assert!(!nodes.iter().any(|n| n["type"] == "stressor-hypernode"));
}

#[test]
fn communities_cover_every_node() {
    let (dir, graph) = setup();
    let json = run_json(dir.path(), &["communities", "-i", graph.to_str().expect("utf8")]);
    assert_eq!(json["method"], "louvain");
    let assignment = json["node_to_community"].as_object().expect("assignment map");
    assert_eq!(assignment.len(), 5);
    let colors = json["node_colors"].as_object().expect("colour map");
    assert_eq!(colors.len(), 5);
    assert_eq!(colors["MIE:1"], "#ff6b6b");
}

#[test]
fn communities_unknown_strategy_falls_back() {
    let (dir, graph) = setup();
    let json = run_json(
        dir.path(),
        &["communities", "--strategy", "infomap", "-i", graph.to_str().expect("utf8")],
    );
    assert_eq!(json["method"], "louvain");
    assert_eq!(json["requested"], "infomap");
}

#[test]
fn stats_text_reports_counts() {
    let (dir, graph) = setup();
    aopnet_cmd(dir.path())
        .args(["stats", "--format", "text", "-i"])
        .arg(&graph)
        .assert()
        .success()
        .stdout(predicate::str::contains("nodes\t5"))
        .stdout(predicate::str::contains("edges\t5"))
        .stdout(predicate::str::contains("type:IntermediateEvent\t2"));
}

#[test]
fn stats_json_has_content_hash() {
    let (dir, graph) = setup();
    let json = run_json(dir.path(), &["stats", "-i", graph.to_str().expect("utf8")]);
    assert!(
        json["content_hash"]
            .as_str()
            .expect("hash string")
            .starts_with("blake3:")
    );
    assert_eq!(json["connected_components"], 1);
    assert!(json["avg_betweenness_centrality"].is_number());
}

#[test]
fn stdin_is_the_default_input() {
    let dir = TempDir::new().expect("tempdir");
    let output = aopnet_cmd(dir.path())
        .args(["stats", "--json"])
        .write_stdin(GRAPH)
        .output()
        .expect("aopnet should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["nodes"], 5);
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

#[test]
fn path_finds_fewest_hops() {
    let (dir, graph) = setup();
    let json = run_json(
        dir.path(),
        &["path", "MIE:1", "AO:1", "-i", graph.to_str().expect("utf8")],
    );
    assert_eq!(json["found"], true);
    assert_eq!(path_ids(&json["path"]), vec!["MIE:1", "KE:1", "AO:1"]);
    assert_eq!(json["path"]["length"], 2);
}

#[test]
fn path_reports_unreachable_in_text() {
    let (dir, graph) = setup();
    aopnet_cmd(dir.path())
        .args(["path", "AO:1", "MIE:1", "--format", "text", "-i"])
        .arg(&graph)
        .assert()
        .success()
        .stdout(predicate::str::diff("unreachable\n"));
}

#[test]
fn paths_lists_k_shortest_in_order() {
    let (dir, graph) = setup();
    let json = run_json(
        dir.path(),
        &["paths", "MIE:1", "AO:1", "-k", "5", "-i", graph.to_str().expect("utf8")],
    );
    let paths = json["paths"].as_array().expect("paths array");
    assert_eq!(paths.len(), 2);
    assert_eq!(path_ids(&paths[0]), vec!["MIE:1", "KE:1", "AO:1"]);
    assert_eq!(path_ids(&paths[1]), vec!["MIE:1", "KE:2", "KE:1", "AO:1"]);
    assert_eq!(json["frontier_truncated"], false);
    assert!(json.get("hypergraph").is_none());
}

#[test]
fn paths_with_hypergraph_summary() {
    let (dir, graph) = setup();
    let json = run_json(
        dir.path(),
        &[
            "paths",
            "MIE:1",
            "AO:1",
            "--hypergraph",
            "-i",
            graph.to_str().expect("utf8"),
        ],
    );
    assert_eq!(json["hypergraph"]["stats"]["original_nodes"], 4);
}

#[test]
fn paths_all_types_samples_type_pairs() {
    let (dir, graph) = setup();
    let json = run_json(
        dir.path(),
        &["paths", "all-types", "--max-paths", "3", "-i", graph.to_str().expect("utf8")],
    );
    assert_eq!(json["count"], 3);
    assert_eq!(json["max_paths_reached"], true);
    let types: Vec<&str> = json["node_types"]
        .as_array()
        .expect("node_types array")
        .iter()
        .map(|g| g["node_type"].as_str().expect("type string"))
        .collect();
    assert_eq!(types, vec!["InitiatingEvent", "IntermediateEvent", "Outcome", "Stressor"]);

    let paths = json["paths"].as_array().expect("paths array");
    assert_eq!(paths[0]["source_type"], "InitiatingEvent");
    assert_eq!(paths[0]["target_type"], "IntermediateEvent");
    assert_eq!(path_ids(&paths[0]), vec!["MIE:1", "KE:1"]);
    assert_eq!(paths[0]["length"], 1);
    assert_eq!(path_ids(&paths[1]), vec!["MIE:1", "KE:2", "KE:1"]);
}

#[test]
fn paths_all_types_text_is_tab_separated() {
    let (dir, graph) = setup();
    aopnet_cmd(dir.path())
        .args(["paths", "all-types", "--per-type", "1", "-k", "1", "--format", "text"])
        .args(["-i", graph.to_str().expect("utf8")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "InitiatingEvent\tIntermediateEvent\t1\tMIE:1 KE:1\n",
        ));
}

#[test]
fn paths_all_types_rejects_zero_per_type() {
    let (dir, graph) = setup();
    let code = error_code(
        dir.path(),
        &["paths", "all-types", "--per-type", "0", "-i", graph.to_str().expect("utf8")],
    );
    assert_eq!(code, "E1001");
}

#[test]
fn outcome_paths_shortest_and_longest() {
    let (dir, graph) = setup();
    let input = graph.to_str().expect("utf8");

    let shortest = run_json(dir.path(), &["outcome-paths", "-k", "1", "-i", input]);
    assert_eq!(shortest["mode"], "shortest");
    assert_eq!(shortest["initiating_ids"], serde_json::json!(["MIE:1"]));
    assert_eq!(shortest["outcome_ids"], serde_json::json!(["AO:1"]));
    let paths = shortest["paths"].as_array().expect("paths array");
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0]["length"], 2);

    let longest = run_json(
        dir.path(),
        &["outcome-paths", "-k", "1", "--mode", "longest", "-i", input],
    );
    assert_eq!(longest["mode"], "longest");
    assert_eq!(longest["paths"][0]["length"], 3);
}

#[test]
fn outcome_paths_without_outcomes_reports_message() {
    let dir = TempDir::new().expect("tempdir");
    let graph = write_file(
        dir.path(),
        "graph.json",
        r#"{"nodes": [{"id": "MIE:1", "type": "MolecularInitiatingEvent"}], "edges": []}"#,
    );
    let json = run_json(
        dir.path(),
        &["outcome-paths", "-i", graph.to_str().expect("utf8")],
    );
    assert_eq!(json["message"], "No outcomes found");
    assert_eq!(json["paths"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn config_file_sets_default_k() {
    let (dir, graph) = setup();
    let config = write_file(dir.path(), "config.toml", "[paths]\nk = 1\n");
    let json = run_json(
        dir.path(),
        &[
            "paths",
            "MIE:1",
            "AO:1",
            "--config",
            config.to_str().expect("utf8"),
            "-i",
            graph.to_str().expect("utf8"),
        ],
    );
    assert_eq!(json["paths"].as_array().expect("paths array").len(), 1);
}

#[test]
fn flags_override_config_file() {
    let (dir, graph) = setup();
    let config = write_file(dir.path(), "config.toml", "[paths]\nk = 1\n");
    let json = run_json(
        dir.path(),
        &[
            "paths",
            "MIE:1",
            "AO:1",
            "-k",
            "2",
            "--config",
            config.to_str().expect("utf8"),
            "-i",
            graph.to_str().expect("utf8"),
        ],
    );
    assert_eq!(json["paths"].as_array().expect("paths array").len(), 2);
}

#[test]
fn user_config_dir_is_read() {
    let (dir, graph) = setup();
    let config_dir = dir.path().join("config-home").join("aopnet");
    std::fs::create_dir_all(&config_dir).expect("config dir");
    write_file(&config_dir, "config.toml", "[community]\nstrategy = \"spectral\"\n");
    let json = run_json(dir.path(), &["communities", "-i", graph.to_str().expect("utf8")]);
    assert_eq!(json["requested"], "spectral");
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn zero_k_is_invalid_parameter() {
    let (dir, graph) = setup();
    let code = error_code(
        dir.path(),
        &["paths", "MIE:1", "AO:1", "-k", "0", "-i", graph.to_str().expect("utf8")],
    );
    assert_eq!(code, "E1001");
}

#[test]
fn zero_max_frontier_is_invalid_parameter() {
    let (dir, graph) = setup();
    let code = error_code(
        dir.path(),
        &["outcome-paths", "--max-frontier", "0", "-i", graph.to_str().expect("utf8")],
    );
    assert_eq!(code, "E1001");
}

#[test]
fn missing_input_is_unreadable() {
    let dir = TempDir::new().expect("tempdir");
    let code = error_code(dir.path(), &["stats", "-i", "does-not-exist.json"]);
    assert_eq!(code, "E2001");
}

#[test]
fn malformed_json_is_unreadable() {
    let dir = TempDir::new().expect("tempdir");
    let graph = write_file(dir.path(), "graph.json", "{ not json");
    let code = error_code(dir.path(), &["stats", "-i", graph.to_str().expect("utf8")]);
    assert_eq!(code, "E2001");
}

#[test]
fn duplicate_node_ids_are_invalid_graph() {
    let dir = TempDir::new().expect("tempdir");
    let graph = write_file(
        dir.path(),
        "graph.json",
        r#"{"nodes": [{"id": "KE:1"}, {"id": "KE:1"}], "edges": []}"#,
    );
    let code = error_code(dir.path(), &["hypergraph", "-i", graph.to_str().expect("utf8")]);
    assert_eq!(code, "E1002");
}

#[test]
fn broken_config_is_parse_error() {
    let (dir, graph) = setup();
    let config = write_file(dir.path(), "config.toml", "[paths\nk = ");
    let code = error_code(
        dir.path(),
        &[
            "stats",
            "--config",
            config.to_str().expect("utf8"),
            "-i",
            graph.to_str().expect("utf8"),
        ],
    );
    assert_eq!(code, "E2002");
}

#[test]
fn text_errors_carry_code_and_hint() {
    let dir = TempDir::new().expect("tempdir");
    aopnet_cmd(dir.path())
        .args(["stats", "--format", "text", "-i", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error[E2001]: "))
        .stderr(predicate::str::contains("hint:"));
}

// ---------------------------------------------------------------------------
// Completions
// ---------------------------------------------------------------------------

#[test]
fn completions_do_not_read_input() {
    let dir = TempDir::new().expect("tempdir");
    aopnet_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aopnet"))
        .stdout(predicate::str::contains("outcome-paths"));
}
