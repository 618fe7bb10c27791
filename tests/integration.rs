/// Integration test suite — drives the compiled `code-flow` binary via subprocess.
///
/// The `CARGO_BIN_EXE_code-flow` environment variable is automatically set by
/// Cargo during `cargo test` to point to the compiled binary for the current
/// profile. Fixture files are written into tempdirs; the worker protocol is
/// exercised by piping request lines through the spawned process's stdin.
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde_json::Value;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_code-flow"))
}

/// Run a code-flow command and assert it exits successfully.
/// Returns stdout as a String.
fn run_success(args: &[&str]) -> String {
    let out = Command::new(binary())
        .args(args)
        .output()
        .expect("failed to invoke code-flow binary");
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        out.status.success(),
        "command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
        args,
        out.status,
        stdout,
        stderr
    );
    stdout
}

/// Run a code-flow command and assert it exits with a non-zero status.
fn run_failure(args: &[&str]) -> String {
    let out = Command::new(binary())
        .args(args)
        .output()
        .expect("failed to invoke code-flow binary");
    assert!(
        !out.status.success(),
        "command {:?} expected to fail but exited successfully",
        args
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}

/// Write a fixture file and return (tempdir guard, file path).
fn fixture(name: &str, source: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    std::fs::write(&path, source).expect("write fixture");
    (dir, path)
}

fn parse_fixture(source: &str, extra_args: &[&str]) -> Value {
    let (_dir, path) = fixture("input.ts", source);
    let mut args = vec!["parse", path.to_str().unwrap()];
    args.extend_from_slice(extra_args);
    let stdout = run_success(&args);
    serde_json::from_str(&stdout).expect("parse output should be valid JSON")
}

// ---------------------------------------------------------------------------
// parse command
// ---------------------------------------------------------------------------

#[test]
fn test_parse_emits_nodes_and_edges() {
    let graph = parse_fixture("const x = 1;\nconsole.log(x);", &[]);
    let nodes = graph["nodes"].as_array().unwrap();
    let edges = graph["edges"].as_array().unwrap();
    assert!(!nodes.is_empty());
    assert!(!edges.is_empty());

    // Every edge endpoint must exist among the returned nodes.
    let ids: Vec<&str> = nodes.iter().map(|n| n["id"].as_str().unwrap()).collect();
    for edge in edges {
        assert!(ids.contains(&edge["source"].as_str().unwrap()));
        assert!(ids.contains(&edge["target"].as_str().unwrap()));
    }
}

#[test]
fn test_parse_wire_format_is_camel_case() {
    let graph = parse_fixture("if (ready) { start(); }", &[]);
    let edge = &graph["edges"].as_array().unwrap()[0];
    assert!(edge.get("sourceHandle").is_some());
    assert!(edge.get("targetHandle").is_some());
    assert!(edge.get("animated").is_some());

    let if_node = graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["type"] == "ifNode")
        .expect("ifNode in output");
    assert!(
        if_node["data"]["scopes"]["flow-true"]["id"].is_string(),
        "branch scopes are part of the wire contract"
    );
}

#[test]
fn test_parse_malformed_file_yields_empty_graph() {
    let graph = parse_fixture("function broken( {", &[]);
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 0);
    assert_eq!(graph["edges"].as_array().unwrap().len(), 0);
}

#[test]
fn test_parse_with_layout_assigns_positions() {
    let graph = parse_fixture("const a = 1;\nconst b = a + 2;\nreport(b);", &["--layout"]);
    let positioned = graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| {
            n["position"]["x"].as_f64().unwrap_or(0.0) != 0.0
                || n["position"]["y"].as_f64().unwrap_or(0.0) != 0.0
        })
        .count();
    assert!(positioned > 0, "layout should move nodes off the origin");
}

#[test]
fn test_parse_multiple_files_keyed_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.ts");
    let b = dir.path().join("b.ts");
    std::fs::write(&a, "const x = 1;").unwrap();
    std::fs::write(&b, "const y = 2;").unwrap();

    let stdout = run_success(&["parse", a.to_str().unwrap(), b.to_str().unwrap()]);
    let value: Value = serde_json::from_str(&stdout).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map.len(), 2);
    assert!(map[a.to_str().unwrap()]["nodes"].is_array());
    assert!(map[b.to_str().unwrap()]["nodes"].is_array());
}

#[test]
fn test_parse_javascript_dialect() {
    let (_dir, path) = fixture("input.js", "const fn = 1;\nfunction go(a) { return a + fn; }");
    let stdout = run_success(&["parse", path.to_str().unwrap(), "--dialect", "js"]);
    let graph: Value = serde_json::from_str(&stdout).unwrap();
    assert!(!graph["nodes"].as_array().unwrap().is_empty());
}

#[test]
fn test_parse_missing_file_fails() {
    let stderr = run_failure(&["parse", "/nonexistent/missing.ts"]);
    assert!(stderr.contains("failed to read"), "stderr: {stderr}");
}

#[test]
fn test_unknown_dialect_fails() {
    let (_dir, path) = fixture("input.ts", "const x = 1;");
    let stderr = run_failure(&["parse", path.to_str().unwrap(), "--dialect", "cobol"]);
    assert!(stderr.contains("unsupported dialect"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// serve command (worker protocol)
// ---------------------------------------------------------------------------

/// Pipe request lines through `code-flow serve` and collect response lines.
fn serve_roundtrip(requests: &[&str]) -> Vec<Value> {
    let mut child = Command::new(binary())
        .arg("serve")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn code-flow serve");

    {
        let stdin = child.stdin.as_mut().unwrap();
        for request in requests {
            writeln!(stdin, "{request}").unwrap();
        }
    }
    let out = child.wait_with_output().expect("serve output");
    assert!(out.status.success());
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("response line should be JSON"))
        .collect()
}

#[test]
fn test_serve_echoes_request_ids() {
    let responses = serve_roundtrip(&[
        r#"{"sourceText": "const a = 1;", "requestId": 41}"#,
        r#"{"sourceText": "const b = 2;", "requestId": 42}"#,
    ]);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["requestId"], 41);
    assert_eq!(responses[1]["requestId"], 42);
    assert!(!responses[0]["nodes"].as_array().unwrap().is_empty());
}

#[test]
fn test_serve_degrades_syntax_errors_to_empty() {
    let responses = serve_roundtrip(&[r#"{"sourceText": "const x = ;", "requestId": 9}"#]);
    assert_eq!(responses[0]["requestId"], 9);
    assert_eq!(responses[0]["nodes"].as_array().unwrap().len(), 0);
    assert_eq!(responses[0]["edges"].as_array().unwrap().len(), 0);
}

#[test]
fn test_serve_skips_malformed_request_lines() {
    let responses = serve_roundtrip(&[
        "this is not json",
        r#"{"sourceText": "const ok = true;", "requestId": 1}"#,
    ]);
    assert_eq!(responses.len(), 1, "only the valid request is answered");
    assert_eq!(responses[0]["requestId"], 1);
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn test_config_extends_the_native_surface() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("input.ts");
    std::fs::write(&file, "const r = ipc.send('ping');").unwrap();
    std::fs::write(
        dir.path().join("code-flow.toml"),
        "native_globals = [\"ipc\"]\n",
    )
    .unwrap();

    let out = Command::new(binary())
        .current_dir(dir.path())
        .args(["parse", "input.ts"])
        .output()
        .expect("invoke code-flow");
    assert!(out.status.success());
    let graph: Value = serde_json::from_str(&String::from_utf8_lossy(&out.stdout)).unwrap();
    let native_edges = graph["edges"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["source"] == "native-api")
        .count();
    assert_eq!(native_edges, 1, "configured global should reference the sentinel");
}
