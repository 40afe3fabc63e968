//! CLI end-to-end tests.
//!
//! These tests spawn the actual `tsgraph` binary and validate stdout, the
//! written store and exit codes.
//!
//! Exit code expectations:
//! - 0: Success
//! - 2: Invalid arguments
//! - 3: Diagnostics present (project or file could not be resolved)

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run tsgraph in `dir` and return (stdout, stderr, exit_code).
fn run_tsgraph(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_tsgraph"))
        .args(args)
        .current_dir(dir)
        .env_remove("TSGRAPH_STORE")
        .env_remove("TSGRAPH_CLEAR")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute tsgraph");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn read_store(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("store should exist");
    serde_json::from_str(&text).expect("store should be valid JSON")
}

/// Symbols of the stored graph as (elements joined by '/', kind).
fn stored_symbols(store: &Value) -> Vec<(String, String)> {
    store["graph"]["symbols"]
        .as_array()
        .expect("symbols array")
        .iter()
        .map(|s| {
            let elements: Vec<&str> = s["hierarchy"]["elements"]
                .as_array()
                .expect("elements")
                .iter()
                .filter_map(Value::as_str)
                .collect();
            (
                elements.join("/"),
                s["kind"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

// ============================================================================
// index-file
// ============================================================================

#[test]
fn index_file_writes_default_store() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("a.ts"),
        "declare const X: number;\nfunction f() { const X = 1; }\n",
    )
    .unwrap();

    let (stdout, _stderr, exit_code) = run_tsgraph(dir.path(), &["index-file", "a.ts"]);
    assert_eq!(exit_code, 0, "stdout: {}", stdout);

    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["files"], 1);

    let store = read_store(&dir.path().join("index.tsgraph.json"));
    let symbols = stored_symbols(&store);
    let globals: Vec<_> = symbols
        .iter()
        .filter(|(_, kind)| kind == "global_variable")
        .collect();
    assert_eq!(globals.len(), 1);
    assert_eq!(globals[0].0, "X");
}

#[test]
fn index_file_missing_exits_with_diagnostics() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, exit_code) =
        run_tsgraph(dir.path(), &["index-file", "missing.ts", "--store", "out.json"]);

    assert_eq!(exit_code, 3);
    assert!(stderr.contains("TS5058"), "stderr: {}", stderr);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
    assert!(!dir.path().join("out.json").exists());
}

// ============================================================================
// index-project
// ============================================================================

#[test]
fn index_project_with_clear() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("app");
    fs::create_dir_all(project.join("src")).unwrap();
    fs::create_dir_all(project.join("node_modules/lodash")).unwrap();
    fs::write(
        project.join("tsconfig.json"),
        "{\n  // sources only\n  \"include\": [\"src\"],\n}\n",
    )
    .unwrap();
    fs::write(project.join("src/main.ts"), "export class App {}\n").unwrap();
    fs::write(
        project.join("node_modules/lodash/index.d.ts"),
        "export declare function chunk(): void;\n",
    )
    .unwrap();

    let (stdout, _stderr, exit_code) = run_tsgraph(
        dir.path(),
        &["index-project", "app", "--store", "graph.json", "--clear"],
    );
    assert_eq!(exit_code, 0, "stdout: {}", stdout);
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["cleared"], true);
    assert_eq!(json["files"], 1);

    let symbols = stored_symbols(&read_store(&dir.path().join("graph.json")));
    assert!(symbols.contains(&("app/src/main.ts".to_string(), "module".to_string())));
    assert!(symbols.contains(&("App".to_string(), "class".to_string())));
    assert!(!symbols.iter().any(|(name, _)| name == "chunk"));
}

#[test]
fn index_project_reindex_without_clear_accumulates() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();
    fs::write(dir.path().join("a.ts"), "declare const A: number;\n").unwrap();

    let args = ["index-project", ".", "--store", "g.json"];
    assert_eq!(run_tsgraph(dir.path(), &args).2, 0);

    fs::write(dir.path().join("a.ts"), "declare const B: number;\n").unwrap();
    assert_eq!(run_tsgraph(dir.path(), &args).2, 0);

    let symbols = stored_symbols(&read_store(&dir.path().join("g.json")));
    assert!(symbols.contains(&("A".to_string(), "global_variable".to_string())));
    assert!(symbols.contains(&("B".to_string(), "global_variable".to_string())));

    let clear_args = ["index-project", ".", "--store", "g.json", "--clear"];
    assert_eq!(run_tsgraph(dir.path(), &clear_args).2, 0);
    let symbols = stored_symbols(&read_store(&dir.path().join("g.json")));
    assert!(!symbols.iter().any(|(name, _)| name == "A"));
}

#[test]
fn index_project_malformed_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tsconfig.json"), "{ \"include\": [ }").unwrap();

    let (_stdout, stderr, exit_code) = run_tsgraph(dir.path(), &["index-project", "."]);
    assert_eq!(exit_code, 3);
    assert!(stderr.contains("error TS"), "stderr: {}", stderr);
    assert!(!dir.path().join("index.tsgraph.json").exists());
}

#[test]
fn index_project_directory_without_config() {
    let dir = TempDir::new().unwrap();
    let (_stdout, stderr, exit_code) = run_tsgraph(dir.path(), &["index-project", "."]);
    assert_eq!(exit_code, 3);
    assert!(stderr.contains("TS5057"), "stderr: {}", stderr);
}

// ============================================================================
// Arguments and logging
// ============================================================================

#[test]
fn empty_dependency_dir_is_invalid_arguments() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.ts"), "declare const X: number;\n").unwrap();

    let (stdout, stderr, exit_code) =
        run_tsgraph(dir.path(), &["index-file", "a.ts", "--dependency-dir", ""]);
    assert_eq!(exit_code, 2, "stderr: {}", stderr);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 2);
    assert!(!dir.path().join("index.tsgraph.json").exists());
}

#[test]
fn json_log_format_writes_one_object_per_line() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.ts"), "declare const X: number;\n").unwrap();

    let (stdout, stderr, exit_code) = run_tsgraph(
        dir.path(),
        &["--log-format", "json", "--log-level", "info", "index-file", "a.ts"],
    );
    assert_eq!(exit_code, 0, "stdout: {}", stdout);

    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(!lines.is_empty(), "expected info logs on stderr");
    for line in lines {
        let event: Value = serde_json::from_str(line)
            .unwrap_or_else(|e| panic!("log line is not JSON ({}): {}", e, line));
        assert!(event["level"].is_string());
    }
}
