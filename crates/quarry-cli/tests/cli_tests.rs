//! End-to-end tests for the `quarry` binary.
//!
//! Each test writes its inputs to a temporary directory and checks the exit
//! status and output of a subcommand.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const BELL: &str = r#"{"operations":[
    {"gate":"H","qubits":[{"Line":0}]},
    {"gate":"CX","qubits":[{"Line":0},{"Line":1}]}
]}"#;

const GHZ_NAMED: &str = r#"{"operations":[
    {"gate":"H","qubits":[{"Named":"a"}]},
    {"gate":"CX","qubits":[{"Named":"a"},{"Named":"b"}]},
    {"gate":"CX","qubits":[{"Named":"b"},{"Named":"c"}]},
    {"gate":{"Rz":0.5},"qubits":[{"Named":"c"}]}
]}"#;

fn quarry(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_quarry"))
        .args(args)
        .output()
        .expect("failed to run quarry")
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// import
// ============================================================================

#[test]
fn test_import_bell() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "bell.json", BELL);

    let output = quarry(&["import", "-i", input.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Import complete"));
    assert!(out.contains("2 instances"));
    assert!(out.contains("qubits"));
}

#[test]
fn test_import_with_register_name() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "bell.json", BELL);
    let config = write(dir.path(), "interop.json", r#"{"default_register":"wires"}"#);

    let output = quarry(&[
        "import",
        "--input",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("wires"));
}

#[test]
fn test_import_missing_file() {
    let output = quarry(&["import", "-i", "/nonexistent/circuit.json"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("File not found"));
}

#[test]
fn test_import_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "broken.json", r#"{"operations":[{"gate":"CX"#);

    let output = quarry(&["import", "-i", input.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to parse circuit"));
}

#[test]
fn test_import_arity_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "bad.json",
        r#"{"operations":[{"gate":"CX","qubits":[{"Line":0}]}]}"#,
    );

    let output = quarry(&["import", "-i", input.to_str().unwrap()]);
    assert!(!output.status.success());
}

// ============================================================================
// roundtrip
// ============================================================================

#[test]
fn test_roundtrip_bell() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "bell.json", BELL);

    let output = quarry(&["roundtrip", "-i", input.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Round trip preserved 2 ops"));
}

#[test]
fn test_roundtrip_named_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "ghz.json", GHZ_NAMED);
    let config = write(dir.path(), "interop.json", r#"{"traversal":"insertion"}"#);

    let output = quarry(&[
        "-v",
        "roundtrip",
        "-i",
        input.to_str().unwrap(),
        "-c",
        config.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Round trip preserved 4 ops"));
    assert!(out.contains("Operation order unchanged"));
}

#[test]
fn test_roundtrip_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "bell.json", BELL);
    let config = write(dir.path(), "interop.json", r#"{"traversal":"sideways"}"#);

    let output = quarry(&[
        "roundtrip",
        "-i",
        input.to_str().unwrap(),
        "-c",
        config.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid config"));
}

// ============================================================================
// version
// ============================================================================

#[test]
fn test_version() {
    let output = quarry(&["version"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(env!("CARGO_PKG_VERSION")));
    assert!(out.contains("quarry-bloq"));
    assert!(out.contains("greedy traversal"));
}
