//! End-to-end tests for the flagtune CLI surface.
//!
//! These cover argument validation and the catalog command; tune/measure
//! trials against a real configure/make project are exercised at the library
//! level instead, since they would rebuild a project many times over.

use std::fs;
use std::process::{Command, Output};

fn run_flagtune(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_flagtune"))
        .args(args)
        .output()
        .expect("failed to run flagtune")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_catalog_lists_builtin_flags() {
    let output = run_flagtune(&["catalog"]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("exclusive optimization levels (6):"));
    assert!(stdout.contains("-Ofast"));
    assert!(stdout.contains("independent flags (26):"));
    assert!(stdout.contains("-fno-signaling-nans -fno-trapping-math"));
}

#[test]
fn test_catalog_json_output() {
    let output = run_flagtune(&["catalog", "-f", "json"]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_str(&stdout_of(&output)).expect("catalog output should be valid JSON");
    assert_eq!(json["exclusive"].as_array().unwrap().len(), 6);
    assert_eq!(json["exclusive"][0], "-O0");
    assert_eq!(json["independent"].as_array().unwrap().len(), 26);
}

#[test]
fn test_catalog_override_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("catalog.toml");
    fs::write(
        &path,
        "exclusive = [\"-O2\"]\nindependent = [\"-fcustom-flag\"]\n",
    )
    .unwrap();

    let output = run_flagtune(&["catalog", "--catalog", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("-fcustom-flag"));
}

#[test]
fn test_catalog_rejects_malformed_override() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("catalog.toml");
    fs::write(&path, "exclusive = \"not-a-list\"\n").unwrap();

    let output = run_flagtune(&["catalog", "--catalog", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr_of(&output).contains("Invalid flag catalog"));
}

#[test]
fn test_tune_rejects_missing_project_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("no-such-project");

    let output = run_flagtune(&["tune", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("Project directory not found"));
}

#[test]
fn test_tune_requires_configure_script() {
    let dir = tempfile::TempDir::new().unwrap();

    let output = run_flagtune(&["tune", dir.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("configure"));
}

#[test]
fn test_tune_rejects_too_few_runs() {
    let dir = tempfile::TempDir::new().unwrap();

    let output = run_flagtune(&["tune", dir.path().to_str().unwrap(), "--runs", "1"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr_of(&output).contains("--runs must be at least 2"));
}

#[test]
fn test_measure_validates_project_like_tune() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("gone");

    let output = run_flagtune(&["measure", missing.to_str().unwrap(), "--", "-O2"]);
    assert_eq!(output.status.code(), Some(1));
}
