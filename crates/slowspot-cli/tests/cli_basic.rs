//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test
//! points `SLOWSPOT_CONFIG_DIR` at its own temporary directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config_dir: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new("cargo")
        .args(["run", "-q", "-p", "slowspot-cli", "--"])
        .args(args)
        .env("SLOWSPOT_CONFIG_DIR", config_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).expect("JSON line"))
        .collect()
}

fn event_types(stdout: &str) -> Vec<String> {
    json_lines(stdout)
        .iter()
        .filter_map(|v| v["type"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn test_instructions_list() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["instructions", "list"], "");
    assert_eq!(code, 0);
    assert!(stdout.contains("level1_breath"));
    assert!(stdout.contains("zen_meditation"));
}

#[test]
fn test_instructions_lookup_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["instructions", "lookup", "--level", "9", "--technique", "nothing"],
        "",
    );
    assert_eq!(code, 0);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["id"], "level1_breath");
}

#[test]
fn test_instructions_show_unknown_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["instructions", "show", "nope"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("error: instruction not found"));
}

#[test]
fn test_prefs_set_get_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["prefs", "set", "theme", "dark"], "");
    assert_eq!(code, 0);
    let (stdout, _, code) = run_cli(dir.path(), &["prefs", "get", "theme"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "dark");
}

#[test]
fn test_prefs_set_invalid_value() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["prefs", "set", "skip_instructions", "maybe"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_breathe_short_exercise() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["breathe", "--pattern", "box", "--seconds", "1"],
        "",
    );
    assert_eq!(code, 0);
    let types = event_types(&stdout);
    assert_eq!(types.first().map(String::as_str), Some("BreathingStarted"));
    assert!(types.contains(&"CountdownCompleted".to_string()));
    assert_eq!(types.last().map(String::as_str), Some("BreathingStopped"));
}

#[test]
fn test_prepare_walkthrough() {
    let dir = tempfile::tempdir().unwrap();
    let input = "next\ntoggle 1\ntoggle 2\nnext\nstart\nfinish\nbegin be here\n";
    let (stdout, _, code) = run_cli(dir.path(), &["prepare"], input);
    assert_eq!(code, 0);

    let types = event_types(&stdout);
    assert!(types.contains(&"BreathingStarted".to_string()));
    let begun = json_lines(&stdout)
        .into_iter()
        .find(|v| v["type"] == "SessionBegun")
        .expect("session begun");
    assert_eq!(begun["intention"], "be here");
}

#[test]
fn test_prepare_dont_ask_again_skips_next_time() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["prepare"], "skip\ndont-ask\nconfirm\nbegin\n");
    assert_eq!(code, 0);
    assert!(event_types(&stdout).contains(&"PreferencePersisted".to_string()));

    let (stdout, _, code) = run_cli(dir.path(), &["prepare"], "");
    assert_eq!(code, 0);
    assert_eq!(event_types(&stdout), vec!["SessionBegun".to_string()]);
}
