//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_quitter"))
        .args(args)
        .env("QUITTER_DATA_DIR", data_dir)
        .env_remove("QUITTER_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_check_creates_initial_streak() {
    let dir = tempfile::tempdir().unwrap();
    let record = run_json(dir.path(), &["--user", "alice", "check"]);
    assert_eq!(record["userId"], "alice");
    assert_eq!(record["currentStreak"], 0);
    assert_eq!(record["longestStreak"], 0);
    assert_eq!(record["relapses"], 0);
    assert!(dir.path().join("quitter.db").exists());
}

#[test]
fn test_status_json() {
    let dir = tempfile::tempdir().unwrap();
    let status = run_json(dir.path(), &["--user", "alice", "status", "--json"]);
    assert_eq!(status["current_streak"], 0);
    assert_eq!(status["brain_rewiring"], 0);
    assert!(status["badge"].is_null());
    assert_eq!(status["elapsed"]["days"], 0);
}

#[test]
fn test_status_without_user_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no user selected"));
}

#[test]
fn test_reset_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["--user", "alice", "reset"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--yes"));

    let record = run_json(dir.path(), &["--user", "alice", "reset", "--yes"]);
    assert_eq!(record["relapses"], 1);
    assert_eq!(record["currentStreak"], 0);

    // Persisted locally across invocations.
    let record = run_json(dir.path(), &["--user", "alice", "check"]);
    assert_eq!(record["relapses"], 1);
}

#[test]
fn test_user_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "user.id", "bob"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "user.id = bob");

    let record = run_json(dir.path(), &["check"]);
    assert_eq!(record["userId"], "bob");
}

#[test]
fn test_config_get_set_list() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "streak.brain_rewiring_horizon_days"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "90");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "sync.reconcile_policy", "freshest"]);
    assert_eq!(code, 0);
    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[sync]"));
    assert!(stdout.contains("reconcile_policy = \"freshest\""));

    let (stdout, _, code) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));

    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_sync_disabled_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["--user", "alice", "sync"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("disabled"));
}

#[test]
fn test_badges_json_lists_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let rows = run_json(dir.path(), &["badges", "--json"]);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 11);
    assert!(rows.iter().all(|r| r["earned"] == false));
    assert_eq!(rows[0]["title"], "1 Day");
}

#[test]
fn test_watch_prints_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["--user", "alice", "watch", "--seconds", "1"]);
    assert_eq!(code, 0, "{stderr}");
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("0d 00h 00m"));
}

#[test]
fn test_verbose_logs_session_backend() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["--verbose", "--user", "alice", "check"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("opening streak session"));
    assert!(stderr.contains("disabled"));
}
