//! Integration tests for the tcomp CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tcomp::entities::{Direction, ToolCompensation};
use tempfile::TempDir;

/// Helper to get a tcomp command isolated from the user's global config
fn tcomp(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tcomp").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
        .env("HOME", tmp.path())
        .env_remove("TCOMP_SIGNATURES_DB")
        .env_remove("TCOMP_SIGNATURES_TABLE")
        .env_remove("RUST_LOG");
    cmd
}

fn create_signatures_db(path: &Path, names: &[&str]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch("CREATE TABLE signatures (name TEXT NOT NULL)")
        .unwrap();
    for name in names {
        conn.execute("INSERT INTO signatures (name) VALUES (?1)", [name])
            .unwrap();
    }
}

/// Project with a signatures database and a known last order for machine 3
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tcomp(&tmp).arg("init").assert().success();
    create_signatures_db(&tmp.path().join("signatures.db"), &["MK", "JD"]);
    fs::write(
        tmp.path().join(".tcomp/config.yaml"),
        "signatures_db: signatures.db\nlast_orders:\n  3: MO-LAST-3\n",
    )
    .unwrap();
    tmp
}

fn new_record(tmp: &TempDir, extra: &[&str]) -> ToolCompensation {
    let output = tcomp(tmp)
        .args(["new", "--machine", "3"])
        .args(extra)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_yml::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    tcomp(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tool compensation"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    tcomp(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tcomp"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    tcomp(&tmp)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();
    tcomp(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".tcomp").is_dir());
    assert!(tmp.path().join(".tcomp/config.yaml").exists());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Signatures Command Tests
// ============================================================================

#[test]
fn test_signatures_lists_names() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .arg("signatures")
        .assert()
        .success()
        .stdout("MK\nJD\n");
}

#[test]
fn test_signatures_json() {
    let tmp = setup_test_project();
    let output = tcomp(&tmp)
        .args(["signatures", "--format", "json"])
        .output()
        .unwrap();
    let names: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(names, vec!["MK", "JD"]);
}

#[test]
fn test_signatures_missing_database_is_empty() {
    let tmp = TempDir::new().unwrap();
    tcomp(&tmp).arg("init").assert().success();
    tcomp(&tmp)
        .arg("signatures")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No signatures available"));
}

#[test]
fn test_signatures_count() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .args(["signatures", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_signatures_from_env_database() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("other.db");
    create_signatures_db(&db, &["ENV"]);
    tcomp(&tmp)
        .env("TCOMP_SIGNATURES_DB", &db)
        .arg("signatures")
        .assert()
        .success()
        .stdout("ENV\n");
}

// ============================================================================
// New Command Tests
// ============================================================================

#[test]
fn test_new_emits_record() {
    let tmp = setup_test_project();
    let record = new_record(
        &tmp,
        &[
            "--tool", "T12", "--direction", "z", "--value", "+0.15", "--comment",
            "insert change", "--signature", "MK",
        ],
    );

    assert!(record.id.to_string().starts_with("TCMP-"));
    assert_eq!(record.machine, 3);
    assert_eq!(record.tool.as_deref(), Some("T12"));
    assert_eq!(record.coordinate_system, None);
    assert_eq!(record.direction, Direction::Z);
    assert_eq!(record.value, "+0.15");
    assert_eq!(record.comment.as_deref(), Some("insert change"));
    assert_eq!(record.signature, "MK");
}

#[test]
fn test_new_prefills_last_order() {
    let tmp = setup_test_project();
    let record = new_record(
        &tmp,
        &["-c", "G54", "-d", "X", "--value", "-0.02", "-s", "JD"],
    );
    assert_eq!(record.manufacturing_order, "MO-LAST-3");
    assert_eq!(record.value, "-0.02");
}

#[test]
fn test_new_explicit_order_wins() {
    let tmp = setup_test_project();
    let record = new_record(
        &tmp,
        &["-o", "MO-999", "-n", "7", "-d", "L", "--value", ".5", "-s", "MK"],
    );
    assert_eq!(record.manufacturing_order, "MO-999");
    assert_eq!(record.number.as_deref(), Some("7"));
}

#[test]
fn test_new_without_order_fails_for_unknown_machine() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .args([
            "new", "--machine", "8", "-t", "T1", "-d", "X", "--value", "1", "-s", "MK",
        ])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Manufacturing order"));
}

#[test]
fn test_new_requires_coordinate_system_tool_or_number() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .args(["new", "--machine", "3", "-d", "X", "--value", "0.1", "-s", "MK"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("invalid field"));
}

#[test]
fn test_new_rejects_non_numeric_value() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .args([
            "new", "--machine", "3", "-t", "T1", "-d", "X", "--value", "abc", "-s", "MK",
        ])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Value"));
}

#[test]
fn test_new_rejects_unknown_signature() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .args([
            "new", "--machine", "3", "-t", "T1", "-d", "X", "--value", "1", "-s", "nobody",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a known signature"));
}

#[test]
fn test_new_without_signatures_cannot_sign() {
    let tmp = TempDir::new().unwrap();
    tcomp(&tmp).arg("init").assert().success();
    tcomp(&tmp)
        .args([
            "new", "--machine", "3", "-o", "MO-1", "-t", "T1", "-d", "X", "--value", "1", "-s",
            "MK",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No signatures"));
}

#[test]
fn test_new_json_output() {
    let tmp = setup_test_project();
    let output = tcomp(&tmp)
        .args([
            "new", "--machine", "3", "-t", "T1", "-d", "R", "--value", "0.3", "-s", "MK",
            "--format", "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["direction"], "R");
    assert_eq!(value["manufacturing_order"], "MO-LAST-3");
}

#[test]
fn test_new_uses_configured_default_format() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .args(["config", "set", "default_format", "id"])
        .assert()
        .success();
    tcomp(&tmp)
        .args([
            "new", "--machine", "3", "-t", "T1", "-d", "Y", "--value", "2", "-s", "JD",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("TCMP-"));
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn test_emitted_record_validates() {
    let tmp = setup_test_project();
    let output = tcomp(&tmp)
        .args([
            "new", "--machine", "3", "-n", "12", "-d", "Z", "--value", "+0.15", "-s", "MK",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    fs::create_dir_all(tmp.path().join("records")).unwrap();
    fs::write(tmp.path().join("records/one.tcomp.yaml"), &output.stdout).unwrap();

    tcomp(&tmp)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files passed:"));
}

#[test]
fn test_validate_reports_invalid_record() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join("bad.tcomp.yaml"),
        "id: TCMP-01HC2JB7SMQX7RS1Y0GFKBHPTD\nmachine: 3\nmanufacturing_order: MO\ndirection: Q\nvalue: \"abc\"\nsignature: MK\ncreated: \"2024-01-01T00:00:00Z\"\n",
    )
    .unwrap();

    tcomp(&tmp)
        .args(["validate", "bad.tcomp.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("error(s)"));
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_set_last_order_prefills_new() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .args(["config", "set", "last_orders.5", "MO-FIVE"])
        .assert()
        .success();
    tcomp(&tmp)
        .args(["config", "show", "last_orders.5"])
        .assert()
        .success()
        .stdout("MO-FIVE\n");

    let output = tcomp(&tmp)
        .args([
            "new", "--machine", "5", "-t", "T1", "-d", "X", "--value", "1", "-s", "MK",
        ])
        .output()
        .unwrap();
    let record: ToolCompensation = serde_yml::from_slice(&output.stdout).unwrap();
    assert_eq!(record.manufacturing_order, "MO-FIVE");
}

#[test]
fn test_config_rejects_unknown_key() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .args(["config", "set", "editor", "vi"])
        .assert()
        .failure();
}

#[test]
fn test_config_unset() {
    let tmp = setup_test_project();
    tcomp(&tmp)
        .args(["config", "unset", "last_orders.3"])
        .assert()
        .success();
    tcomp(&tmp)
        .args(["config", "show", "last_orders.3"])
        .assert()
        .failure();
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    tcomp(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tcomp"));
}
