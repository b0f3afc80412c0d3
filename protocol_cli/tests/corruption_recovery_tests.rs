//! Corruption recovery tests for dayplan.
//!
//! These tests verify the system can handle:
//! - A corrupted stored protocol
//! - A corrupted activity calendar
//! - Stray files left in the data directory

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PLAN: &str = "### DIA 1: Costas\n- Remada Baixa: 3x12\n### DIA 2\n- Puxada Alta: 3x10\n";

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dayplan"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir_all(temp_dir.path().join("data")).unwrap();
    fs::write(temp_dir.path().join("plan.md"), PLAN).unwrap();
    temp_dir
}

#[test]
fn test_corrupted_protocol_treated_as_absent() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    fs::write(data_dir.join("active_protocol.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted protocol");

    cli(temp_dir.path())
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active protocol"));

    // Activating a new protocol replaces the corrupted one
    cli(temp_dir.path())
        .arg("activate")
        .arg(temp_dir.path().join("plan.md"))
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Remada Baixa"));
}

#[test]
fn test_truncated_protocol_file() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("activate")
        .arg(temp_dir.path().join("plan.md"))
        .assert()
        .success();

    // Simulate a crash mid-write by a tool that does not write atomically
    let path = temp_dir.path().join("data/active_protocol.json");
    let contents = fs::read_to_string(&path).unwrap();
    fs::write(&path, &contents[..contents.len() / 2]).unwrap();

    cli(temp_dir.path())
        .arg("progress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active protocol"));
}

#[test]
fn test_corrupted_activity_log_is_rebuilt() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(temp_dir.path())
        .arg("activate")
        .arg(temp_dir.path().join("plan.md"))
        .assert()
        .success();

    fs::write(data_dir.join("activity_dates.json"), "not json at all").unwrap();

    cli(temp_dir.path())
        .args(["log", "--day", "1", "--exercise", "1", "--weight", "50", "--sets", "3"])
        .assert()
        .success();
    cli(temp_dir.path())
        .args(["done", "--day", "1", "--exercise", "1"])
        .assert()
        .success();
    cli(temp_dir.path())
        .args(["finish", "--day", "1", "--difficulty", "2", "--energy", "4"])
        .assert()
        .success();

    let contents = fs::read_to_string(data_dir.join("activity_dates.json")).unwrap();
    let dates: Vec<String> = serde_json::from_str(&contents).expect("Activity log not rebuilt");
    assert_eq!(dates.len(), 1);
}

#[test]
fn test_stray_files_in_data_dir_are_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    // Leftovers from an interrupted atomic write
    fs::write(data_dir.join(".tmpA1b2C3"), "{\"title\":").unwrap();
    fs::write(data_dir.join("notes.txt"), "unrelated").unwrap();

    cli(temp_dir.path())
        .arg("activate")
        .arg(temp_dir.path().join("plan.md"))
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["show", "--day", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Puxada Alta"));
}
