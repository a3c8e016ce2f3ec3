//! Corruption recovery tests for the dram binary.
//!
//! These tests verify the system can handle:
//! - Corrupted state files
//! - Corrupted journal lines
//! - Missing files
//! - Partial writes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dram"));
    cmd.env("TZ", "UTC")
        .env("HOME", temp_dir.path())
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir_all(temp_dir.path().join("data")).unwrap();
    temp_dir
}

fn journal_line(id: &str, timestamp: &str) -> String {
    format!(
        r#"{{"op":"upsert","event":{{"id":"{}","timestamp":"{}","category":"wine","volume_ml":150.0,"abv_percent":12.0}}}}"#,
        id, timestamp
    )
}

#[test]
fn test_corrupted_state_file() {
    let temp_dir = setup_test_dir();
    let state_path = temp_dir.path().join("data/state.json");
    fs::write(&state_path, "{ invalid json }}}}").expect("Failed to write corrupted state");

    // Falls back to the default profile and seeded presets
    cli(&temp_dir)
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("default_beer_can"));

    cli(&temp_dir).args(["quick", "shot"]).assert().success();
}

#[test]
fn test_state_recovered_on_next_save() {
    let temp_dir = setup_test_dir();
    let state_path = temp_dir.path().join("data/state.json");
    fs::write(&state_path, "corrupted").unwrap();

    cli(&temp_dir)
        .args(["profile", "--weight", "72"])
        .assert()
        .success();

    // The rewritten state file is valid again
    let content = fs::read_to_string(&state_path).unwrap();
    let state: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(state["profile"]["body_weight_kg"], 72.0);
    assert!(!state["presets"].as_array().unwrap().is_empty());
}

#[test]
fn test_corrupted_journal_lines_ignored_during_read() {
    let temp_dir = setup_test_dir();
    let journal_path = temp_dir.path().join("data/journal.jsonl");
    fs::write(
        &journal_path,
        format!(
            "{{ invalid json }}\n{}\n{{ more invalid }}\n",
            journal_line("6f1c2a9e-3b0d-4f7e-9a41-2d5c8e7b1f03", "2024-06-01T20:00:00Z")
        ),
    )
    .expect("Failed to write corrupted journal");

    cli(&temp_dir)
        .args(["week", "--date", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 14.4 g in 1 drinks"));
}

#[test]
fn test_partial_journal_line() {
    let temp_dir = setup_test_dir();
    let journal_path = temp_dir.path().join("data/journal.jsonl");

    // Simulate a crash during write: valid line, then a torn one
    let mut file = fs::File::create(&journal_path).unwrap();
    writeln!(
        file,
        "{}",
        journal_line("6f1c2a9e-3b0d-4f7e-9a41-2d5c8e7b1f03", "2024-06-01T20:00:00Z")
    )
    .unwrap();
    write!(file, r#"{{"op":"upsert","event":{{"id":"partial"#).unwrap();
    drop(file);

    cli(&temp_dir)
        .args(["add", "--category", "beer", "--at", "2024-06-01 21:00"])
        .assert()
        .success();

    // Both whole events survive; the torn line is dropped
    cli(&temp_dir)
        .args(["week", "--date", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 28.4 g in 2 drinks"));
}

#[test]
fn test_journal_with_invalid_event_values() {
    let temp_dir = setup_test_dir();
    let journal_path = temp_dir.path().join("data/journal.jsonl");
    fs::write(
        &journal_path,
        format!(
            "{}\n",
            journal_line("not-a-uuid", "2024-06-01T20:00:00Z")
        ),
    )
    .unwrap();

    cli(&temp_dir)
        .args(["list", "--json", "--days", "3650"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_missing_data_dir() {
    let temp_dir = tempfile::tempdir().unwrap();

    // No data dir at all: reads work, first write creates it
    cli(&temp_dir).arg("status").assert().success();
    assert!(!temp_dir.path().join("data/journal.jsonl").exists());

    cli(&temp_dir)
        .args(["add", "--category", "other"])
        .assert()
        .success();
    assert!(temp_dir.path().join("data/journal.jsonl").exists());
}

#[test]
fn test_empty_files() {
    let temp_dir = setup_test_dir();
    fs::write(temp_dir.path().join("data/journal.jsonl"), "").unwrap();
    fs::write(temp_dir.path().join("data/state.json"), "").unwrap();

    cli(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 drinks"));
}

#[test]
fn test_import_skips_bad_rows() {
    let temp_dir = setup_test_dir();
    let csv_path = temp_dir.path().join("drinks.csv");
    fs::write(
        &csv_path,
        "id,timestamp,category,volume_ml,abv_percent,price,location,note,favorite\n\
         6f1c2a9e-3b0d-4f7e-9a41-2d5c8e7b1f03,2024-06-01T20:00:00+00:00,wine,150,12,800,,,false\n\
         bad-id,2024-06-01T20:00:00+00:00,wine,150,12,,,,false\n\
         0b7e4d21-8c3a-4e59-b6f2-91a0d3c5e847,2024-06-01T21:00:00+00:00,mead,150,12,,,,false\n\
         this line is not csv for this header\n",
    )
    .unwrap();

    cli(&temp_dir)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Imported 1 of 1 drinks"));
}
