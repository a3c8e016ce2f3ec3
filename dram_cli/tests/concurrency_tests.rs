//! Concurrency tests for the dram binary.
//!
//! These tests verify that multiple processes can safely:
//! - Append to the journal simultaneously (file locking)
//! - Read the journal while others write

use assert_cmd::Command;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dram"));
    cmd.env("TZ", "UTC")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .arg("--data-dir")
        .arg(home.join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn journal_lines(home: &Path) -> Vec<String> {
    std::fs::read_to_string(home.join("data/journal.jsonl"))
        .expect("Failed to read journal")
        .lines()
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[test]
fn test_sequential_adds() {
    let temp_dir = setup_test_dir();
    let home = temp_dir.path();

    for i in 0..5 {
        thread::sleep(Duration::from_millis(i * 5));
        cli(home)
            .args(["add", "--category", "beer"])
            .assert()
            .success();
    }

    assert_eq!(journal_lines(home).len(), 5, "Expected 5 journaled adds");
}

#[test]
fn test_reads_while_writing() {
    let temp_dir = setup_test_dir();
    let home = temp_dir.path().to_path_buf();

    cli(&home)
        .args(["add", "--category", "wine"])
        .assert()
        .success();

    let writer_home = home.clone();
    let writer = thread::spawn(move || {
        for _ in 0..3 {
            cli(&writer_home)
                .args(["add", "--category", "highball"])
                .assert()
                .success();
        }
    });

    for _ in 0..3 {
        cli(&home).args(["list", "--json"]).assert().success();
        thread::sleep(Duration::from_millis(5));
    }

    writer.join().expect("Writer thread panicked");
    assert_eq!(journal_lines(&home).len(), 4);
}

#[test]
fn test_no_journal_corruption_under_load() {
    let temp_dir = setup_test_dir();
    let home = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let home = home.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(i * 5));
                cli(&home)
                    .args(["add", "--category", "chu-hi", "--price", "200"])
                    .timeout(Duration::from_secs(10))
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let lines = journal_lines(&home);
    for line in &lines {
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(line);
        assert!(parsed.is_ok(), "Journal contains invalid JSON line: {}", line);
    }
    assert_eq!(lines.len(), 10, "Expected 10 valid entries in journal");
}
