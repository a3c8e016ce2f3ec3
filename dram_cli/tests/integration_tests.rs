//! Integration tests for the dram binary.
//!
//! These tests verify end-to-end behavior including:
//! - Recording, editing and deleting drinks
//! - Week, month and category reports
//! - Profile and preset persistence
//! - CSV export and import

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the user's config and time zone
fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dram"));
    cmd.env("TZ", "UTC")
        .env("HOME", temp_dir.path())
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"));
    cmd
}

fn list_json(temp_dir: &TempDir, days: &str) -> Vec<serde_json::Value> {
    let output = cli(temp_dir)
        .args(["list", "--json", "--days", days])
        .output()
        .expect("Failed to run list");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("list --json should print JSON")
}

fn add_beers_on_june_first(temp_dir: &TempDir) {
    for time in ["2024-06-01 19:00", "2024-06-01 20:00", "2024-06-01 21:00"] {
        cli(temp_dir)
            .args(["add", "--category", "beer", "--at", time, "--price", "500"])
            .assert()
            .success();
    }
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Personal drink log with BAC and spending analytics",
        ));
}

#[test]
fn test_add_uses_category_defaults() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--category", "beer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Logged Beer (350 ml @ 5.0%, 14.0 g alcohol)"));

    assert!(temp_dir.path().join("data/journal.jsonl").exists());

    let events = list_json(&temp_dir, "1");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["category"], "beer");
    assert_eq!(events[0]["volume_ml"], 350.0);
}

#[test]
fn test_add_rejects_unknown_category() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--category", "mead"])
        .assert()
        .failure();
}

#[test]
fn test_add_rejects_invalid_volume() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--category", "wine", "--volume", "0"])
        .assert()
        .failure();

    assert!(list_json(&temp_dir, "1").is_empty());
}

#[test]
fn test_quick_by_preset_name() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["quick", "shot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9.6 g alcohol"));

    cli(&temp_dir)
        .args(["quick", "no-such-preset"])
        .assert()
        .failure();
}

#[test]
fn test_edit_and_delete() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--category", "wine", "--note", "house red"])
        .assert()
        .success();

    let events = list_json(&temp_dir, "1");
    let id = events[0]["id"].as_str().unwrap().to_string();

    cli(&temp_dir)
        .args(["edit", &id, "--volume", "250", "--price", "900"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Updated"));

    let events = list_json(&temp_dir, "1");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["volume_ml"], 250.0);
    assert_eq!(events[0]["price"], 900.0);
    assert_eq!(events[0]["note"], "house red");

    cli(&temp_dir).args(["delete", &id]).assert().success();
    assert!(list_json(&temp_dir, "1").is_empty());

    // Second delete of the same id is an error
    cli(&temp_dir).args(["delete", &id]).assert().failure();
}

#[test]
fn test_week_report() {
    let temp_dir = setup_test_dir();
    add_beers_on_june_first(&temp_dir);

    cli(&temp_dir)
        .args(["week", "--date", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 42.0 g in 3 drinks, 1500 JPY"))
        .stdout(predicate::str::contains("Alcohol-free days: 6"))
        .stdout(predicate::str::contains("Most frequent: Beer"));
}

#[test]
fn test_month_report() {
    let temp_dir = setup_test_dir();
    add_beers_on_june_first(&temp_dir);

    cli(&temp_dir)
        .args(["month", "--date", "2024-06-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("June 2024"))
        .stdout(predicate::str::contains("Alcohol-free days: 29"));
}

#[test]
fn test_current_month_counts_only_elapsed_days() {
    use chrono::{Datelike, Utc};

    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["add", "--category", "beer"])
        .assert()
        .success();

    // Today is a drinking day; only the days before it count as alcohol-free
    let elapsed_free = Utc::now().date_naive().day() - 1;
    cli(&temp_dir)
        .arg("month")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Alcohol-free days: {}\n",
            elapsed_free
        )));
}

#[test]
fn test_lookback_days_out_of_range_rejected() {
    let temp_dir = setup_test_dir();

    for args in [
        ["list", "--days", "9223372036854775807"],
        ["breakdown", "--days", "999999999"],
        ["list", "--days", "0"],
    ] {
        cli(&temp_dir)
            .args(args)
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("--days"));
    }

    cli(&temp_dir)
        .args(["breakdown", "--days", "36500"])
        .assert()
        .success();
}

#[test]
fn test_config_currency_used_in_reports() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/dram");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[finance]\ncurrency = \"EUR\"\n").unwrap();
    add_beers_on_june_first(&temp_dir);

    cli(&temp_dir)
        .args(["week", "--date", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 42.0 g in 3 drinks, 1500 EUR"));
}

#[test]
fn test_breakdown_shares() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--category", "beer", "--volume", "500"])
        .assert()
        .success();
    cli(&temp_dir)
        .args(["add", "--category", "wine", "--volume", "100", "--abv", "12"])
        .assert()
        .success();

    cli(&temp_dir)
        .args(["breakdown", "--days", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Beer"))
        .stdout(predicate::str::contains("67.6%"))
        .stdout(predicate::str::contains("Busiest hour"));
}

#[test]
fn test_status_json() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--category", "spirits"])
        .assert()
        .success();

    let output = cli(&temp_dir)
        .args(["status", "--json"])
        .output()
        .expect("Failed to run status");
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(status["current_bac"].as_f64().unwrap() > 0.0);
    assert_eq!(status["today"]["count"], 1);
    let limit = status["daily_limit_grams"].as_f64().unwrap();
    assert!((limit - 17.0).abs() < 1e-9, "unexpected limit {}", limit);
}

#[test]
fn test_default_command_is_status() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("STATUS"))
        .stdout(predicate::str::contains("0 drinks"));
}

#[test]
fn test_profile_update_persists() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["profile", "--sex", "male", "--weight", "70", "--goal", "maintain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Profile updated"))
        .stdout(predicate::str::contains("Daily limit:  40.0 g"));

    cli(&temp_dir)
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight:       70.0 kg"))
        .stdout(predicate::str::contains("Profile updated").not());

    cli(&temp_dir)
        .args(["profile", "--weight=-3"])
        .assert()
        .failure();
}

#[test]
fn test_favorite_creates_preset() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--category", "highball", "--price", "450"])
        .assert()
        .success();
    let id = list_json(&temp_dir, "1")[0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    cli(&temp_dir)
        .args(["favorite", &id, "Corner bar highball"])
        .assert()
        .success();

    cli(&temp_dir)
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("Corner bar highball"))
        .stdout(predicate::str::contains("(custom)"));

    assert_eq!(list_json(&temp_dir, "1")[0]["is_favorite"], true);

    cli(&temp_dir)
        .args(["quick", "corner bar highball"])
        .assert()
        .success();
    assert_eq!(list_json(&temp_dir, "1").len(), 2);
}

#[test]
fn test_export_import_between_data_dirs() {
    let source = setup_test_dir();
    let target = setup_test_dir();
    add_beers_on_june_first(&source);

    let csv_path = source.path().join("drinks.csv");
    cli(&source)
        .arg("export")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Exported 3 drinks"));

    let content = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 4);

    cli(&target)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Imported 3 of 3 drinks"));

    // Re-importing the same file adds nothing
    cli(&target)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Imported 0 of 3 drinks"));

    cli(&target)
        .args(["week", "--date", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 42.0 g in 3 drinks"));
}

#[test]
fn test_compact_keeps_live_events() {
    let temp_dir = setup_test_dir();
    add_beers_on_june_first(&temp_dir);

    let journal = temp_dir.path().join("data/journal.jsonl");
    let export = |path: &Path| {
        cli(&temp_dir).arg("export").arg(path).assert().success();
    };

    let csv_path = temp_dir.path().join("before.csv");
    export(&csv_path);
    let first_id = fs::read_to_string(&csv_path)
        .unwrap()
        .lines()
        .nth(1)
        .and_then(|line| line.split(',').next())
        .unwrap()
        .to_string();

    cli(&temp_dir).args(["edit", &first_id, "--price", "600"]).assert().success();
    cli(&temp_dir).args(["delete", &first_id]).assert().success();
    assert_eq!(fs::read_to_string(&journal).unwrap().lines().count(), 5);

    cli(&temp_dir)
        .arg("compact")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Compacted journal to 2 events"));
    assert_eq!(fs::read_to_string(&journal).unwrap().lines().count(), 2);

    cli(&temp_dir)
        .args(["week", "--date", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 28.0 g in 2 drinks"));
}
