//! Binary-level tests. None of these reach the network.

use std::fs;

use assert_cmd::Command;
use chrono::NaiveDate;
use predicates::prelude::*;
use tempfile::TempDir;

use cascade_core::{Position, ReturnValue, WeightTable};
use cascade_ext_file::{RunMetadata, ValidationStatus, VersionedStore};

fn cascade() -> Command {
    Command::cargo_bin("cascade").unwrap()
}

fn write_config(dir: &TempDir, active_funds: &str) -> std::path::PathBuf {
    let path = dir.path().join("cascade.toml");
    let content = format!(
        r#"
output_dir = "{}"
active_funds = [{active_funds}]

[gateway]
base_url = "http://127.0.0.1:9"
username = "analyst"
api_key = "secret"
retry_attempts = 1
retry_delay_seconds = 0.0

[validation.global]
ucits_cap = 19.25
"#,
        dir.path().join("out").display()
    );
    fs::write(&path, content).unwrap();
    path
}

fn seed_store(dir: &TempDir) {
    let date = NaiveDate::from_ymd_opt(2025, 11, 21).unwrap();
    let table = WeightTable::from_positions(
        "demo_fund",
        date,
        vec![
            Position::new("P1", "AAA", 60.0).with_return(ReturnValue::Value(0.25)),
            Position::new("P1", "BBB", 40.0),
            Position::new("P2", "AAA", 100.0),
        ],
    )
    .unwrap();
    let at = date.and_hms_opt(9, 15, 0).unwrap();
    let metadata = RunMetadata::new(&table, at, 0.1, ValidationStatus::Passed, "tester");
    VersionedStore::new(dir.path().join("out"))
        .save(&table, metadata)
        .unwrap();
}

#[test]
fn test_help_lists_commands() {
    cascade()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_missing_config_exits_2() {
    let dir = TempDir::new().unwrap();
    cascade()
        .args(["run", "--config"])
        .arg(dir.path().join("absent.toml"))
        .args(["--date", "20251121"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn test_invalid_config_exits_2() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cascade.toml");
    fs::write(&path, "output_dir = \"out\"\n[gateway]\nbase_url = \"\"\nusername = \"u\"\napi_key = \"k\"\n").unwrap();
    cascade()
        .args(["run", "--date", "20251121", "--config"])
        .arg(&path)
        .assert()
        .code(2);
}

#[test]
fn test_unknown_fund_aborts_with_exit_2() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#""vanguard_lifestrat""#);
    cascade()
        .args(["run", "--date", "20251121", "--fund", "nope", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_abort_reason_in_json_summary() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#""vanguard_lifestrat""#);
    let output = cascade()
        .args(["run", "--date", "20251121", "--fund", "nope", "--format", "json", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(summary["abort_reason"].as_str().unwrap().contains("nope"));
    assert_eq!(summary["results"], serde_json::json!([]));
}

#[test]
fn test_abort_reason_reported_with_csv() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#""vanguard_lifestrat""#);
    cascade()
        .args(["run", "--date", "20251121", "--fund", "nope", "--format", "csv", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Run aborted"))
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_invalid_date_exits_2() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#""vanguard_lifestrat""#);
    cascade()
        .args(["run", "--date", "21/11/2025", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn test_show_prints_latest_as_csv() {
    let dir = TempDir::new().unwrap();
    seed_store(&dir);
    cascade()
        .args(["show", "--fund", "demo_fund", "--date", "20251121", "--format", "csv"])
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Benchmark ID,Portfolio,Security ID,Weight,Return",
        ))
        .stdout(predicate::str::contains("P1_AAA,P1,AAA,60.0,0.25"));
}

#[test]
fn test_show_filters_portfolio() {
    let dir = TempDir::new().unwrap();
    seed_store(&dir);
    cascade()
        .args(["show", "--fund", "demo_fund", "--date", "20251121", "--portfolio", "P2"])
        .args(["--format", "json"])
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("P2_AAA"))
        .stdout(predicate::str::contains("P1_AAA").not());
}

#[test]
fn test_show_missing_day_exits_2() {
    let dir = TempDir::new().unwrap();
    cascade()
        .args(["show", "--fund", "demo_fund", "--date", "20251120"])
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no results"));
}
