//! Integration tests for the versioned store.

use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use cascade_core::{FundId, Position, ReturnValue, WeightTable};
use cascade_ext_file::{RunMetadata, StoreError, ValidationStatus, VersionedStore};

// =============================================================================
// TEST FIXTURES
// =============================================================================

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
}

fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
    date(day).and_hms_opt(h, m, s).unwrap()
}

fn fund() -> FundId {
    FundId::new("vanguard_lifestrat")
}

fn table(day: u32, anchor: f64) -> WeightTable {
    WeightTable::from_positions(
        fund(),
        date(day),
        vec![
            Position::new("LSE80", "I00010", 19.25),
            Position::new("LSE80", "I01018", anchor).with_return(ReturnValue::Value(0.012345678)),
            Position::new("LSE80", "SP50", 80.75 - anchor),
            Position::missing("LSE80", "I27049"),
        ],
    )
    .unwrap()
}

fn metadata(table: &WeightTable, run_at: NaiveDateTime) -> RunMetadata {
    RunMetadata::new(table, run_at, 0.25, ValidationStatus::Passed, "tester")
}

// =============================================================================
// SAVE
// =============================================================================

#[test]
fn test_save_writes_three_artifacts() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());
    let t = table(21, 19.25);

    let saved = store.save(&t, metadata(&t, at(21, 14, 30, 5))).unwrap();

    let day_dir = dir.path().join("vanguard_lifestrat").join("20251121");
    assert_eq!(
        saved.versioned_csv,
        day_dir.join("vanguard_lifestrat_20251121_143005.csv")
    );
    assert_eq!(
        saved.latest_csv,
        day_dir.join("vanguard_lifestrat_20251121_latest.csv")
    );
    assert_eq!(
        saved.metadata_json,
        day_dir.join("vanguard_lifestrat_20251121_143005.json")
    );
    assert_eq!(saved.version, 1);
    assert_eq!(
        fs::read(&saved.versioned_csv).unwrap(),
        fs::read(&saved.latest_csv).unwrap()
    );
}

#[test]
fn test_csv_layout() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());
    let t = table(21, 19.25);

    let saved = store.save(&t, metadata(&t, at(21, 9, 0, 0))).unwrap();
    let content = fs::read_to_string(saved.versioned_csv).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(
        lines[0],
        "Date,Fund ID,Portfolio,Benchmark ID,Security ID,Weight,Return"
    );
    assert_eq!(
        lines[1],
        "20251121,vanguard_lifestrat,LSE80,LSE80_I00010,I00010,19.250000000,"
    );
    assert_eq!(
        lines[2],
        "20251121,vanguard_lifestrat,LSE80,LSE80_I01018,I01018,19.250000000,0.012345678"
    );
    assert_eq!(
        lines[4],
        "20251121,vanguard_lifestrat,LSE80,LSE80_I27049,I27049,,"
    );
}

#[test]
fn test_versions_increment_and_latest_follows() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());

    let first = table(21, 19.25);
    let second = table(21, 10.0);
    store.save(&first, metadata(&first, at(21, 9, 0, 0))).unwrap();
    let saved = store.save(&second, metadata(&second, at(21, 10, 0, 0))).unwrap();

    assert_eq!(saved.version, 2);
    assert_eq!(store.versions(&fund(), date(21)).unwrap().len(), 2);
    assert_eq!(
        store.load_latest(&fund(), date(21)).unwrap().unwrap(),
        second
    );

    let meta = store.load_metadata(&saved.metadata_json).unwrap();
    assert_eq!(meta.version, 2);
}

#[test]
fn test_same_second_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());

    let first = table(21, 19.25);
    let second = table(21, 10.0);
    store.save(&first, metadata(&first, at(21, 9, 0, 0))).unwrap();
    let err = store
        .save(&second, metadata(&second, at(21, 9, 0, 0)))
        .unwrap_err();

    assert!(matches!(err, StoreError::VersionExists { .. }));
    assert_eq!(store.versions(&fund(), date(21)).unwrap().len(), 1);
    assert_eq!(store.load_latest(&fund(), date(21)).unwrap().unwrap(), first);
}

#[test]
fn test_failed_save_leaves_no_version() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());
    let t = table(21, 19.25);

    // A directory in place of the latest pointer makes publishing fail.
    let latest = store.latest_path(&fund(), date(21));
    fs::create_dir_all(&latest).unwrap();

    let err = store.save(&t, metadata(&t, at(21, 9, 0, 0))).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(store.versions(&fund(), date(21)).unwrap().is_empty());

    let mut left: Vec<_> = fs::read_dir(store.date_dir(&fund(), date(21)))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    left.sort();
    assert_eq!(left, vec![latest.clone()]);

    // Once the blocker is gone the same run second saves as version 1.
    fs::remove_dir(&latest).unwrap();
    let saved = store.save(&t, metadata(&t, at(21, 9, 0, 0))).unwrap();
    assert_eq!(saved.version, 1);
}

#[test]
fn test_metadata_fields() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());
    let t = table(21, 19.25);

    let saved = store.save(&t, metadata(&t, at(21, 14, 30, 5))).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(saved.metadata_json).unwrap()).unwrap();

    assert_eq!(json["fund_name"], "vanguard_lifestrat");
    assert_eq!(json["calculation_date"], "20251121");
    assert_eq!(json["run_timestamp"], "2025-11-21T14:30:05");
    assert_eq!(json["validation_status"], "PASSED");
    assert_eq!(json["num_portfolios"], 1);
    assert_eq!(json["num_components"], 4);
    assert_eq!(json["version"], 1);
    assert_eq!(json["user"], "tester");
    assert!(json["run_id"].is_string());
    assert!(json["engine_version"].is_string());
    assert!(json["runtime_seconds"].is_number());
}

// =============================================================================
// LOAD
// =============================================================================

#[test]
fn test_load_round_trips_weights_and_returns() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());
    let t = table(21, 0.672804101);

    store.save(&t, metadata(&t, at(21, 9, 0, 0))).unwrap();
    let loaded = store.load_latest(&fund(), date(21)).unwrap().unwrap();

    assert_eq!(loaded.weight("LSE80", "I01018"), Some(0.672804101));
    assert_eq!(loaded.weight("LSE80", "I27049"), None);
    let anchor = &loaded.positions()[0];
    assert!(anchor.period_return.is_no_data());
    assert_eq!(
        loaded.positions()[1].period_return,
        ReturnValue::Value(0.012345678)
    );
}

#[test]
fn test_previous_day_is_strictly_one_day_back() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());
    let t = table(20, 19.25);
    store.save(&t, metadata(&t, at(20, 9, 0, 0))).unwrap();

    assert_eq!(store.previous_day(&fund(), date(21)).unwrap().unwrap(), t);
    assert!(store.previous_day(&fund(), date(22)).unwrap().is_none());
    assert!(store.previous_day(&fund(), date(20)).unwrap().is_none());
}

#[test]
fn test_missing_day_has_no_versions() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());
    assert!(store.versions(&fund(), date(21)).unwrap().is_empty());
    assert!(store.load_latest(&fund(), date(21)).unwrap().is_none());
}

#[test]
fn test_corrupt_weight_is_reported() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());
    let path = store.latest_path(&fund(), date(21));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "Date,Fund ID,Portfolio,Benchmark ID,Security ID,Weight,Return\n\
         20251121,vanguard_lifestrat,LSE80,LSE80_SP50,SP50,abc,\n",
    )
    .unwrap();

    let err = store.load_latest(&fund(), date(21)).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
}

#[test]
fn test_mismatched_benchmark_id_is_reported() {
    let dir = TempDir::new().unwrap();
    let store = VersionedStore::new(dir.path());
    let path = store.latest_path(&fund(), date(21));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "Date,Fund ID,Portfolio,Benchmark ID,Security ID,Weight,Return\n\
         20251121,vanguard_lifestrat,LSE80,LSE60_SP50,SP50,100.000000000,\n",
    )
    .unwrap();

    let err = store.load_latest(&fund(), date(21)).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { ref reason, .. } if reason.contains("LSE60_SP50")));
}
