//! Ledger persistence across sessions through a CSV file on disk.

use algofond_core::domain::AssetLabel;
use algofond_core::ledger::{Ledger, LedgerError, CSV_HEADER};
use chrono::NaiveDate;

fn ledger() -> Ledger {
    let day = NaiveDate::from_ymd_opt(2024, 9, 16).unwrap();
    let mut ledger = Ledger::new();
    ledger.record_at(day.and_hms_opt(9, 5, 0).unwrap(), AssetLabel::LeveragedIndex, 4, 2_512.25);
    ledger.record_at(day.and_hms_opt(9, 6, 30).unwrap(), AssetLabel::equity("HM-B.ST"), 20, 171.9);
    ledger
}

#[test]
fn save_and_reload_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions").join("ledger.csv");

    let original = ledger();
    original.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next().unwrap(), CSV_HEADER.join(","));

    let reloaded = Ledger::load_or_default(&path).unwrap();
    assert_eq!(reloaded, original);
}

#[test]
fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::load_or_default(&dir.path().join("none.csv")).unwrap();
    assert!(ledger.is_empty());
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    std::fs::write(&path, "Date,Asset,Price\n2024-01-01,ABB.ST,100\n").unwrap();

    match Ledger::load_or_default(&path) {
        Err(LedgerError::MissingColumns { missing }) => assert_eq!(missing.len(), 5),
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn reset_then_save_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");
    let mut ledger = ledger();
    ledger.save(&path).unwrap();

    ledger.reset();
    ledger.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(Ledger::load_or_default(&path).unwrap().is_empty());
}

#[test]
fn write_csv_to_any_writer() {
    let mut buf = Vec::new();
    ledger().write_csv(&mut buf).unwrap();
    let mut restored = Ledger::new();
    restored.read_csv(buf.as_slice()).unwrap();
    assert_eq!(restored, ledger());
}
