//! Integration tests for the on-disk download ledger

use cdn_log_downloader::resume::{LedgerLock, LEDGER_FILE_NAME};
use cdn_log_downloader::{DownloadRecord, DownloadState, Ledger, LedgerError};
use chrono::{TimeZone, Utc};
use std::fs;
use tempfile::TempDir;

fn record(state: DownloadState, size: &str) -> DownloadRecord {
    let mut record = DownloadRecord::default();
    record.begin(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    record.finish(state, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 3).unwrap());
    record.size = size.to_string();
    record
}

#[test]
fn test_snapshot_survives_reload() {
    let dir = TempDir::new().unwrap();
    let mut ledger = Ledger::open(dir.path());
    ledger.put("https://s/h1/a.log.gz", record(DownloadState::Completed, "120"));
    ledger.put("https://s/h1/b.log.gz", record(DownloadState::WriteFailed, "99"));
    ledger.flush().unwrap();

    let reloaded = Ledger::open(dir.path());
    assert_eq!(reloaded.len(), 2);
    assert_eq!(
        reloaded.get("https://s/h1/a.log.gz"),
        record(DownloadState::Completed, "120")
    );
    assert_eq!(
        reloaded.get("https://s/h1/b.log.gz").state,
        DownloadState::WriteFailed
    );
    assert_eq!(
        reloaded.get("https://s/h1/never.log.gz"),
        DownloadRecord::default()
    );
}

#[test]
fn test_snapshot_format_uses_numeric_state_codes() {
    let dir = TempDir::new().unwrap();
    let mut ledger = Ledger::open(dir.path());
    ledger.put("https://s/h1/a.log.gz", record(DownloadState::MkdirFailed, ""));
    ledger.flush().unwrap();

    let raw = fs::read_to_string(dir.path().join(LEDGER_FILE_NAME)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["schema_version"], "1");
    assert_eq!(json["entries"][0]["url"], "https://s/h1/a.log.gz");
    assert_eq!(json["entries"][0]["state"], 20);
    assert_eq!(json["entries"][0]["size"], "");
}

#[test]
fn test_flush_leaves_no_temporary_files() {
    let dir = TempDir::new().unwrap();
    let mut ledger = Ledger::open(dir.path());
    for i in 0..5 {
        ledger.put(&format!("https://s/h1/{i}.log.gz"), record(DownloadState::Completed, "1"));
        ledger.flush().unwrap();
    }

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![LEDGER_FILE_NAME.to_string()]);
}

#[test]
fn test_truncated_snapshot_loads_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(LEDGER_FILE_NAME),
        r#"{"schema_version":"1","entries":[{"url":"https://s/a","#,
    )
    .unwrap();

    let ledger = Ledger::open(dir.path());
    assert!(ledger.is_empty());
}

#[test]
fn test_directory_lock_is_exclusive() {
    let dir = TempDir::new().unwrap();
    let mut first = LedgerLock::open(dir.path()).unwrap();
    let mut second = LedgerLock::open(dir.path()).unwrap();

    let guard = first.try_exclusive().unwrap();
    assert!(matches!(second.try_exclusive(), Err(LedgerError::Locked(_))));
    drop(guard);
    assert!(second.try_exclusive().is_ok());
}
