// SPDX-License-Identifier: MIT

use super::*;
use tempfile::tempdir;

#[test]
fn append_then_read_round_trips_events_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("activity.ndjson");
    let mut writer = ActivityLogWriter::open(&path).unwrap();
    writer
        .append(&ActivityEvent::new(1.0, serde_json::json!("first"), None))
        .unwrap();
    writer
        .append(&ActivityEvent::new(2.0, serde_json::json!("second"), Some("worker".into())))
        .unwrap();

    let events = read_events(&path).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].text(), "first");
    assert_eq!(events[1].executor.as_deref(), Some("worker"));
}

#[test]
fn read_events_on_missing_file_returns_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.ndjson");
    assert!(read_events(&path).unwrap().is_empty());
}

#[test]
fn trailing_partial_line_is_dropped_not_treated_as_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("activity.ndjson");
    let mut writer = ActivityLogWriter::open(&path).unwrap();
    writer
        .append(&ActivityEvent::new(1.0, serde_json::json!("whole line"), None))
        .unwrap();
    writer.file.write_all(b"{\"timestamp\":2.0,\"dat").unwrap();
    writer.file.flush().unwrap();

    let events = read_events(&path).unwrap();
    assert_eq!(events.len(), 1);
}

#[test]
fn remove_deletes_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("activity.ndjson");
    let mut writer = ActivityLogWriter::open(&path).unwrap();
    writer
        .append(&ActivityEvent::new(1.0, serde_json::json!("x"), None))
        .unwrap();
    writer.remove().unwrap();
    assert!(!path.exists());
}
