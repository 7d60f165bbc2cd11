// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use satchel_core::SyncKind;
use serde_json::json;
use tempfile::TempDir;

fn entry(seq: i64) -> SyncEntry {
    SyncEntry {
        seq,
        kind: SyncKind::Progress,
        payload: json!({ "lessonId": format!("l{seq}") }),
        enqueued_at: Utc::now(),
    }
}

#[test]
fn append_and_read_back() {
    let dir = TempDir::new().unwrap();
    let mut log = ReceivedLog::open(dir.path().join("received.jsonl")).unwrap();
    assert!(log.is_empty());

    assert!(log.append("c-1", &entry(1)).unwrap());
    assert!(log.append("c-1", &entry(2)).unwrap());

    let all = log.all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].entry.seq, 1);
    assert_eq!(all[1].client_id, "c-1");
}

#[test]
fn duplicate_seq_from_same_client_is_skipped() {
    let dir = TempDir::new().unwrap();
    let mut log = ReceivedLog::open(dir.path().join("received.jsonl")).unwrap();

    assert!(log.append("c-1", &entry(1)).unwrap());
    assert!(!log.append("c-1", &entry(1)).unwrap());
    assert_eq!(log.len(), 1);
    assert_eq!(log.all().unwrap().len(), 1);
}

#[test]
fn same_seq_from_another_client_is_new() {
    let dir = TempDir::new().unwrap();
    let mut log = ReceivedLog::open(dir.path().join("received.jsonl")).unwrap();

    assert!(log.append("c-1", &entry(1)).unwrap());
    assert!(log.append("c-2", &entry(1)).unwrap());
    assert_eq!(log.len(), 2);
}

#[test]
fn reopen_remembers_seen_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.jsonl");
    {
        let mut log = ReceivedLog::open(&path).unwrap();
        log.append("c-1", &entry(7)).unwrap();
    }

    let mut log = ReceivedLog::open(&path).unwrap();
    assert_eq!(log.len(), 1);
    assert!(!log.append("c-1", &entry(7)).unwrap());
    assert!(log.append("c-1", &entry(8)).unwrap());
}

#[test]
fn corrupt_line_fails_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.jsonl");
    std::fs::write(&path, "not json\n").unwrap();

    assert!(ReceivedLog::open(&path).is_err());
}
