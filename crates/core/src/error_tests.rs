// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    schema = { Error::Schema("unknown collection 'grades'".into()), "grades" },
    busy = { Error::SyncBusy, "in progress" },
    offline = { Error::Offline, "offline" },
    taken = { Error::EmailTaken("a@b.c".into()), "a@b.c" },
    credentials = { Error::InvalidCredentials, "password" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn drain_failure_names_entry_and_reason() {
    let err = Error::SyncDrainFailure {
        failed_seq: 7,
        reason: "connection reset".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains('7'));
    assert!(msg.contains("connection reset"));
    assert!(msg.contains("left intact"));
}

#[test]
fn invalid_value_lists_valid_choices() {
    let err = Error::InvalidValue {
        kind: "role",
        value: "janitor".into(),
        valid: "student, teacher, admin",
    };
    let msg = err.to_string();
    assert!(msg.contains("janitor"));
    assert!(msg.contains("teacher"));
}

#[parameterized(
    busy = { Error::SyncBusy, true },
    offline = { Error::Offline, true },
    schema = { Error::Schema("x".into()), false },
    constraint = { Error::Constraint("x".into()), false },
    credentials = { Error::InvalidCredentials, false },
)]
fn transient_classification(err: Error, expected: bool) {
    assert_eq!(err.is_transient(), expected);
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn error_from_rusqlite() {
    let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, Error::StorageIo(_)));
}
