// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound sync queue.
//!
//! Every sync-worthy local write appends a [`SyncEntry`] in the same
//! transaction as the write itself, so a committed change is never missing
//! from the queue. Entries are drained in `seq` order.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::Collection;
use crate::store::{count_queue, put_row, Key, LocalStore, Record};

/// What kind of record a queue entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    Progress,
    User,
}

impl SyncKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncKind::Progress => "progress",
            SyncKind::User => "user",
        }
    }
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "progress" => Ok(SyncKind::Progress),
            "user" => Ok(SyncKind::User),
            _ => Err(Error::InvalidValue {
                kind: "sync kind",
                value: s.to_string(),
                valid: "progress, user",
            }),
        }
    }
}

/// One pending outbound change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEntry {
    /// Store-assigned, strictly increasing.
    pub seq: i64,
    pub kind: SyncKind,
    pub payload: Value,
    pub enqueued_at: DateTime<Utc>,
}

impl Record for SyncEntry {
    const COLLECTION: Collection = Collection::SyncQueue;
}

fn enqueue_row(conn: &Connection, kind: SyncKind, payload: &Value) -> Result<i64> {
    let entry = json!({
        "kind": kind,
        "payload": payload,
        "enqueuedAt": Utc::now(),
    });
    match put_row(conn, Collection::SyncQueue, &entry)? {
        Key::Seq(seq) => Ok(seq),
        other => Err(Error::CorruptedData(format!(
            "sync queue returned non-sequence key {other:?}"
        ))),
    }
}

impl LocalStore {
    /// Appends a queue entry on its own.
    pub fn enqueue(&self, kind: SyncKind, payload: &Value) -> Result<i64> {
        let seq = self.with_queue_write(|conn| enqueue_row(conn, kind, payload))?;
        debug!("enqueued {kind} change as #{seq}");
        Ok(seq)
    }

    /// Writes `record` and appends a queue entry carrying `payload` in one
    /// transaction. Either both land or neither does.
    pub fn put_and_enqueue(
        &self,
        collection: Collection,
        record: &Value,
        kind: SyncKind,
        payload: &Value,
    ) -> Result<(Key, i64)> {
        self.with_queue_write(|conn| {
            let tx = conn.transaction()?;
            let key = put_row(&tx, collection, record)?;
            let seq = enqueue_row(&tx, kind, payload)?;
            tx.commit()?;
            debug!("put {collection} {key:?} and enqueued #{seq}");
            Ok((key, seq))
        })
    }

    /// Snapshot of the queue, oldest first.
    pub fn sync_queue(&self) -> Result<Vec<SyncEntry>> {
        self.get_all_records()
    }

    pub fn pending_count(&self) -> Result<usize> {
        self.with_conn(|conn| count_queue(conn))
    }

    /// Removes every queued entry.
    pub fn clear_sync_queue(&self) -> Result<usize> {
        self.clear(Collection::SyncQueue)
    }

    pub fn remove_sync_entry(&self, seq: i64) -> Result<bool> {
        self.delete(Collection::SyncQueue, seq)
    }

    /// Removes every entry with `seq <= through` in one statement.
    ///
    /// Entries appended after a drain snapshot was taken have larger seqs
    /// and survive.
    pub fn remove_sync_entries_through(&self, through: i64) -> Result<usize> {
        self.with_queue_write(|conn| {
            let n = conn.execute("DELETE FROM sync_queue WHERE key <= ?1", params![through])?;
            debug!("removed {n} drained queue entries through #{through}");
            Ok(n)
        })
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
