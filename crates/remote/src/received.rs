// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only log of accepted sync entries.
//!
//! One JSON object per line, fsynced on append. An entry is identified by
//! the submitting client and its queue `seq`; a re-submission of a known
//! pair is not written again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use satchel_core::{Result, SyncEntry};

/// One line of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Received {
    pub client_id: String,
    pub received_at: DateTime<Utc>,
    pub entry: SyncEntry,
}

pub struct ReceivedLog {
    path: PathBuf,
    seen: HashSet<(String, i64)>,
}

impl ReceivedLog {
    /// Opens or creates the log, loading known `(client, seq)` pairs.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut seen = HashSet::new();
        for received in read_lines(&path)? {
            seen.insert((received.client_id, received.entry.seq));
        }
        Ok(ReceivedLog { path, seen })
    }

    /// Records an entry.
    ///
    /// Returns Ok(true) if it was appended, Ok(false) if this client already
    /// delivered this seq.
    pub fn append(&mut self, client_id: &str, entry: &SyncEntry) -> Result<bool> {
        let key = (client_id.to_string(), entry.seq);
        if self.seen.contains(&key) {
            return Ok(false);
        }

        let line = serde_json::to_string(&Received {
            client_id: client_id.to_string(),
            received_at: Utc::now(),
            entry: entry.clone(),
        })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        file.sync_all()?;

        self.seen.insert(key);
        Ok(true)
    }

    /// Everything recorded so far, in arrival order.
    pub fn all(&self) -> Result<Vec<Received>> {
        read_lines(&self.path)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_lines(path: &Path) -> Result<Vec<Received>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        out.push(serde_json::from_str(&line)?);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "received_tests.rs"]
mod tests;
