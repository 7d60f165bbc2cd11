// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for satchel-core operations.

use thiserror::Error;

/// All possible errors that can occur in satchel-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage unavailable: {0}\n  hint: check that the data directory exists and is writable")]
    StorageUnavailable(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("storage error: {0}")]
    StorageIo(#[from] rusqlite::Error),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("sync already in progress")]
    SyncBusy,

    #[error("cannot sync while offline")]
    Offline,

    #[error("sync failed at queue entry {failed_seq}: {reason}\n  hint: the queue was left intact and will be retried")]
    SyncDrainFailure { failed_seq: i64, reason: String },

    #[error("remote rejected entry {seq}: {reason}")]
    RemoteSubmission { seq: i64, reason: String },

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not signed in\n  hint: run 'satchel login' first")]
    NotAuthenticated,

    #[error("an account with email '{0}' already exists")]
    EmailTaken(String),

    #[error("invalid {kind}: '{value}'\n  hint: valid values are: {valid}")]
    InvalidValue {
        kind: &'static str,
        value: String,
        valid: &'static str,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns true for errors that a later attempt may not hit again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::StorageIo(_)
                | Error::StorageUnavailable(_)
                | Error::SyncBusy
                | Error::Offline
                | Error::SyncDrainFailure { .. }
                | Error::RemoteSubmission { .. }
        )
    }
}

/// A specialized Result type for satchel-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
