// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the satchel CLI.
///
/// Messages carry a hint where the fix is a command away.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'satchel init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("lesson not found: {0}\n  hint: run 'satchel lesson import <file>' to cache lessons")]
    LessonNotFound(String),

    #[error("lesson {0} has no quiz")]
    NoQuiz(String),

    #[error("no remote configured\n  hint: set [sync] remote_url in {0}")]
    NoRemote(String),

    #[error("invalid remote url: '{0}'\n  hint: use ws://host:port or wss://host:port")]
    InvalidRemoteUrl(String),

    #[error("no data directory could be determined\n  hint: pass --data-dir or set SATCHEL_DIR")]
    NoDataDir,

    #[error("invalid import file: {0}")]
    InvalidImport(String),

    #[error(transparent)]
    Core(#[from] satchel_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
