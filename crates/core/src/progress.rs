// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-learner lesson progress.
//!
//! There is exactly one [`Progress`] row per `(userId, lessonId)`; saving
//! again overwrites it. Every save also queues the record for sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::queue::SyncKind;
use crate::schema::Collection;
use crate::store::{LocalStore, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::NotStarted => "not_started",
            CompletionStatus::InProgress => "in_progress",
            CompletionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CompletionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "not_started" => Ok(CompletionStatus::NotStarted),
            "in_progress" => Ok(CompletionStatus::InProgress),
            "completed" => Ok(CompletionStatus::Completed),
            _ => Err(Error::InvalidValue {
                kind: "completion status",
                value: s.to_string(),
                valid: "not_started, in_progress, completed",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub user_id: String,
    pub lesson_id: String,
    pub completion_status: CompletionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    /// Cumulative seconds.
    pub time_spent: u64,
    pub last_accessed: DateTime<Utc>,
    pub attempts: u32,
}

impl Record for Progress {
    const COLLECTION: Collection = Collection::Progress;
}

impl Progress {
    /// A fresh, untouched record.
    pub fn new(user_id: impl Into<String>, lesson_id: impl Into<String>) -> Self {
        Progress {
            user_id: user_id.into(),
            lesson_id: lesson_id.into(),
            completion_status: CompletionStatus::NotStarted,
            score: None,
            time_spent: 0,
            last_accessed: Utc::now(),
            attempts: 0,
        }
    }

    /// Opens a new attempt. A completed lesson stays completed.
    pub fn start(&mut self) {
        if self.completion_status == CompletionStatus::NotStarted {
            self.completion_status = CompletionStatus::InProgress;
        }
        self.attempts = self.attempts.saturating_add(1);
        self.last_accessed = Utc::now();
    }

    /// Adds a study session of `seconds`, saturating at `u64::MAX`.
    pub fn record_session(&mut self, seconds: u64) {
        self.time_spent = self.time_spent.saturating_add(seconds);
        self.last_accessed = Utc::now();
    }

    /// Marks the lesson completed, keeping the best score seen.
    pub fn complete(&mut self, score: Option<u8>) {
        self.completion_status = CompletionStatus::Completed;
        self.score = match (self.score, score) {
            (Some(old), Some(new)) => Some(old.max(new)),
            (old, new) => new.or(old),
        };
        self.last_accessed = Utc::now();
    }
}

impl LocalStore {
    /// Writes the progress record and queues it for sync in one transaction.
    pub fn save_progress(&self, progress: &Progress) -> Result<i64> {
        let value = serde_json::to_value(progress)?;
        let (_, seq) =
            self.put_and_enqueue(Collection::Progress, &value, SyncKind::Progress, &value)?;
        Ok(seq)
    }

    /// All progress rows of one user.
    pub fn get_progress(&self, user_id: &str) -> Result<Vec<Progress>> {
        self.get_records_by_index("userId", user_id)
    }

    pub fn get_lesson_progress(&self, user_id: &str, lesson_id: &str) -> Result<Option<Progress>> {
        self.get_record((user_id, lesson_id))
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
