// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Collection layout for the local store.
//!
//! Every collection maps to one SQLite table holding the record as a JSON
//! `body` plus one column per primary key and secondary index. Index columns
//! are materialized on write so lookups never parse JSON.

use rusqlite::Connection;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Version stamped into `PRAGMA user_version` once the schema is in place.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL schema for the local store.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    key TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    body TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lessons (
    key TEXT PRIMARY KEY,
    category TEXT,
    language TEXT,
    body TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quizzes (
    key TEXT PRIMARY KEY,
    lesson_id TEXT,
    body TEXT NOT NULL
);

-- One row per (user, lesson); the key is the JSON array [userId, lessonId]
CREATE TABLE IF NOT EXISTS progress (
    key TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    lesson_id TEXT NOT NULL,
    body TEXT NOT NULL
);

-- Pending outbound changes, drained in seq order
CREATE TABLE IF NOT EXISTS sync_queue (
    key INTEGER PRIMARY KEY AUTOINCREMENT,
    body TEXT NOT NULL
);

-- Auxiliary scalar values (current user, UI language, last sync)
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_lessons_category ON lessons(category);
CREATE INDEX IF NOT EXISTS idx_lessons_language ON lessons(language);
CREATE INDEX IF NOT EXISTS idx_quizzes_lesson ON quizzes(lesson_id);
CREATE INDEX IF NOT EXISTS idx_progress_user ON progress(user_id);
CREATE INDEX IF NOT EXISTS idx_progress_lesson ON progress(lesson_id);
"#;

/// A named record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Lessons,
    Quizzes,
    Progress,
    SyncQueue,
}

impl Collection {
    /// All collections, in creation order.
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Lessons,
        Collection::Quizzes,
        Collection::Progress,
        Collection::SyncQueue,
    ];

    /// Returns the collection name as consumers spell it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Lessons => "lessons",
            Collection::Quizzes => "quizzes",
            Collection::Progress => "progress",
            Collection::SyncQueue => "syncQueue",
        }
    }

    /// Returns the table layout for this collection.
    pub fn schema(&self) -> &'static CollectionSchema {
        match self {
            Collection::Users => &USERS,
            Collection::Lessons => &LESSONS,
            Collection::Quizzes => &QUIZZES,
            Collection::Progress => &PROGRESS,
            Collection::SyncQueue => &SYNC_QUEUE,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::Schema(format!("unknown collection '{s}'")))
    }
}

/// How a collection derives the primary key of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPath {
    /// A single string field of the record.
    Field(&'static str),
    /// Several string fields, stored together as a JSON array.
    Composite(&'static [&'static str]),
    /// A store-assigned increasing integer, exposed under the given field.
    AutoIncrement(&'static str),
}

/// A secondary index over one record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSchema {
    /// Index name, which is also the record field it reads.
    pub name: &'static str,
    /// Column holding the materialized value.
    pub column: &'static str,
    pub unique: bool,
}

/// Table layout of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSchema {
    pub table: &'static str,
    pub key_path: KeyPath,
    pub indexes: &'static [IndexSchema],
}

impl CollectionSchema {
    /// Looks up an index by name.
    pub fn index(&self, name: &str) -> Result<&'static IndexSchema> {
        self.indexes
            .iter()
            .find(|idx| idx.name == name)
            .ok_or_else(|| Error::Schema(format!("unknown index '{name}' on '{}'", self.table)))
    }
}

const USERS: CollectionSchema = CollectionSchema {
    table: "users",
    key_path: KeyPath::Field("id"),
    indexes: &[IndexSchema {
        name: "email",
        column: "email",
        unique: true,
    }],
};

const LESSONS: CollectionSchema = CollectionSchema {
    table: "lessons",
    key_path: KeyPath::Field("id"),
    indexes: &[
        IndexSchema {
            name: "category",
            column: "category",
            unique: false,
        },
        IndexSchema {
            name: "language",
            column: "language",
            unique: false,
        },
    ],
};

const QUIZZES: CollectionSchema = CollectionSchema {
    table: "quizzes",
    key_path: KeyPath::Field("id"),
    indexes: &[IndexSchema {
        name: "lessonId",
        column: "lesson_id",
        unique: false,
    }],
};

const PROGRESS: CollectionSchema = CollectionSchema {
    table: "progress",
    key_path: KeyPath::Composite(&["userId", "lessonId"]),
    indexes: &[
        IndexSchema {
            name: "userId",
            column: "user_id",
            unique: false,
        },
        IndexSchema {
            name: "lessonId",
            column: "lesson_id",
            unique: false,
        },
    ],
};

const SYNC_QUEUE: CollectionSchema = CollectionSchema {
    table: "sync_queue",
    key_path: KeyPath::AutoIncrement("seq"),
    indexes: &[],
};

/// Apply the schema and stamp the version.
///
/// Safe to run on every open. A database written by a newer version of the
/// schema is refused rather than downgraded.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version > SCHEMA_VERSION {
        return Err(Error::Schema(format!(
            "store was written by schema version {version}, this build supports {SCHEMA_VERSION}"
        )));
    }

    conn.execute_batch(SCHEMA)?;

    if version < SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
