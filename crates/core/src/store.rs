// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local record store.
//!
//! [`LocalStore`] is a cheaply cloneable handle over one connection. Records
//! are JSON objects with camelCase fields; the collection's key path and
//! index paths are read out of the record on every [`LocalStore::put`].

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{run_migrations, Collection, CollectionSchema, KeyPath};

/// Well-known keys of the scalar key-value area.
pub mod keys {
    /// Snapshot of the signed-in user, password stripped.
    pub const CURRENT_USER: &str = "current_user";
    /// Language selected for the interface.
    pub const UI_LANGUAGE: &str = "ui_language";
    /// RFC 3339 timestamp of the last successful drain.
    pub const LAST_SYNC: &str = "last_sync";
}

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A SQLite file; parent directories are created on open.
    Path(PathBuf),
    /// A private in-memory database. Contents are lost on [`LocalStore::close`].
    Memory,
}

/// Primary key of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Text(String),
    Composite(Vec<String>),
    Seq(i64),
}

impl Key {
    fn to_sql(&self) -> SqlValue {
        match self {
            Key::Text(s) => SqlValue::Text(s.clone()),
            Key::Composite(parts) => SqlValue::Text(Value::from(parts.clone()).to_string()),
            Key::Seq(n) => SqlValue::Integer(*n),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Seq(n)
    }
}

impl From<(&str, &str)> for Key {
    fn from((a, b): (&str, &str)) -> Self {
        Key::Composite(vec![a.to_string(), b.to_string()])
    }
}

/// A typed record stored in a fixed collection.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

/// Handle returned by [`LocalStore::observe_queue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueObserverId(u64);

type QueueObserver = Arc<dyn Fn(usize) + Send + Sync>;

/// Handle to the local store.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    location: StoreLocation,
    conn: Mutex<Option<Connection>>,
    queue_observers: Mutex<Vec<(QueueObserverId, QueueObserver)>>,
    next_observer: AtomicU64,
}

impl LocalStore {
    /// Creates an unopened handle. The first operation opens it.
    pub fn new(location: StoreLocation) -> Self {
        LocalStore {
            inner: Arc::new(StoreInner {
                location,
                conn: Mutex::new(None),
                queue_observers: Mutex::new(Vec::new()),
                next_observer: AtomicU64::new(1),
            }),
        }
    }

    /// Opens a file-backed store, creating and migrating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = LocalStore::new(StoreLocation::Path(path.as_ref().to_path_buf()));
        store.initialize()?;
        Ok(store)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let store = LocalStore::new(StoreLocation::Memory);
        store.initialize()?;
        Ok(store)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.inner.location
    }

    /// Opens the backing database if it is not open yet.
    ///
    /// Idempotent: later calls reuse the open connection.
    pub fn initialize(&self) -> Result<()> {
        self.with_conn(|_| Ok(()))
    }

    /// Returns true while a connection is held.
    pub fn is_open(&self) -> bool {
        self.inner
            .conn
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Releases the connection. The next operation reopens it.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.inner.conn.lock().map_err(|_| Error::LockPoisoned)?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| Error::StorageIo(e))?;
            debug!("closed store at {:?}", self.inner.location);
        }
        Ok(())
    }

    /// Runs `f` against the connection, opening it first if needed.
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.conn.lock().map_err(|_| Error::LockPoisoned)?;
        if guard.is_none() {
            *guard = Some(connect(&self.inner.location)?);
        }
        match guard.as_mut() {
            Some(conn) => f(conn),
            None => Err(Error::StorageUnavailable("connection not open".to_string())),
        }
    }

    /// Like [`with_conn`](Self::with_conn) for writes that change the sync
    /// queue: observers get the new queue length once the connection is
    /// released.
    pub(crate) fn with_queue_write<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let (out, pending) = self.with_conn(|conn| {
            let out = f(conn)?;
            Ok((out, count_queue(conn)?))
        })?;
        self.notify_queue(pending);
        Ok(out)
    }

    fn write<T>(
        &self,
        collection: Collection,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        if collection == Collection::SyncQueue {
            self.with_queue_write(f)
        } else {
            self.with_conn(f)
        }
    }

    /// Calls `observer` with the queue length after every write that
    /// touches the sync queue.
    pub fn observe_queue(
        &self,
        observer: impl Fn(usize) + Send + Sync + 'static,
    ) -> QueueObserverId {
        let id = QueueObserverId(self.inner.next_observer.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut observers) = self.inner.queue_observers.lock() {
            observers.push((id, Arc::new(observer)));
        }
        id
    }

    pub fn unobserve_queue(&self, id: QueueObserverId) {
        if let Ok(mut observers) = self.inner.queue_observers.lock() {
            observers.retain(|(oid, _)| *oid != id);
        }
    }

    fn notify_queue(&self, pending: usize) {
        let observers: Vec<QueueObserver> = match self.inner.queue_observers.lock() {
            Ok(observers) => observers.iter().map(|(_, o)| Arc::clone(o)).collect(),
            Err(_) => return,
        };
        for observer in observers {
            observer(pending);
        }
    }

    /// Inserts or wholly replaces the record with the same primary key.
    pub fn put(&self, collection: Collection, record: &Value) -> Result<Key> {
        self.write(collection, |conn| put_row(conn, collection, record))
    }

    /// Fetches one record. Absence is `Ok(None)`.
    pub fn get(&self, collection: Collection, key: impl Into<Key>) -> Result<Option<Value>> {
        let key = key.into();
        self.with_conn(|conn| {
            let table = collection.schema().table;
            let row: Option<(SqlValue, String)> = conn
                .query_row(
                    &format!("SELECT key, body FROM {table} WHERE key = ?1"),
                    params![key.to_sql()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            row.map(|(key, body)| decode_row(collection, &key, &body))
                .transpose()
        })
    }

    /// Every record in the collection, in insertion order.
    pub fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        self.with_conn(|conn| select_rows(conn, collection, "", None))
    }

    /// Every record whose indexed attribute equals `value`, in insertion order.
    pub fn get_all_by_index(
        &self,
        collection: Collection,
        index: &str,
        value: &str,
    ) -> Result<Vec<Value>> {
        let index = collection.schema().index(index)?;
        self.with_conn(|conn| {
            let filter = format!(" WHERE {} = ?1", index.column);
            select_rows(conn, collection, &filter, Some(value))
        })
    }

    /// Deletes one record. Returns whether it existed.
    pub fn delete(&self, collection: Collection, key: impl Into<Key>) -> Result<bool> {
        let key = key.into();
        self.write(collection, |conn| {
            let table = collection.schema().table;
            let n = conn.execute(
                &format!("DELETE FROM {table} WHERE key = ?1"),
                params![key.to_sql()],
            )?;
            Ok(n > 0)
        })
    }

    /// Removes every record of the collection. Returns how many were removed.
    pub fn clear(&self, collection: Collection) -> Result<usize> {
        self.write(collection, |conn| {
            let table = collection.schema().table;
            let n = conn.execute(&format!("DELETE FROM {table}"), [])?;
            debug!("cleared {n} records from {collection}");
            Ok(n)
        })
    }

    pub fn put_record<R: Record>(&self, record: &R) -> Result<Key> {
        self.put(R::COLLECTION, &serde_json::to_value(record)?)
    }

    pub fn get_record<R: Record>(&self, key: impl Into<Key>) -> Result<Option<R>> {
        self.get(R::COLLECTION, key)?
            .map(|v| from_record(R::COLLECTION, v))
            .transpose()
    }

    pub fn get_all_records<R: Record>(&self) -> Result<Vec<R>> {
        self.get_all(R::COLLECTION)?
            .into_iter()
            .map(|v| from_record(R::COLLECTION, v))
            .collect()
    }

    pub fn get_records_by_index<R: Record>(&self, index: &str, value: &str) -> Result<Vec<R>> {
        self.get_all_by_index(R::COLLECTION, index, value)?
            .into_iter()
            .map(|v| from_record(R::COLLECTION, v))
            .collect()
    }

    /// Reads an auxiliary scalar value.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?)
        })
    }

    /// Writes an auxiliary scalar value.
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
    }

    /// Removes an auxiliary scalar value. Returns whether it existed.
    pub fn remove_value(&self, key: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(n > 0)
        })
    }
}

pub(crate) fn count_queue(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM sync_queue", [], |row| row.get(0))?;
    Ok(usize::try_from(n).unwrap_or(0))
}

fn connect(location: &StoreLocation) -> Result<Connection> {
    let conn = match location {
        StoreLocation::Path(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        Error::StorageUnavailable(format!("{}: {e}", parent.display()))
                    })?;
                }
            }
            let conn = Connection::open(path)
                .map_err(|e| Error::StorageUnavailable(format!("{}: {e}", path.display())))?;
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            conn
        }
        StoreLocation::Memory => Connection::open_in_memory()
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?,
    };
    run_migrations(&conn)?;
    debug!("opened store at {location:?}");
    Ok(conn)
}

/// Upsert one record on an open connection or transaction.
pub(crate) fn put_row(conn: &Connection, collection: Collection, record: &Value) -> Result<Key> {
    let schema = collection.schema();
    let obj = record
        .as_object()
        .ok_or_else(|| Error::Schema(format!("{collection} records must be JSON objects")))?;
    let key = extract_key(collection, schema, obj)?;

    let mut body = obj.clone();
    if let KeyPath::AutoIncrement(field) = schema.key_path {
        body.remove(field);
    }

    let mut columns: Vec<&str> = Vec::new();
    let mut values: Vec<SqlValue> = Vec::new();
    if let Some(ref key) = key {
        columns.push("key");
        values.push(key.to_sql());
    }
    for index in schema.indexes {
        columns.push(index.column);
        values.push(index_value(obj, index.name));
    }
    columns.push("body");
    values.push(SqlValue::Text(Value::Object(body).to_string()));

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let updates: Vec<String> = columns
        .iter()
        .filter(|c| **c != "key")
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(key) DO UPDATE SET {}",
        schema.table,
        columns.join(", "),
        placeholders.join(", "),
        updates.join(", "),
    );
    conn.execute(&sql, rusqlite::params_from_iter(values))
        .map_err(map_write_err)?;

    let key = key.unwrap_or_else(|| Key::Seq(conn.last_insert_rowid()));
    debug!("put {collection} {key:?}");
    Ok(key)
}

fn extract_key(
    collection: Collection,
    schema: &CollectionSchema,
    obj: &Map<String, Value>,
) -> Result<Option<Key>> {
    let text_field = |field: &str| {
        obj.get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Schema(format!("{collection} record is missing key '{field}'")))
    };
    match schema.key_path {
        KeyPath::Field(field) => text_field(field).map(|k| Some(Key::Text(k))),
        KeyPath::Composite(fields) => fields
            .iter()
            .map(|f| text_field(f))
            .collect::<Result<Vec<_>>>()
            .map(|parts| Some(Key::Composite(parts))),
        KeyPath::AutoIncrement(field) => Ok(obj.get(field).and_then(Value::as_i64).map(Key::Seq)),
    }
}

fn index_value(obj: &Map<String, Value>, field: &str) -> SqlValue {
    match obj.get(field) {
        Some(Value::String(s)) => SqlValue::Text(s.clone()),
        Some(Value::Number(n)) => SqlValue::Text(n.to_string()),
        Some(Value::Bool(b)) => SqlValue::Text(b.to_string()),
        _ => SqlValue::Null,
    }
}

fn select_rows(
    conn: &Connection,
    collection: Collection,
    filter: &str,
    value: Option<&str>,
) -> Result<Vec<Value>> {
    let sql = format!(
        "SELECT key, body FROM {}{filter} ORDER BY rowid",
        collection.schema().table
    );
    let mut stmt = conn.prepare(&sql)?;
    let map = |row: &rusqlite::Row<'_>| Ok((row.get::<_, SqlValue>(0)?, row.get::<_, String>(1)?));
    let rows = match value {
        Some(v) => stmt
            .query_map(params![v], map)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => stmt
            .query_map([], map)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };
    rows.iter()
        .map(|(key, body)| decode_row(collection, key, body))
        .collect()
}

fn decode_row(collection: Collection, key: &SqlValue, body: &str) -> Result<Value> {
    let mut value: Value = serde_json::from_str(body)
        .map_err(|e| Error::CorruptedData(format!("{collection} record: {e}")))?;
    if let (KeyPath::AutoIncrement(field), SqlValue::Integer(seq), Some(obj)) =
        (collection.schema().key_path, key, value.as_object_mut())
    {
        obj.insert(field.to_string(), Value::from(*seq));
    }
    Ok(value)
}

fn from_record<R: DeserializeOwned>(collection: Collection, value: Value) -> Result<R> {
    serde_json::from_value(value)
        .map_err(|e| Error::CorruptedData(format!("{collection} record: {e}")))
}

/// Map unique-index failures to [`Error::Constraint`].
fn map_write_err(err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(ref e, ref msg) if e.code == ErrorCode::ConstraintViolation => {
            Error::Constraint(msg.clone().unwrap_or_else(|| e.to_string()))
        }
        other => Error::StorageIo(other),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
