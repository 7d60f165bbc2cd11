// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync service: drains the outbound queue into a [`Remote`].
//!
//! The service is in one of three states, derived from its [`SyncStatus`]:
//!
//! - `Offline`: no connectivity; sync requests are refused
//! - `Idle`: online, nothing running
//! - `Syncing`: a drain is in flight; further requests get [`Error::SyncBusy`]
//!
//! Coming back online schedules a drain after [`SyncConfig::debounce`]. A
//! connectivity change inside that window cancels the pending drain, so a
//! flapping link drains once after it settles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::remote::Remote;
use crate::store::{keys, LocalStore, QueueObserverId};

/// How a successful drain removes entries from the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainMode {
    /// Remove the whole batch only after every entry was accepted.
    /// Any failure leaves the queue untouched.
    #[default]
    Atomic,
    /// Remove each entry as soon as it is accepted. A failure leaves only
    /// the unacknowledged suffix queued.
    PerEntry,
}

impl DrainMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrainMode::Atomic => "atomic",
            DrainMode::PerEntry => "per_entry",
        }
    }
}

impl fmt::Display for DrainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DrainMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "atomic" => Ok(DrainMode::Atomic),
            "per_entry" => Ok(DrainMode::PerEntry),
            _ => Err(Error::InvalidValue {
                kind: "drain mode",
                value: s.to_string(),
                valid: "atomic, per_entry",
            }),
        }
    }
}

/// Configuration for the sync service.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay between regaining connectivity and the automatic drain.
    pub debounce: Duration,
    pub drain_mode: DrainMode,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            debounce: Duration::from_millis(1000),
            drain_mode: DrainMode::Atomic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Offline,
    Idle,
    Syncing,
}

/// Observable sync status. Never persisted as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_online: bool,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub pending_changes: usize,
    pub sync_in_progress: bool,
}

impl SyncStatus {
    pub fn state(&self) -> SyncState {
        if !self.is_online {
            SyncState::Offline
        } else if self.sync_in_progress {
            SyncState::Syncing
        } else {
            SyncState::Idle
        }
    }
}

/// Outcome of one successful drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries the remote accepted in this drain.
    pub submitted: usize,
    /// Entries still queued afterwards (enqueued while draining).
    pub remaining: usize,
}

/// Handle returned by [`SyncService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&SyncStatus) + Send + Sync>;

pub struct SyncService<R: Remote> {
    inner: Arc<Inner<R>>,
}

impl<R: Remote> Clone for SyncService<R> {
    fn clone(&self) -> Self {
        SyncService {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<R> {
    store: LocalStore,
    remote: tokio::sync::Mutex<R>,
    config: SyncConfig,
    status: Mutex<SyncStatus>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    /// Bumped on every connectivity change; a scheduled drain only runs if
    /// the epoch it was scheduled in is still current.
    epoch: AtomicU64,
    queue_observer: QueueObserverId,
}

impl<R> Drop for Inner<R> {
    fn drop(&mut self) {
        self.store.unobserve_queue(self.queue_observer);
    }
}

impl<R: Remote + 'static> SyncService<R> {
    /// Creates a service that starts out offline and follows the queue
    /// length of `store`.
    pub fn new(store: LocalStore, remote: R, config: SyncConfig) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<Inner<R>>| {
            let weak = weak.clone();
            let queue_observer = store.observe_queue(move |pending| {
                let Some(inner) = weak.upgrade() else { return };
                let service = SyncService { inner };
                if let Err(e) = service.update(|s| s.pending_changes = pending) {
                    warn!("failed to apply queue length {pending}: {e}");
                }
            });
            Inner {
                store,
                remote: tokio::sync::Mutex::new(remote),
                config,
                status: Mutex::new(SyncStatus::default()),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                epoch: AtomicU64::new(0),
                queue_observer,
            }
        });
        SyncService { inner }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Loads the persisted last-sync time and the current queue length.
    pub fn load(&self) -> Result<()> {
        let last_sync = self
            .inner
            .store
            .get_value(keys::LAST_SYNC)?
            .and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    warn!("ignoring unreadable last sync time '{raw}': {e}");
                    None
                }
            });
        let pending = self.inner.store.pending_count()?;
        self.update(|s| {
            s.last_sync_time = last_sync;
            s.pending_changes = pending;
        })
    }

    /// Loads persisted state and, when `online`, drains right away.
    ///
    /// Returns `None` when started offline.
    pub async fn start(&self, online: bool) -> Result<Option<SyncReport>> {
        self.load()?;
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.update(|s| s.is_online = online)?;
        if !online {
            return Ok(None);
        }
        self.force_sync().await.map(Some)
    }

    /// Follows a connectivity signal until its sender is dropped.
    pub async fn run(&self, mut connectivity: watch::Receiver<bool>) {
        let online = *connectivity.borrow_and_update();
        self.log_connectivity(self.set_online(online));
        while connectivity.changed().await.is_ok() {
            let online = *connectivity.borrow_and_update();
            self.log_connectivity(self.set_online(online));
        }
        debug!("connectivity signal closed");
    }

    fn log_connectivity(&self, result: Result<()>) {
        if let Err(e) = result {
            warn!("failed to apply connectivity change: {e}");
        }
    }

    /// Applies a connectivity change. Regaining connectivity schedules a
    /// debounced drain.
    pub fn set_online(&self, online: bool) -> Result<()> {
        let changed = self.update(|s| {
            let changed = s.is_online != online;
            s.is_online = online;
            changed
        })?;
        if !changed {
            return Ok(());
        }

        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        if online {
            info!("connectivity restored");
            self.schedule_drain(epoch);
        } else {
            info!("connectivity lost");
        }
        Ok(())
    }

    fn schedule_drain(&self, epoch: u64) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!("no async runtime, automatic drain skipped");
                return;
            }
        };
        let service = self.clone();
        let delay = self.inner.config.debounce;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if service.inner.epoch.load(Ordering::SeqCst) != epoch {
                debug!("connectivity changed during debounce, drain cancelled");
                return;
            }
            match service.force_sync().await {
                Ok(report) => debug!("automatic drain submitted {}", report.submitted),
                Err(Error::SyncBusy) | Err(Error::Offline) => {}
                Err(e) => warn!("automatic drain failed: {e}"),
            }
        });
    }

    /// Drains the queue now.
    ///
    /// Refused with [`Error::Offline`] or [`Error::SyncBusy`]; a failed
    /// submission yields [`Error::SyncDrainFailure`].
    pub async fn force_sync(&self) -> Result<SyncReport> {
        self.update(|s| {
            if !s.is_online {
                Err(Error::Offline)
            } else if s.sync_in_progress {
                Err(Error::SyncBusy)
            } else {
                s.sync_in_progress = true;
                Ok(())
            }
        })??;

        let outcome = self.drain().await;

        let pending = match self.inner.store.pending_count() {
            Ok(pending) => Some(pending),
            Err(e) => {
                warn!("failed to read queue length after drain: {e}");
                None
            }
        };
        self.update(|s| {
            s.sync_in_progress = false;
            if let Some(pending) = pending {
                s.pending_changes = pending;
            }
        })?;
        outcome
    }

    async fn drain(&self) -> Result<SyncReport> {
        let store = &self.inner.store;
        let batch = store.sync_queue()?;
        if batch.is_empty() {
            self.mark_synced()?;
            return Ok(SyncReport {
                submitted: 0,
                remaining: 0,
            });
        }

        info!("draining {} queued changes", batch.len());
        let mode = self.inner.config.drain_mode;
        let mut remote = self.inner.remote.lock().await;
        let mut submitted = 0;
        for entry in &batch {
            if let Err(e) = remote.submit(entry).await {
                let cause = Error::RemoteSubmission {
                    seq: entry.seq,
                    reason: e.to_string(),
                };
                warn!("{cause}, {submitted} of {} accepted", batch.len());
                return Err(Error::SyncDrainFailure {
                    failed_seq: entry.seq,
                    reason: e.to_string(),
                });
            }
            submitted += 1;
            if mode == DrainMode::PerEntry {
                store.remove_sync_entry(entry.seq)?;
            }
        }
        drop(remote);

        if mode == DrainMode::Atomic {
            if let Some(last) = batch.last() {
                store.remove_sync_entries_through(last.seq)?;
            }
        }
        self.mark_synced()?;

        let remaining = store.pending_count()?;
        info!("sync complete, {submitted} submitted");
        Ok(SyncReport {
            submitted,
            remaining,
        })
    }

    fn mark_synced(&self) -> Result<()> {
        let now = Utc::now();
        self.inner
            .store
            .set_value(keys::LAST_SYNC, &now.to_rfc3339())?;
        self.update(|s| s.last_sync_time = Some(now))
    }

    /// Re-reads the queue length, e.g. after another process wrote the
    /// same database file.
    pub fn refresh_pending(&self) -> Result<usize> {
        let pending = self.inner.store.pending_count()?;
        self.update(|s| s.pending_changes = pending)?;
        Ok(pending)
    }

    pub fn status(&self) -> SyncStatus {
        self.inner
            .status
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn state(&self) -> SyncState {
        self.status().state()
    }

    /// Registers a listener called synchronously on every status change.
    pub fn subscribe(&self, listener: impl Fn(&SyncStatus) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        id
    }

    /// Removes a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.retain(|(lid, _)| *lid != id);
        }
    }

    /// Mutates the status and notifies listeners if anything changed.
    fn update<T>(&self, f: impl FnOnce(&mut SyncStatus) -> T) -> Result<T> {
        let (out, changed) = {
            let mut status = self.inner.status.lock().map_err(|_| Error::LockPoisoned)?;
            let before = status.clone();
            let out = f(&mut status);
            let changed = (*status != before).then(|| status.clone());
            (out, changed)
        };
        if let Some(snapshot) = changed {
            self.notify(&snapshot);
        }
        Ok(out)
    }

    fn notify(&self, status: &SyncStatus) {
        let listeners: Vec<(ListenerId, Listener)> = match self.inner.listeners.lock() {
            Ok(listeners) => listeners.clone(),
            Err(_) => return,
        };
        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(status))).is_err() {
                warn!("sync status listener {id:?} panicked");
            }
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
