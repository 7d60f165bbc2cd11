// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Wraps the received-entry log for shared access across connections.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use satchel_core::{Result, SyncEntry};

use crate::received::{Received, ReceivedLog};

const RECEIVED_FILE_NAME: &str = "received.jsonl";

#[derive(Clone)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

struct ServerStateInner {
    log: Mutex<ReceivedLog>,
}

impl ServerState {
    /// Opens (or creates) `received.jsonl` in `data_dir`.
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let log = ReceivedLog::open(data_dir.join(RECEIVED_FILE_NAME))?;
        info!("{} entries already received", log.len());
        Ok(ServerState {
            inner: Arc::new(ServerStateInner {
                log: Mutex::new(log),
            }),
        })
    }

    /// Records an entry from `client_id`.
    ///
    /// Returns Ok(true) if it was new, Ok(false) if it was a re-delivery.
    pub async fn accept(&self, client_id: &str, entry: &SyncEntry) -> Result<bool> {
        let mut log = self.inner.log.lock().await;
        log.append(client_id, entry)
    }

    pub async fn received_count(&self) -> usize {
        self.inner.log.lock().await.len()
    }

    pub async fn received(&self) -> Result<Vec<Received>> {
        self.inner.log.lock().await.all()
    }
}
