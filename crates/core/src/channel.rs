// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Same-origin broadcast between tabs of one session.
//!
//! An [`OriginChannel`] is cloned into every tab of an origin. Frames are
//! best-effort: a tab that falls more than [`CHANNEL_CAPACITY`] frames behind
//! loses the oldest ones, and nothing is kept for tabs opened later.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

pub const CHANNEL_CAPACITY: usize = 1024;

static NEXT_TAB: AtomicU64 = AtomicU64::new(1);

/// Identity of one tab within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(u64);

impl TabId {
    /// A tab id no other tab in this process has.
    pub fn fresh() -> Self {
        TabId(NEXT_TAB.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// One relayed message: a serialized event and the tab that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayFrame {
    pub sender: TabId,
    pub body: String,
}

#[derive(Clone)]
pub struct OriginChannel {
    origin: Arc<str>,
    tx: broadcast::Sender<RelayFrame>,
}

impl OriginChannel {
    pub fn new(origin: &str) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        OriginChannel {
            origin: Arc::from(origin),
            tx,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Sends a frame to every listening tab, the sender's own included.
    ///
    /// Returns how many listeners it reached; zero is not an error.
    pub fn post(&self, frame: RelayFrame) -> usize {
        let reached = self.tx.send(frame).unwrap_or(0);
        trace!("posted frame on {} to {reached} listeners", self.origin);
        reached
    }

    pub fn listen(&self) -> broadcast::Receiver<RelayFrame> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl fmt::Debug for OriginChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginChannel")
            .field("origin", &self.origin)
            .field("listeners", &self.tx.receiver_count())
            .finish()
    }
}
