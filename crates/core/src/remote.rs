// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The endpoint queued changes are drained into.
//!
//! Implementations must accept the same entry more than once: a failed
//! drain re-submits entries that already went through.

use std::future::Future;
use std::pin::Pin;

use crate::queue::SyncEntry;

/// Error type for remote submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type for remote submissions.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Receives queued changes, one at a time, in queue order.
pub trait Remote: Send {
    /// Submits one entry and resolves once the remote has accepted it.
    fn submit<'a>(
        &'a mut self,
        entry: &'a SyncEntry,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + 'a>>;
}
