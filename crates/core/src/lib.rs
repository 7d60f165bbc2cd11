// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! satchel-core: offline-first storage, sync, and live events for the
//! satchel learning client.
//!
//! Everything a learner does is written to the [`LocalStore`] first. Changes
//! that must reach the server are queued in the same transaction and drained
//! by a [`SyncService`] whenever connectivity allows. Live activity events
//! flow through a [`RealtimeHub`], optionally relayed to sibling tabs over an
//! [`OriginChannel`].

pub mod auth;
pub mod channel;
pub mod error;
pub mod lesson;
pub mod progress;
pub mod protocol;
pub mod queue;
pub mod realtime;
pub mod remote;
pub mod schema;
pub mod store;
pub mod sync;
pub mod user;

pub use auth::{AuthService, ProfileUpdate, SignupData};
pub use channel::OriginChannel;
pub use error::{Error, Result};
pub use lesson::{Difficulty, Lesson, LessonContent, Localized, Quiz, QuizQuestion, QuizResult};
pub use progress::{CompletionStatus, Progress};
pub use protocol::{ClientMessage, ServerMessage};
pub use queue::{SyncEntry, SyncKind};
pub use realtime::{RealtimeEvent, RealtimeHub, SubscriptionId};
pub use remote::{Remote, RemoteError, RemoteResult};
pub use schema::Collection;
pub use store::{Key, LocalStore, QueueObserverId, Record, StoreLocation};
pub use sync::{DrainMode, SyncConfig, SyncReport, SyncService, SyncState, SyncStatus};
pub use user::{normalize_email, Language, ProgressSummary, Role, User};
