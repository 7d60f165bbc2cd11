// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe for live activity events.
//!
//! Events are ephemeral: each hub keeps the most recent
//! [`HISTORY_CAPACITY`] of them in memory and nothing is persisted or
//! synced. A hub attached to an [`OriginChannel`] also relays its events to
//! the other tabs of the same origin.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::channel::{OriginChannel, RelayFrame, TabId};

pub const HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: Value,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Predicate selecting the events a subscriber or history query wants.
pub type EventFilter = dyn Fn(&RealtimeEvent) -> bool + Send + Sync;

type Callback = Arc<dyn Fn(&RealtimeEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    callback: Callback,
    filter: Option<Arc<EventFilter>>,
}

#[derive(Default)]
struct HubState {
    subscribers: Vec<Subscriber>,
    history: VecDeque<RealtimeEvent>,
    next_id: u64,
}

struct HubInner {
    tab: TabId,
    state: Mutex<HubState>,
    channel: Option<OriginChannel>,
    relay: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to one tab's event hub.
#[derive(Clone)]
pub struct RealtimeHub {
    inner: Arc<HubInner>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    /// A hub that only delivers to its own subscribers.
    pub fn new() -> Self {
        RealtimeHub {
            inner: Arc::new(HubInner {
                tab: TabId::fresh(),
                state: Mutex::new(HubState::default()),
                channel: None,
                relay: Mutex::new(None),
            }),
        }
    }

    /// A hub joined to `channel`. Must be created inside a tokio runtime
    /// for relayed events to arrive.
    pub fn with_channel(channel: OriginChannel) -> Self {
        let mut rx = channel.listen();
        let inner = Arc::new(HubInner {
            tab: TabId::fresh(),
            state: Mutex::new(HubState::default()),
            channel: Some(channel),
            relay: Mutex::new(None),
        });

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("no async runtime, {} will not receive relayed events", inner.tab);
                return RealtimeHub { inner };
            }
        };

        let weak: Weak<HubInner> = Arc::downgrade(&inner);
        let tab = inner.tab;
        let task = handle.spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(frame) if frame.sender == tab => {}
                    Ok(frame) => {
                        let Some(hub) = weak.upgrade() else { break };
                        match serde_json::from_str::<RealtimeEvent>(&frame.body) {
                            Ok(event) => hub.deliver(event),
                            Err(e) => warn!("{tab} dropped malformed frame from {}: {e}", frame.sender),
                        }
                    }
                    Err(RecvError::Lagged(n)) => warn!("{tab} lagged, {n} relayed events lost"),
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("{tab} relay stopped");
        });
        if let Ok(mut relay) = inner.relay.lock() {
            *relay = Some(task);
        }
        RealtimeHub { inner }
    }

    pub fn tab(&self) -> TabId {
        self.inner.tab
    }

    /// Stamps, records, and delivers an event, then relays it to other tabs.
    pub fn publish(
        &self,
        event_type: &str,
        payload: Value,
        user_id: Option<&str>,
    ) -> RealtimeEvent {
        let event = RealtimeEvent {
            event_type: event_type.to_string(),
            payload,
            timestamp: Utc::now().timestamp_millis(),
            user_id: user_id.map(str::to_string),
        };
        self.inner.deliver(event.clone());

        if let Some(channel) = &self.inner.channel {
            match serde_json::to_string(&event) {
                Ok(body) => {
                    channel.post(RelayFrame {
                        sender: self.inner.tab,
                        body,
                    });
                }
                Err(e) => warn!("event '{event_type}' not relayed: {e}"),
            }
        }
        event
    }

    /// Registers `callback` for every event `filter` accepts (all events
    /// when `filter` is `None`).
    pub fn subscribe(
        &self,
        callback: impl Fn(&RealtimeEvent) + Send + Sync + 'static,
        filter: Option<Box<EventFilter>>,
    ) -> SubscriptionId {
        let Ok(mut state) = self.inner.state.lock() else {
            return SubscriptionId(0);
        };
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.subscribers.push(Subscriber {
            id,
            callback: Arc::new(callback),
            filter: filter.map(Arc::from),
        });
        id
    }

    /// Subscribes to one event type.
    pub fn subscribe_to(
        &self,
        event_type: &str,
        callback: impl Fn(&RealtimeEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let wanted = event_type.to_string();
        self.subscribe(callback, Some(Box::new(move |e: &RealtimeEvent| e.event_type == wanted)))
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut state) = self.inner.state.lock() else {
            return false;
        };
        let before = state.subscribers.len();
        state.subscribers.retain(|s| s.id != id);
        state.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .map(|s| s.subscribers.len())
            .unwrap_or(0)
    }

    /// Recorded events, oldest first.
    pub fn history(&self, filter: Option<&EventFilter>) -> Vec<RealtimeEvent> {
        let Ok(state) = self.inner.state.lock() else {
            return Vec::new();
        };
        state
            .history
            .iter()
            .filter(|e| filter.is_none_or(|f| f(e)))
            .cloned()
            .collect()
    }
}

impl HubInner {
    fn deliver(&self, event: RealtimeEvent) {
        let targets: Vec<(Callback, Option<Arc<EventFilter>>)> = {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            if state.history.len() == HISTORY_CAPACITY {
                state.history.pop_front();
            }
            state.history.push_back(event.clone());
            state
                .subscribers
                .iter()
                .map(|s| (Arc::clone(&s.callback), s.filter.clone()))
                .collect()
        };

        // Filters run unlocked so they may call back into the hub.
        for (callback, filter) in targets {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                if filter.as_ref().is_none_or(|f| f(&event)) {
                    callback(&event);
                }
            }));
            if outcome.is_err() {
                warn!("subscriber panicked on '{}' event", event.event_type);
            }
        }
    }
}

impl Drop for HubInner {
    fn drop(&mut self) {
        if let Ok(mut relay) = self.relay.lock() {
            if let Some(task) = relay.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
#[path = "realtime_tests.rs"]
mod tests;
