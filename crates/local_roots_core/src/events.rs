//! crates/local_roots_core/src/events.rs
//!
//! In-process publish/subscribe used to refresh listeners after store
//! writes. Delivery is synchronous, in subscription order, with no
//! replay for late subscribers. An optional [`ChangeNotifier`] fans each
//! event out to other contexts after local delivery.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ports::ChangeNotifier;

/// The kinds of change events the stores emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MessageSent,
    OrdersChanged,
}

/// A change notification. `data` carries the event-specific payload
/// (the sent message and its thread for [`EventKind::MessageSent`],
/// nothing for [`EventKind::OrdersChanged`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventKind, data: Value) -> Self {
        Self {
            kind,
            data,
            timestamp: Utc::now(),
        }
    }
}

type Callback = Arc<dyn Fn(&Event) + Send + Sync>;

struct Inner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<EventKind, Vec<(u64, Callback)>>>,
    notifier: Option<Arc<dyn ChangeNotifier>>,
}

/// The event bus shared by the stores. Cheap to clone; clones share the
/// same subscriber registry.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A bus that additionally forwards every emitted event to `notifier`
    /// after local delivery.
    pub fn with_notifier(notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self::build(Some(notifier))
    }

    fn build(notifier: Option<Arc<dyn ChangeNotifier>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(0),
                subscribers: Mutex::new(HashMap::new()),
                notifier,
            }),
        }
    }

    /// Registers `callback` for events of `kind`. The returned handle
    /// unsubscribes when dropped (or explicitly via
    /// [`Subscription::unsubscribe`]).
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            subscribers
                .entry(kind)
                .or_default()
                .push((id, Arc::new(callback)));
        }
        Subscription {
            inner: self.inner.clone(),
            kind,
            id,
            active: true,
        }
    }

    /// Delivers `event` to every subscriber of its kind, in subscription
    /// order, then forwards it to the cross-context notifier if one is
    /// configured.
    pub fn emit(&self, event: Event) {
        tracing::trace!(kind = ?event.kind, "emitting event");
        // Snapshot the callbacks so a subscriber may subscribe or
        // unsubscribe on this same bus without deadlocking.
        let callbacks: Vec<Callback> = match self.inner.subscribers.lock() {
            Ok(subscribers) => subscribers
                .get(&event.kind)
                .map(|list| list.iter().map(|(_, cb)| cb.clone()).collect())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        for callback in callbacks {
            callback(&event);
        }
        if let Some(notifier) = &self.inner.notifier {
            notifier.notify(&event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to an active subscription.
pub struct Subscription {
    inner: Arc<Inner>,
    kind: EventKind,
    id: u64,
    active: bool,
}

impl Subscription {
    /// Removes the subscription. Further emits will not reach the
    /// callback.
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            if let Some(list) = subscribers.get_mut(&self.kind) {
                list.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}
