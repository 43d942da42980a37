//! services/client/src/adapters/notify.rs
//!
//! This module contains the in-process change notifier, the stand-in for
//! the browser's cross-tab event dispatch. It implements the
//! `ChangeNotifier` port from the `core` crate over a tokio broadcast
//! channel: other components hold receivers and refetch from storage
//! when an event arrives.

use tokio::sync::broadcast;

use local_roots_core::events::Event;
use local_roots_core::ports::ChangeNotifier;

/// A `ChangeNotifier` that fans events out to any number of in-process
/// receivers. Delivery is at-most-once with no replay; a receiver that
/// lags far enough behind simply misses events.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Event>,
}

impl BroadcastNotifier {
    /// `capacity` bounds how many undelivered events a slow receiver may
    /// buffer before it starts missing them.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// A new receiver for events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn notify(&self, event: &Event) {
        // A send error only means no receiver is currently listening.
        let _ = self.sender.send(event.clone());
    }
}
