//! crates/local_roots_core/src/storage.rs
//!
//! Typed collection helpers over the raw [`StorageBackend`] port, the
//! fixed storage keys, and the in-memory backend used by tests and
//! non-persistent embedders.
//!
//! Every collection lives whole under a single key: each read loads the
//! entire collection and each write rewrites it. That is a
//! simplicity-over-scale tradeoff acceptable only at small volumes.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ports::{PortError, PortResult, StorageBackend};

/// Storage key for the chat thread summaries.
pub const THREADS_KEY: &str = "local-roots-chat-threads-v2";
/// Storage key for the append-only chat message log.
pub const MESSAGES_KEY: &str = "local-roots-chat-messages-v2";
/// Storage key for the local order collection.
pub const ORDERS_KEY: &str = "local-roots-orders-v1";

// A schema change to any stored shape requires bumping the key version
// suffix; there is no migration logic for older shapes.

/// Loads the collection stored under `key`, degrading to empty on a
/// missing key or a value the current schema cannot parse.
pub fn load_vec<T: DeserializeOwned>(backend: &dyn StorageBackend, key: &str) -> Vec<T> {
    let Some(raw) = backend.load_raw(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(error) => {
            tracing::warn!(key, %error, "stored collection failed to parse, starting empty");
            Vec::new()
        }
    }
}

/// Serializes and write-through saves the collection under `key`.
pub fn save_vec<T: Serialize>(
    backend: &dyn StorageBackend,
    key: &str,
    items: &[T],
) -> PortResult<()> {
    let raw = serde_json::to_string(items).map_err(|e| PortError::Unexpected(e.to_string()))?;
    backend.save_raw(key, &raw)
}

/// A non-persistent [`StorageBackend`] over a mutexed map.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn load_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn save_raw(&self, key: &str, json: &str) -> PortResult<()> {
        self.entries
            .lock()
            .map_err(|_| PortError::Unavailable("storage mutex poisoned".to_string()))?
            .insert(key.to_string(), json.to_string());
        Ok(())
    }
}
