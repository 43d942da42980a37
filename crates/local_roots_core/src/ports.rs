//! crates/local_roots_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the client's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing
//! the core to be independent of specific external implementations like
//! the filesystem or the marketplace HTTP API.

use async_trait::async_trait;

use crate::domain::{NewOrder, Order, OrderStatus};
use crate::events::Event;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A synchronous key/value store of JSON documents, modeling a local
/// write-through storage medium.
///
/// Loads never fail: a missing key, a corrupt value, or an unavailable
/// medium all surface as `None` and the caller starts from an empty
/// collection. Saves rewrite the whole value under the key.
pub trait StorageBackend: Send + Sync {
    /// Returns the raw JSON stored under `key`, or `None` when the key
    /// is missing or the medium cannot be read.
    fn load_raw(&self, key: &str) -> Option<String>;

    /// Write-through save of raw JSON under `key`.
    fn save_raw(&self, key: &str, json: &str) -> PortResult<()>;
}

/// The remote marketplace order API.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn fetch_all(&self) -> PortResult<Vec<Order>>;

    async fn fetch_by_seller(&self, seller_id: &str) -> PortResult<Vec<Order>>;

    async fn create(&self, order: NewOrder) -> PortResult<Order>;

    async fn update_status(&self, id: &str, status: OrderStatus) -> PortResult<Order>;

    async fn delete(&self, id: &str) -> PortResult<()>;
}

/// Cross-context change notification.
///
/// Invoked after local subscriber delivery on every emit so that other
/// contexts sharing the same storage (other windows of a desktop app,
/// other in-process components) can react to writes. Delivery is
/// cooperative and at-most-once; there is no replay and no ordering
/// guarantee across contexts.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, event: &Event);
}
