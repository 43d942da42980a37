//! crates/local_roots_core/src/domain.rs
//!
//! Defines the pure, core data structures for the marketplace client.
//! These structs are independent of any storage backend or transport;
//! the serde derives exist because every one of them is persisted as
//! part of a stored JSON collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of a conversation authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Buyer,
    Seller,
}

/// A single chat message.
///
/// Immutable once created, except for the `read` flag which only ever
/// transitions `false` -> `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub thread_id: String,
    pub seller_id: String,
    pub buyer_id: Option<String>,
    pub product_id: Option<String>,
    pub sender: Sender,
    pub sender_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// Per-side unread message counts for a thread.
///
/// `seller` counts buyer-authored unread messages (what the seller has
/// not seen yet), and symmetrically for `buyer`. Both are derived values
/// recomputed from the message log, never hand-edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub seller: u64,
    pub buyer: u64,
}

/// Cached summary of a message stream.
///
/// `id` is always the key produced by [`crate::thread_key::thread_key`]
/// from `(seller_id, buyer_id, product_id)`, so the same logical
/// conversation always maps to the same thread record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatThread {
    pub id: String,
    pub seller_id: String,
    pub buyer_id: Option<String>,
    pub seller_name: String,
    pub buyer_name: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub unread: UnreadCount,
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Returns true if transitioning from self to `next` is valid.
    ///
    /// The graph is forward-only: pending -> processing -> shipped ->
    /// delivered, with cancellation reachable from pending and
    /// processing. Delivered and cancelled are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
        )
    }
}

/// One line item in an order. `price` is the unit price in the smallest
/// currency unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: u64,
    pub quantity: u32,
}

/// An order placed by a buyer against a single seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub seller_id: String,
    pub total: u64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an order. The remote API (or the local fallback
/// store) assigns `id`, `status` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub buyer_name: String,
    pub buyer_email: String,
    pub seller_id: String,
    pub total: u64,
    pub items: Vec<OrderItem>,
}
