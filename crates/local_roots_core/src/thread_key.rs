//! crates/local_roots_core/src/thread_key.rs
//!
//! Deterministic thread-identifier derivation. Thread continuity (unread
//! counts, message history) depends on every caller deriving the same
//! key for the same logical conversation, so this must stay a pure
//! function of its arguments.

/// Derives the thread identifier for a conversation.
///
/// Precedence, most specific first:
/// 1. seller + buyer + product — per-product conversation
/// 2. seller + buyer — general inbox between two parties
/// 3. seller + product — pre-authentication product inquiry
/// 4. seller alone — seller's general inbox
///
/// The seller+product form carries a `product` marker segment so it can
/// never collide with a seller+buyer key for the same seller.
pub fn thread_key(seller_id: &str, buyer_id: Option<&str>, product_id: Option<&str>) -> String {
    match (buyer_id, product_id) {
        (Some(buyer), Some(product)) => format!("{seller_id}__{buyer}__{product}"),
        (Some(buyer), None) => format!("{seller_id}__{buyer}"),
        (None, Some(product)) => format!("{seller_id}__product__{product}"),
        (None, None) => seller_id.to_string(),
    }
}
