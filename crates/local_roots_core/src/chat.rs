//! crates/local_roots_core/src/chat.rs
//!
//! The chat message store: an append-only message log plus derived
//! thread summaries, persisted through an injected [`StorageBackend`].
//! Every mutation is write-through, and sends are announced on the
//! [`EventBus`] so listening surfaces can refresh.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{ChatMessage, ChatThread, Sender, UnreadCount};
use crate::events::{Event, EventBus, EventKind};
use crate::ports::{PortError, PortResult, StorageBackend};
use crate::storage::{load_vec, save_vec, MESSAGES_KEY, THREADS_KEY};

/// Arguments for [`ChatStore::send_message`]. `thread_id` is derived by
/// the caller via [`crate::thread_key::thread_key`] from the same
/// `(seller_id, buyer_id, product_id)` triple carried here.
#[derive(Debug, Clone)]
pub struct SendMessage {
    pub thread_id: String,
    pub sender: Sender,
    pub sender_id: String,
    pub sender_name: String,
    pub seller_id: String,
    pub buyer_id: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub body: String,
}

/// Store for chat messages and thread summaries.
#[derive(Clone)]
pub struct ChatStore {
    storage: Arc<dyn StorageBackend>,
    bus: EventBus,
}

impl ChatStore {
    pub fn new(storage: Arc<dyn StorageBackend>, bus: EventBus) -> Self {
        Self { storage, bus }
    }

    /// Appends a message to its thread, upserting the thread summary and
    /// recomputing its unread counts, then emits
    /// [`EventKind::MessageSent`] with the message and updated thread.
    ///
    /// The body is trimmed; an empty trimmed body is rejected. Creation
    /// timestamps within a thread are kept strictly ascending even when
    /// the wall clock ties.
    pub fn send_message(&self, args: SendMessage) -> PortResult<ChatMessage> {
        let body = args.body.trim();
        if body.is_empty() {
            return Err(PortError::Validation(
                "message body must not be empty".to_string(),
            ));
        }

        let mut messages: Vec<ChatMessage> = load_vec(self.storage.as_ref(), MESSAGES_KEY);
        let mut threads: Vec<ChatThread> = load_vec(self.storage.as_ref(), THREADS_KEY);

        let mut created_at = Utc::now();
        if let Some(latest) = messages
            .iter()
            .filter(|m| m.thread_id == args.thread_id)
            .map(|m| m.created_at)
            .max()
        {
            if created_at <= latest {
                created_at = latest + Duration::milliseconds(1);
            }
        }

        let message = ChatMessage {
            id: Uuid::new_v4(),
            thread_id: args.thread_id.clone(),
            seller_id: args.seller_id.clone(),
            buyer_id: args.buyer_id.clone(),
            product_id: args.product_id.clone(),
            sender: args.sender,
            sender_name: args.sender_name.clone(),
            body: body.to_string(),
            created_at,
            read: false,
        };
        messages.push(message.clone());

        let index = match threads.iter().position(|t| t.id == args.thread_id) {
            Some(index) => index,
            None => {
                let (seller_name, buyer_name) = match args.sender {
                    Sender::Seller => (args.sender_name.clone(), None),
                    Sender::Buyer => (String::new(), Some(args.sender_name.clone())),
                };
                threads.push(ChatThread {
                    id: args.thread_id.clone(),
                    seller_id: args.seller_id.clone(),
                    buyer_id: args.buyer_id.clone(),
                    seller_name,
                    buyer_name,
                    product_id: args.product_id.clone(),
                    product_name: args.product_name.clone(),
                    updated_at: created_at,
                    unread: UnreadCount::default(),
                });
                threads.len() - 1
            }
        };
        let thread = &mut threads[index];
        // Only the sender's own display name may be refreshed; the other
        // party's cached name survives.
        match args.sender {
            Sender::Seller => thread.seller_name = args.sender_name.clone(),
            Sender::Buyer => thread.buyer_name = Some(args.sender_name.clone()),
        }
        if thread.buyer_id.is_none() {
            thread.buyer_id = args.buyer_id.clone();
        }
        if thread.product_name.is_none() {
            thread.product_name = args.product_name.clone();
        }
        thread.updated_at = created_at;
        thread.unread = recompute_unread(&messages, &thread.id);
        let thread_snapshot = thread.clone();

        save_vec(self.storage.as_ref(), MESSAGES_KEY, &messages)?;
        save_vec(self.storage.as_ref(), THREADS_KEY, &threads)?;

        tracing::debug!(
            thread = %message.thread_id,
            sender = ?message.sender,
            "message appended"
        );
        self.bus.emit(Event::new(
            EventKind::MessageSent,
            json!({
                "message": message,
                "thread": thread_snapshot,
                "sender_id": args.sender_id,
            }),
        ));
        Ok(message)
    }

    /// All messages of a thread in ascending creation order.
    pub fn thread_messages(&self, thread_id: &str) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = load_vec(self.storage.as_ref(), MESSAGES_KEY);
        messages.retain(|m| m.thread_id == thread_id);
        messages.sort_by_key(|m| m.created_at);
        messages
    }

    /// Marks every message in the thread not authored by `reader` as
    /// read, then recomputes the thread's unread counts. Idempotent.
    pub fn mark_read(&self, thread_id: &str, reader: Sender) -> PortResult<()> {
        let mut messages: Vec<ChatMessage> = load_vec(self.storage.as_ref(), MESSAGES_KEY);
        let mut threads: Vec<ChatThread> = load_vec(self.storage.as_ref(), THREADS_KEY);

        for message in messages
            .iter_mut()
            .filter(|m| m.thread_id == thread_id && m.sender != reader)
        {
            message.read = true;
        }
        if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
            thread.unread = recompute_unread(&messages, thread_id);
        }

        save_vec(self.storage.as_ref(), MESSAGES_KEY, &messages)?;
        save_vec(self.storage.as_ref(), THREADS_KEY, &threads)?;
        Ok(())
    }

    /// Deletes all messages and the thread record for `thread_id`.
    /// Never propagates an error; returns `false` if the deletion could
    /// not be persisted.
    pub fn clear_chat(&self, thread_id: &str) -> bool {
        match self.try_clear_chat(thread_id) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(thread = thread_id, %error, "failed to clear chat");
                false
            }
        }
    }

    fn try_clear_chat(&self, thread_id: &str) -> PortResult<()> {
        let mut messages: Vec<ChatMessage> = load_vec(self.storage.as_ref(), MESSAGES_KEY);
        let mut threads: Vec<ChatThread> = load_vec(self.storage.as_ref(), THREADS_KEY);
        messages.retain(|m| m.thread_id != thread_id);
        threads.retain(|t| t.id != thread_id);
        save_vec(self.storage.as_ref(), MESSAGES_KEY, &messages)?;
        save_vec(self.storage.as_ref(), THREADS_KEY, &threads)?;
        Ok(())
    }

    /// Total unread messages for `user_id` acting as `role`, summed over
    /// every thread where the user participates on that side.
    pub fn unread_count(&self, user_id: &str, role: Sender) -> u64 {
        let threads: Vec<ChatThread> = load_vec(self.storage.as_ref(), THREADS_KEY);
        threads
            .iter()
            .map(|t| match role {
                Sender::Seller if t.seller_id == user_id => t.unread.seller,
                Sender::Buyer if t.buyer_id.as_deref() == Some(user_id) => t.unread.buyer,
                _ => 0,
            })
            .sum()
    }

    /// All thread summaries, most recently active first.
    pub fn threads(&self) -> Vec<ChatThread> {
        let mut threads: Vec<ChatThread> = load_vec(self.storage.as_ref(), THREADS_KEY);
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        threads
    }
}

/// Unread counts derived from a full scan of the thread's messages:
/// the seller's count is the buyer-authored unread messages and
/// symmetrically for the buyer.
fn recompute_unread(messages: &[ChatMessage], thread_id: &str) -> UnreadCount {
    let mut unread = UnreadCount::default();
    for message in messages.iter().filter(|m| m.thread_id == thread_id && !m.read) {
        match message.sender {
            Sender::Buyer => unread.seller += 1,
            Sender::Seller => unread.buyer += 1,
        }
    }
    unread
}
