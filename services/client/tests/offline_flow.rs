//! End-to-end flow over the file-backed storage adapter with the order
//! API unreachable, the shape the client degrades to when offline.

use std::sync::Arc;

use async_trait::async_trait;
use client_lib::adapters::{BroadcastNotifier, JsonFileStorage};
use local_roots_core::{
    chat::{ChatStore, SendMessage},
    domain::{NewOrder, Order, OrderItem, OrderStatus, Sender},
    events::EventBus,
    orders::OrderService,
    ports::{OrderApi, PortError, PortResult},
    thread_key::thread_key,
};

/// An order API with the network down.
struct UnreachableApi;

#[async_trait]
impl OrderApi for UnreachableApi {
    async fn fetch_all(&self) -> PortResult<Vec<Order>> {
        Err(PortError::Unavailable("connection refused".to_string()))
    }
    async fn fetch_by_seller(&self, _seller_id: &str) -> PortResult<Vec<Order>> {
        Err(PortError::Unavailable("connection refused".to_string()))
    }
    async fn create(&self, _order: NewOrder) -> PortResult<Order> {
        Err(PortError::Unavailable("connection refused".to_string()))
    }
    async fn update_status(&self, _id: &str, _status: OrderStatus) -> PortResult<Order> {
        Err(PortError::Unavailable("connection refused".to_string()))
    }
    async fn delete(&self, _id: &str) -> PortResult<()> {
        Err(PortError::Unavailable("connection refused".to_string()))
    }
}

fn checkout() -> NewOrder {
    NewOrder {
        buyer_name: "Alice".to_string(),
        buyer_email: "alice@example.com".to_string(),
        seller_id: "seller-1".to_string(),
        total: 5000,
        items: vec![OrderItem {
            product_id: "product-1".to_string(),
            name: "Raw Honey".to_string(),
            price: 2500,
            quantity: 2,
        }],
    }
}

#[tokio::test]
async fn orders_survive_offline_across_restarts() {
    let dir = tempfile::tempdir().unwrap();

    let created = {
        let storage = Arc::new(JsonFileStorage::new(dir.path()).unwrap());
        let service = OrderService::new(Arc::new(UnreachableApi), storage, EventBus::new());
        service.create(checkout()).await.unwrap()
    };
    assert!(created.id.starts_with("ORD-"));

    // A fresh adapter over the same directory models a restarted client.
    let storage = Arc::new(JsonFileStorage::new(dir.path()).unwrap());
    let service = OrderService::new(Arc::new(UnreachableApi), storage, EventBus::new());
    let orders = service.fetch_all().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, created.id);
    assert_eq!(orders[0].total, 5000);

    let updated = service
        .update_status(&created.id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Processing);
}

#[tokio::test]
async fn chat_history_survives_restart_and_clear_is_durable() {
    let dir = tempfile::tempdir().unwrap();
    let thread_id = thread_key("seller-1", Some("buyer-1"), Some("product-1"));

    let message = |body: &str| SendMessage {
        thread_id: thread_id.clone(),
        sender: Sender::Buyer,
        sender_id: "buyer-1".to_string(),
        sender_name: "Alice".to_string(),
        seller_id: "seller-1".to_string(),
        buyer_id: Some("buyer-1".to_string()),
        product_id: Some("product-1".to_string()),
        product_name: Some("Raw Honey".to_string()),
        body: body.to_string(),
    };

    {
        let storage = Arc::new(JsonFileStorage::new(dir.path()).unwrap());
        let chat = ChatStore::new(storage, EventBus::new());
        for body in ["one", "two", "three"] {
            chat.send_message(message(body)).unwrap();
        }
    }

    let storage = Arc::new(JsonFileStorage::new(dir.path()).unwrap());
    let chat = ChatStore::new(storage, EventBus::new());
    assert_eq!(chat.thread_messages(&thread_id).len(), 3);
    assert_eq!(chat.unread_count("seller-1", Sender::Seller), 3);

    assert!(chat.clear_chat(&thread_id));
    assert!(chat.thread_messages(&thread_id).is_empty());
    assert!(chat.threads().is_empty());

    // And the deletion is durable too.
    let storage = Arc::new(JsonFileStorage::new(dir.path()).unwrap());
    let chat = ChatStore::new(storage, EventBus::new());
    assert!(chat.thread_messages(&thread_id).is_empty());
}

#[tokio::test]
async fn store_writes_reach_broadcast_receivers() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(JsonFileStorage::new(dir.path()).unwrap());
    let notifier = Arc::new(BroadcastNotifier::new(8));
    let bus = EventBus::with_notifier(notifier.clone());
    let mut receiver = notifier.subscribe();

    let service = OrderService::new(Arc::new(UnreachableApi), storage, bus);
    service.create(checkout()).await.unwrap();

    let event = receiver.recv().await.unwrap();
    assert_eq!(
        event.kind,
        local_roots_core::events::EventKind::OrdersChanged
    );
}
