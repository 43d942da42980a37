//! crates/local_roots_core/src/orders.rs
//!
//! Order handling: a local order collection over the storage port, and
//! the [`OrderService`] that tries the remote [`OrderApi`] first and
//! degrades to the local collection on any remote error, so the calling
//! surface keeps working offline. The local store is a best-effort
//! fallback cache, not a synchronized replica; there is no
//! reconciliation once the remote becomes reachable again.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::domain::{NewOrder, Order, OrderStatus};
use crate::events::{Event, EventBus, EventKind};
use crate::ports::{OrderApi, PortError, PortResult, StorageBackend};
use crate::storage::{load_vec, save_vec, ORDERS_KEY};

/// Local order collection. Serves as the fallback tier when the remote
/// API is unreachable.
#[derive(Clone)]
pub struct OrderStore {
    storage: Arc<dyn StorageBackend>,
}

impl OrderStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    pub fn all(&self) -> Vec<Order> {
        load_vec(self.storage.as_ref(), ORDERS_KEY)
    }

    pub fn by_seller(&self, seller_id: &str) -> Vec<Order> {
        let mut orders = self.all();
        orders.retain(|o| o.seller_id == seller_id);
        orders
    }

    /// Appends a new pending order, synthesizing a local `ORD-<millis>`
    /// id and stamping the creation time.
    pub fn create(&self, new_order: NewOrder) -> PortResult<Order> {
        let mut orders = self.all();
        let order = Order {
            id: format!("ORD-{}", Utc::now().timestamp_millis()),
            buyer_name: new_order.buyer_name,
            buyer_email: new_order.buyer_email,
            seller_id: new_order.seller_id,
            total: new_order.total,
            status: OrderStatus::Pending,
            items: new_order.items,
            created_at: Utc::now(),
        };
        orders.push(order.clone());
        save_vec(self.storage.as_ref(), ORDERS_KEY, &orders)?;
        Ok(order)
    }

    /// Moves the order to `status`. Setting the current status again is
    /// a no-op; any other move must be allowed by
    /// [`OrderStatus::can_transition_to`]. A missing id is an error that
    /// callers must handle.
    pub fn update_status(&self, id: &str, status: OrderStatus) -> PortResult<Order> {
        let mut orders = self.all();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Order {id} not found")))?;
        if order.status != status {
            if !order.status.can_transition_to(status) {
                return Err(PortError::InvalidTransition(format!(
                    "{:?} -> {:?} on order {id}",
                    order.status, status
                )));
            }
            order.status = status;
        }
        let updated = order.clone();
        save_vec(self.storage.as_ref(), ORDERS_KEY, &orders)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> PortResult<()> {
        let mut orders = self.all();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(PortError::NotFound(format!("Order {id} not found")));
        }
        save_vec(self.storage.as_ref(), ORDERS_KEY, &orders)
    }
}

/// Order operations with transparent local fallback.
///
/// Each operation attempts the remote API first; on any remote error it
/// logs a warning and serves the equivalent local operation instead, so
/// callers never see which path answered. Every successful path emits
/// [`EventKind::OrdersChanged`]. A failure on the local path propagates,
/// since there is no further fallback tier.
#[derive(Clone)]
pub struct OrderService {
    api: Arc<dyn OrderApi>,
    local: OrderStore,
    bus: EventBus,
}

impl OrderService {
    pub fn new(api: Arc<dyn OrderApi>, storage: Arc<dyn StorageBackend>, bus: EventBus) -> Self {
        Self {
            api,
            local: OrderStore::new(storage),
            bus,
        }
    }

    pub async fn fetch_all(&self) -> PortResult<Vec<Order>> {
        self.with_fallback("fetch_all", self.api.fetch_all(), |local| Ok(local.all()))
            .await
    }

    pub async fn fetch_by_seller(&self, seller_id: &str) -> PortResult<Vec<Order>> {
        self.with_fallback(
            "fetch_by_seller",
            self.api.fetch_by_seller(seller_id),
            |local| Ok(local.by_seller(seller_id)),
        )
        .await
    }

    pub async fn create(&self, new_order: NewOrder) -> PortResult<Order> {
        let fallback = new_order.clone();
        self.with_fallback("create", self.api.create(new_order), move |local| {
            local.create(fallback)
        })
        .await
    }

    pub async fn update_status(&self, id: &str, status: OrderStatus) -> PortResult<Order> {
        self.with_fallback(
            "update_status",
            self.api.update_status(id, status),
            move |local| local.update_status(id, status),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> PortResult<()> {
        self.with_fallback("delete", self.api.delete(id), move |local| local.delete(id))
            .await
    }

    /// The remote-then-local shape shared by every operation: one
    /// fallback attempt, no retries, no timeout.
    async fn with_fallback<T, F, L>(&self, operation: &str, remote: F, local: L) -> PortResult<T>
    where
        F: Future<Output = PortResult<T>>,
        L: FnOnce(&OrderStore) -> PortResult<T>,
    {
        let result = match remote.await {
            Ok(value) => Ok(value),
            Err(error) => {
                tracing::warn!(operation, %error, "order API call failed, using local store");
                local(&self.local)
            }
        };
        if result.is_ok() {
            self.bus.emit(Event::new(EventKind::OrdersChanged, Value::Null));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderItem;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Remote that always fails, as if the network were down.
    struct DownApi;

    #[async_trait]
    impl OrderApi for DownApi {
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

    /// Minimal in-memory remote for the happy path.
    struct FakeApi {
        orders: Mutex<Vec<Order>>,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                orders: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl OrderApi for FakeApi {
        async fn fetch_all(&self) -> PortResult<Vec<Order>> {
            Ok(self.orders.lock().unwrap().clone())
        }
        async fn fetch_by_seller(&self, seller_id: &str) -> PortResult<Vec<Order>> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.seller_id == seller_id)
                .cloned()
                .collect())
        }
        async fn create(&self, order: NewOrder) -> PortResult<Order> {
            let created = Order {
                id: format!("srv-{}", self.orders.lock().unwrap().len() + 1),
                buyer_name: order.buyer_name,
                buyer_email: order.buyer_email,
                seller_id: order.seller_id,
                total: order.total,
                status: OrderStatus::Pending,
                items: order.items,
                created_at: Utc::now(),
            };
            self.orders.lock().unwrap().push(created.clone());
            Ok(created)
        }
        async fn update_status(&self, id: &str, status: OrderStatus) -> PortResult<Order> {
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| PortError::NotFound(id.to_string()))?;
            order.status = status;
            Ok(order.clone())
        }
        async fn delete(&self, id: &str) -> PortResult<()> {
            self.orders.lock().unwrap().retain(|o| o.id != id);
            Ok(())
        }
    }

    fn sample_order() -> NewOrder {
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

    fn offline_service() -> OrderService {
        OrderService::new(
            Arc::new(DownApi),
            Arc::new(MemoryStorage::new()),
            EventBus::new(),
        )
    }

    #[tokio::test]
    async fn create_falls_back_with_a_local_id() {
        let service = offline_service();
        let order = service.create(sample_order()).await.unwrap();

        assert!(order.id.starts_with("ORD-"));
        assert!(order.id["ORD-".len()..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(order.status, OrderStatus::Pending);

        let fetched = service.fetch_all().await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, order.id);
    }

    #[tokio::test]
    async fn fetch_by_seller_filters_the_local_store() {
        let service = offline_service();
        service.create(sample_order()).await.unwrap();
        let mut other = sample_order();
        other.seller_id = "seller-2".to_string();
        service.create(other).await.unwrap();

        let mine = service.fetch_by_seller("seller-1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].seller_id, "seller-1");
    }

    #[tokio::test]
    async fn update_status_follows_the_transition_graph_locally() {
        let service = offline_service();
        let order = service.create(sample_order()).await.unwrap();

        let updated = service
            .update_status(&order.id, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);

        let err = service
            .update_status(&order.id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn repeating_the_current_status_is_a_no_op() {
        let service = offline_service();
        let order = service.create(sample_order()).await.unwrap();
        let same = service
            .update_status(&order.id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(same.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn update_of_a_missing_order_propagates_not_found() {
        let service = offline_service();
        let err = service
            .update_status("ORD-0", OrderStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_a_local_order() {
        let service = offline_service();
        let order = service.create(sample_order()).await.unwrap();
        service.delete(&order.id).await.unwrap();
        assert!(service.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_path_is_preferred_when_reachable() {
        let service = OrderService::new(
            Arc::new(FakeApi::new()),
            Arc::new(MemoryStorage::new()),
            EventBus::new(),
        );
        let order = service.create(sample_order()).await.unwrap();
        assert!(order.id.starts_with("srv-"));

        let fetched = service.fetch_all().await.unwrap();
        assert_eq!(fetched.len(), 1);
    }

    #[tokio::test]
    async fn every_successful_path_announces_orders_changed() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(0u32));
        let sink = seen.clone();
        let _sub = bus.subscribe(EventKind::OrdersChanged, move |_| {
            *sink.lock().unwrap() += 1
        });

        let service = OrderService::new(
            Arc::new(DownApi),
            Arc::new(MemoryStorage::new()),
            bus.clone(),
        );
        service.create(sample_order()).await.unwrap();
        service.fetch_all().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), 2);

        // A failed operation announces nothing.
        let _ = service.update_status("ORD-0", OrderStatus::Shipped).await;
        assert_eq!(*seen.lock().unwrap(), 2);
    }
}
