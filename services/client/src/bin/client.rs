//! services/client/src/bin/client.rs

use client_lib::{
    adapters::{BroadcastNotifier, HttpOrderApi, JsonFileStorage},
    config::Config,
    error::ClientError,
};
use local_roots_core::{
    chat::{ChatStore, SendMessage},
    events::EventBus,
    orders::OrderService,
    thread_key::thread_key,
    Sender,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting client...");

    // --- 2. Initialize Adapters ---
    let storage = Arc::new(JsonFileStorage::new(&config.data_dir)?);
    let notifier = Arc::new(BroadcastNotifier::new(32));
    let bus = EventBus::with_notifier(notifier.clone());
    let order_api = Arc::new(HttpOrderApi::new(config.api_base_url.clone()));

    // --- 3. Build the Stores ---
    let chat = ChatStore::new(storage.clone(), bus.clone());
    let orders = OrderService::new(order_api, storage, bus);
    let mut changes = notifier.subscribe();

    // --- 4. Run a Smoke Flow ---
    let seller_id = "demo-seller";
    let buyer_id = "demo-buyer";
    let thread_id = thread_key(seller_id, Some(buyer_id), None);

    let message = chat.send_message(SendMessage {
        thread_id: thread_id.clone(),
        sender: Sender::Buyer,
        sender_id: buyer_id.to_string(),
        sender_name: "Demo Buyer".to_string(),
        seller_id: seller_id.to_string(),
        buyer_id: Some(buyer_id.to_string()),
        product_id: None,
        product_name: None,
        body: "Hello from the smoke client".to_string(),
    })?;
    info!(thread = %message.thread_id, "sent a chat message");
    info!(
        unread = chat.unread_count(seller_id, Sender::Seller),
        "seller unread count"
    );

    // Falls back to the local store when the API is unreachable.
    let all_orders = orders.fetch_all().await?;
    info!(count = all_orders.len(), "fetched orders");

    while let Ok(event) = changes.try_recv() {
        info!(kind = ?event.kind, "change notification observed");
    }

    Ok(())
}
