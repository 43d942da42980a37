//! services/client/src/adapters/orders_api.rs
//!
//! This module contains the HTTP adapter for the marketplace order API.
//! It implements the `OrderApi` port from the `core` crate using
//! `reqwest`. No timeout is configured and no retries are attempted;
//! the order service above this adapter handles degradation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use local_roots_core::domain::{NewOrder, Order, OrderStatus};
use local_roots_core::ports::{OrderApi, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `OrderApi` port against the REST
/// endpoints under `{base}/api/orders`.
#[derive(Clone)]
pub struct HttpOrderApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderApi {
    /// Creates a new `HttpOrderApi`. `base_url` must not end with a
    /// slash.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

//=========================================================================================
// Wire Payloads and Error Mapping
//=========================================================================================

#[derive(Serialize)]
struct StatusPatch {
    status: OrderStatus,
}

/// Error shape returned by the API on non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Maps a non-2xx response to a `PortError`, surfacing the server's
/// `error` message when the body carries one.
async fn error_from(response: reqwest::Response) -> PortError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(ErrorBody { error: Some(msg) }) => msg,
        _ => format!("order API returned {status}"),
    };
    if status == reqwest::StatusCode::NOT_FOUND {
        PortError::NotFound(message)
    } else {
        PortError::Unavailable(message)
    }
}

async fn into_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> PortResult<T> {
    if !response.status().is_success() {
        return Err(error_from(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))
}

fn transport(e: reqwest::Error) -> PortError {
    PortError::Unavailable(e.to_string())
}

//=========================================================================================
// `OrderApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn fetch_all(&self) -> PortResult<Vec<Order>> {
        let response = self
            .client
            .get(self.url("/api/orders"))
            .send()
            .await
            .map_err(transport)?;
        into_json(response).await
    }

    async fn fetch_by_seller(&self, seller_id: &str) -> PortResult<Vec<Order>> {
        let response = self
            .client
            .get(self.url(&format!("/api/orders/seller/{seller_id}")))
            .send()
            .await
            .map_err(transport)?;
        into_json(response).await
    }

    async fn create(&self, order: NewOrder) -> PortResult<Order> {
        let response = self
            .client
            .post(self.url("/api/orders"))
            .json(&order)
            .send()
            .await
            .map_err(transport)?;
        into_json(response).await
    }

    async fn update_status(&self, id: &str, status: OrderStatus) -> PortResult<Order> {
        let response = self
            .client
            .patch(self.url(&format!("/api/orders/{id}")))
            .json(&StatusPatch { status })
            .send()
            .await
            .map_err(transport)?;
        into_json(response).await
    }

    async fn delete(&self, id: &str) -> PortResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/orders/{id}")))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_patch_uses_the_wire_casing() {
        let patch = StatusPatch {
            status: OrderStatus::Shipped,
        };
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"status":"shipped"}"#
        );
    }

    #[test]
    fn urls_join_against_the_base() {
        let api = HttpOrderApi::new("http://localhost:5000");
        assert_eq!(api.url("/api/orders"), "http://localhost:5000/api/orders");
        assert_eq!(
            api.url("/api/orders/seller/s1"),
            "http://localhost:5000/api/orders/seller/s1"
        );
    }
}
