//! HTTP client for the remote protection API

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use shipguard_common::types::{CancelShipmentPayload, ShipmentRecord};
use shipguard_common::{SyncError, SyncResult};

use super::types::{CreateOrderPayload, RemoteResponse};
use crate::config::RemoteConfig;

/// API client for the remote protection/tracking service.
///
/// Every verb resolves to a [`RemoteResponse`] carrying the HTTP status and
/// the parsed body; the engine branches on status codes, so non-2xx
/// responses are not errors here. Only transport failures become
/// `SyncError::Transport`.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &RemoteConfig) -> SyncResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if !config.api_token.is_empty() {
            let value = reqwest::header::HeaderValue::from_str(&config.api_token)
                .map_err(|e| SyncError::Config(format!("invalid API token: {e}")))?;
            headers.insert("token", value);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn execute(&self, request: RequestBuilder) -> SyncResult<RemoteResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(RemoteResponse { status, body })
    }

    async fn get(&self, path: &str) -> SyncResult<RemoteResponse> {
        self.execute(self.http.request(Method::GET, self.url(path)))
            .await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> SyncResult<RemoteResponse> {
        self.execute(self.http.request(Method::POST, self.url(path)).json(body))
            .await
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    pub async fn get_order(&self, order_id: i64) -> SyncResult<RemoteResponse> {
        self.get(&format!("orders/{order_id}")).await
    }

    pub async fn create_order(&self, payload: &CreateOrderPayload) -> SyncResult<RemoteResponse> {
        self.post("orders", payload).await
    }

    // ------------------------------------------------------------------
    // Shipments
    // ------------------------------------------------------------------

    pub async fn get_shipment(
        &self,
        tracking_number: &str,
        order_id: i64,
    ) -> SyncResult<RemoteResponse> {
        self.get(&format!(
            "shipments/{tracking_number}?source_order_id={order_id}"
        ))
        .await
    }

    pub async fn create_shipment(
        &self,
        tracking_number: &str,
        payload: &ShipmentRecord,
    ) -> SyncResult<RemoteResponse> {
        self.post(&format!("shipments/{tracking_number}"), payload)
            .await
    }

    pub async fn cancel_shipment(
        &self,
        tracking_number: &str,
        payload: &CancelShipmentPayload,
    ) -> SyncResult<RemoteResponse> {
        self.post(&format!("shipments/{tracking_number}/cancel"), payload)
            .await
    }

    // ------------------------------------------------------------------
    // Webhook registry (validator worker)
    // ------------------------------------------------------------------

    pub async fn get_webhooks(&self) -> SyncResult<RemoteResponse> {
        self.get("webhooks").await
    }

    pub async fn create_webhook(&self, topic: &str, url: &str) -> SyncResult<RemoteResponse> {
        self.post(
            "webhooks",
            &serde_json::json!({ "topic": topic, "url": url }),
        )
        .await
    }

    pub async fn update_webhook(
        &self,
        webhook_id: &str,
        topic: &str,
        url: &str,
    ) -> SyncResult<RemoteResponse> {
        self.post(
            &format!("webhooks/{webhook_id}"),
            &serde_json::json!({ "topic": topic, "url": url }),
        )
        .await
    }
}
