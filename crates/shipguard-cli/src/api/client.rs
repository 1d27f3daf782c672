//! HTTP API client for the reconciliation server

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::api::{
    endpoints,
    types::{BatchOutcome, ErrorEnvelope, InitiateResponse, ProcessBatchRequest,
        ProcessBatchResponse},
};
use crate::error::{CliError, Result};

/// Default timeout for API requests in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 60;

/// Default reconciliation server URL when not specified via environment.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8400";

/// API client for the reconciliation server
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Result<Self> {
        let timeout_secs = std::env::var("SHIPGUARD_CLI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SHIPGUARD_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

        Self::new(base_url)
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let url = endpoints::health_url(&self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Initiate a recovery session over a date range
    pub async fn initiate_recovery(
        &self,
        date_from: &str,
        date_to: &str,
    ) -> Result<InitiateResponse> {
        let url = endpoints::recovery_url(&self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "date_from": date_from,
                "date_to": date_to,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Run one recovery round; a 404 from the server means the range is
    /// exhausted and the session is over.
    pub async fn process_batch(&self, request: &ProcessBatchRequest) -> Result<BatchOutcome> {
        let url = endpoints::recovery_batches_url(&self.base_url);

        let response = self.client.post(&url).json(request).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(BatchOutcome::Exhausted);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body: ProcessBatchResponse = response.json().await?;
        Ok(BatchOutcome::Processed(body.processed))
    }

    async fn api_error(response: reqwest::Response) -> CliError {
        let status = response.status();
        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => CliError::api(envelope.error.message),
            Err(_) => CliError::api(format!("server returned status {status}")),
        }
    }
}
