//! Shared helpers for the integration suites

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use shipguard_server::config::RemoteConfig;
use shipguard_server::remote::ApiClient;
use shipguard_server::store::{MemoryOrderStore, OrderStore};
use shipguard_server::sync::SyncContext;
use shipguard_server::tracking;
use wiremock::MockServer;

/// Noon UTC on a day of January 2024.
pub fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).single().unwrap()
}

/// A sync context whose remote client points at the mock server.
pub fn context(server: &MockServer, store: Arc<MemoryOrderStore>) -> SyncContext {
    let config = RemoteConfig {
        base_url: server.uri(),
        api_token: String::new(),
        timeout_secs: 5,
    };
    let store: Arc<dyn OrderStore> = store;
    SyncContext::new(
        store,
        ApiClient::new(&config).unwrap(),
        tracking::default_providers(),
    )
}

/// A sync context whose remote client cannot reach anything, for
/// transport-failure paths.
pub fn unreachable_context(store: Arc<MemoryOrderStore>) -> SyncContext {
    let config = RemoteConfig {
        // Reserved port on localhost: connections are refused immediately.
        base_url: "http://127.0.0.1:9".to_string(),
        api_token: String::new(),
        timeout_secs: 1,
    };
    let store: Arc<dyn OrderStore> = store;
    SyncContext::new(
        store,
        ApiClient::new(&config).unwrap(),
        tracking::default_providers(),
    )
}
