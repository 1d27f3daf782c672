//! Remote protection API
//!
//! Typed access to the subset of the Shipguard API this service consumes:
//! order get/create, shipment get/create/cancel, and the webhook registry
//! used by the validator worker.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{RemoteOrderBody, RemoteResponse, RemoteWebhook};
