//! HTTP API access for the reconciliation server

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::ApiClient;
pub use types::{BatchOutcome, InitiateResponse, ProcessBatchRequest};
