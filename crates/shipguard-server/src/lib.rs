//! Shipguard Server Library
//!
//! Reconciliation service between a merchant's local order store and the
//! remote Shipguard protection/tracking API.
//!
//! # Overview
//!
//! - **Reconciliation engine** (`sync`): the order-sync and shipment-sync
//!   state machines, cancellation, the three periodic worker passes, and
//!   the cron scheduler driving them
//! - **Order attribute store** (`store`): one trait over the host's two
//!   storage shapes (legacy meta table / first-class order record),
//!   selected by feature detection at startup
//! - **Remote client** (`remote`): typed access to the consumed subset of
//!   the remote API
//! - **Tracking providers** (`tracking`): normalizers producing canonical
//!   shipment records from third-party fulfillment integrations
//! - **Batch recovery** (`features::recovery`): the operator-triggered,
//!   client-paced resync protocol
//!
//! # Framework Stack
//!
//! - **Axum**: HTTP surface for the recovery protocol
//! - **SQLx**: order store backends over PostgreSQL
//! - **Apalis**: cron-driven reconciliation workers
//! - **Reqwest**: remote API client

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod remote;
pub mod store;
pub mod sync;
pub mod tracking;

// Re-export commonly used types
pub use error::AppError;
