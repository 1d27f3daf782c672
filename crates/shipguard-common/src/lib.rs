//! Shipguard Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the Shipguard workspace.
//!
//! # Overview
//!
//! This crate provides functionality used by both the server and the CLI:
//!
//! - **Error Handling**: the reconciliation error taxonomy and result alias
//! - **Logging**: tracing subscriber initialization shared by all binaries
//! - **Types**: canonical shipment records, attribute keys, and the
//!   tracking-number codec

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{SyncError, SyncResult};
pub use types::ShipmentRecord;
