//! Operator-triggered batch recovery
//!
//! A two-phase request/response protocol over an order date range:
//! `initiate` sizes the session (order count, batch size, wait time) and
//! `process_batch` is then polled by the caller with increasing offsets
//! until the range is exhausted. Pacing is entirely client-driven; this
//! side exposes pull-based pagination, nothing more.

pub mod commands;
pub mod routes;

pub use commands::RecoveryError;
pub use routes::recovery_routes;
