//! HTTP feature modules
//!
//! Each feature follows the same layout: command structs with validation,
//! standalone `handle` functions holding the logic, and a thin axum route
//! layer.

pub mod recovery;
pub mod tracking_refresh;
