//! Initiate-recovery command
//!
//! Sizes a recovery session: counts the orders in the requested range and
//! derives the batch size and client-side wait time from the count, so a
//! large resync paces itself instead of overloading the host or the
//! remote API.

use serde::{Deserialize, Serialize};

use super::{parse_range, RecoveryError};
use crate::store::{OrderFilter, OrderStore};

/// Command to start a recovery session over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateRecoveryCommand {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Session parameters returned to the polling client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateRecoveryResponse {
    pub order_count: i64,
    pub batch_size: i64,
    /// Seconds the client waits between process-batch calls.
    pub wait_time: u64,
    pub date_from: String,
    pub date_to: String,
}

/// Batch size by total order count.
pub fn determine_batch_size(order_count: i64) -> i64 {
    match order_count {
        c if c <= 1_000 => 100,
        c if c <= 5_000 => 50,
        c if c <= 10_000 => 25,
        _ => 10,
    }
}

/// Client-side wait time by batch size.
pub fn determine_wait_time(batch_size: i64) -> u64 {
    match batch_size {
        100 => 10,
        50 => 5,
        _ => 2,
    }
}

#[tracing::instrument(skip(store, command), fields(from = ?command.date_from, to = ?command.date_to))]
pub async fn handle(
    store: &dyn OrderStore,
    command: InitiateRecoveryCommand,
) -> Result<InitiateRecoveryResponse, RecoveryError> {
    let (from, to) = parse_range(command.date_from.as_deref(), command.date_to.as_deref())?;

    let filter = OrderFilter::new()
        .created_on_or_after(from)
        .created_on_or_before(to);
    let order_count = store.count_orders(&filter).await?;

    let batch_size = determine_batch_size(order_count);
    let wait_time = determine_wait_time(batch_size);

    tracing::info!(order_count, batch_size, wait_time, "recovery session sized");

    Ok(InitiateRecoveryResponse {
        order_count,
        batch_size,
        wait_time,
        date_from: command.date_from.unwrap_or_default(),
        date_to: command.date_to.unwrap_or_default(),
    })
}
