//! Process-batch command
//!
//! One round of a recovery session. In the default mode every fetched
//! order is force-saved, which lets the host platform emit its own
//! order-update side effects (e.g. an update webhook) instead of this
//! service calling the remote API directly. In reconcile mode the
//! read-only order-sync path copies attributes for orders that don't have
//! a remote id recorded yet, and never issues a remote create.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{parse_range, RecoveryError};
use crate::store::OrderFilter;
use crate::sync::{order_sync::reconcile_existing_order, SyncContext};

/// Command for one recovery round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessBatchCommand {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub batch_size: i64,
    pub offset: i64,
    /// Reconcile-existing mode: copy remote attributes instead of
    /// re-saving orders.
    #[serde(default)]
    pub reconcile: bool,
}

/// Result of one recovery round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessBatchResponse {
    pub processed: usize,
}

#[tracing::instrument(skip(ctx, command), fields(offset = command.offset, reconcile = command.reconcile))]
pub async fn handle(
    ctx: &SyncContext,
    command: ProcessBatchCommand,
) -> Result<ProcessBatchResponse, RecoveryError> {
    let (from, to) = parse_range(command.date_from.as_deref(), command.date_to.as_deref())?;
    if command.batch_size <= 0 || command.offset < 0 {
        return Err(RecoveryError::Validation(
            "batch_size must be positive and offset non-negative".to_string(),
        ));
    }

    let filter = OrderFilter::new()
        .created_on_or_after(from)
        .created_on_or_before(to)
        .page(command.batch_size, command.offset);
    let orders = ctx.store.select_orders(&filter).await?;

    if orders.is_empty() {
        return Err(RecoveryError::NoMoreOrders);
    }

    for order in &orders {
        if command.reconcile {
            // Per-order failures don't abort the round; the next session
            // over the same range picks the order up again.
            if let Err(e) = reconcile_existing_order(ctx, order.id).await {
                warn!(order_id = order.id, error = %e, "reconcile failed");
            }
        } else {
            ctx.store.touch_order(order.id).await?;
        }
    }

    Ok(ProcessBatchResponse {
        processed: orders.len(),
    })
}
