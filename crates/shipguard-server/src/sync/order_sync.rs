//! Order-sync state machine
//!
//! An order is UNLINKED until its remote counterpart's id is recorded in
//! the `_shipguard_order_id` attribute, after which it is LINKED and the
//! engine never issues another create for it. The state is derived purely
//! from attribute presence, never stored as an enum.

use shipguard_common::types::{ATTR_CHARGE, ATTR_PROTECTION, ATTR_REMOTE_ORDER_ID};
use shipguard_common::{SyncError, SyncResult};
use tracing::{debug, error, info};

use super::SyncContext;
use crate::remote::types::{CreateOrderPayload, RemoteOrderBody};
use crate::store::OrderRecord;

/// What one sync step did with an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSyncOutcome {
    /// Remote id already recorded; no remote call made.
    AlreadyLinked,
    /// Remote id persisted this step.
    Linked,
    /// Shipping method excluded from remote tracking; re-evaluated on the
    /// next pass.
    Ineligible,
    /// Transport failure or remote rejection; left UNLINKED for the next
    /// scheduled pass.
    Deferred,
}

/// Drive one order UNLINKED → LINKED.
pub async fn sync_order(ctx: &SyncContext, order: &OrderRecord) -> SyncResult<OrderSyncOutcome> {
    if is_linked(ctx, order.id).await? {
        return Ok(OrderSyncOutcome::AlreadyLinked);
    }

    let response = match ctx.client.get_order(order.id).await {
        Ok(response) => response,
        Err(SyncError::Transport(reason)) => {
            debug!(order_id = order.id, reason = %reason, "get order unreachable, deferring");
            return Ok(OrderSyncOutcome::Deferred);
        }
        Err(e) => return Err(e),
    };

    match response.status {
        200 => {
            persist_remote_link(ctx, order.id, &response.order_body()).await?;
            Ok(OrderSyncOutcome::Linked)
        }
        404 => create_remote_order(ctx, order).await,
        status => {
            debug!(order_id = order.id, status, "unexpected get-order status, deferring");
            Ok(OrderSyncOutcome::Deferred)
        }
    }
}

/// Read-only reconciliation used by recovery mode: copy attributes from an
/// existing remote record, never create one. Returns whether attributes
/// were written.
pub async fn reconcile_existing_order(ctx: &SyncContext, order_id: i64) -> SyncResult<bool> {
    if is_linked(ctx, order_id).await? {
        return Ok(false);
    }

    let response = match ctx.client.get_order(order_id).await {
        Ok(response) => response,
        Err(SyncError::Transport(_)) => return Ok(false),
        Err(e) => return Err(e),
    };
    if response.status != 200 {
        return Ok(false);
    }

    persist_remote_link(ctx, order_id, &response.order_body()).await?;
    Ok(true)
}

async fn is_linked(ctx: &SyncContext, order_id: i64) -> SyncResult<bool> {
    crate::store::attribute_filled(ctx.store.as_ref(), order_id, ATTR_REMOTE_ORDER_ID).await
}

/// The order was not found remotely: create it, treating 409 as "already
/// exists" success.
async fn create_remote_order(
    ctx: &SyncContext,
    order: &OrderRecord,
) -> SyncResult<OrderSyncOutcome> {
    if !ctx.is_shipping_method_eligible(order).await? {
        debug!(order_id = order.id, "shipping method excluded, skipping");
        return Ok(OrderSyncOutcome::Ineligible);
    }

    let payload = build_create_payload(order);
    let response = match ctx.client.create_order(&payload).await {
        Ok(response) => response,
        Err(SyncError::Transport(reason)) => {
            debug!(order_id = order.id, reason = %reason, "create order unreachable, deferring");
            return Ok(OrderSyncOutcome::Deferred);
        }
        Err(e) => return Err(e),
    };

    let body = response.order_body();

    if response.status > 201 && response.status < 409 {
        // Server-side error while posting; logged with full request
        // context so it can be diagnosed from the logs alone.
        error!(
            order_id = order.id,
            status = response.status,
            method = "POST",
            endpoint = "orders",
            payload = %serde_json::to_value(&payload).unwrap_or_default(),
            "remote rejected order creation"
        );
        return Ok(OrderSyncOutcome::Deferred);
    }

    if body.is_complete() {
        persist_remote_link(ctx, order.id, &body).await?;
        return Ok(OrderSyncOutcome::Linked);
    }

    if response.status == 409 {
        // Conflict: the record exists but the conflict body doesn't carry
        // it. Fetch the remote state and persist from that.
        let fetched = match ctx.client.get_order(order.id).await {
            Ok(fetched) if fetched.status == 200 => fetched,
            Ok(fetched) => {
                debug!(
                    order_id = order.id,
                    status = fetched.status,
                    "conflict follow-up fetch missed, deferring"
                );
                return Ok(OrderSyncOutcome::Deferred);
            }
            Err(SyncError::Transport(_)) => return Ok(OrderSyncOutcome::Deferred),
            Err(e) => return Err(e),
        };
        persist_remote_link(ctx, order.id, &fetched.order_body()).await?;
        return Ok(OrderSyncOutcome::Linked);
    }

    debug!(
        order_id = order.id,
        status = response.status,
        "create order returned no usable record, deferring"
    );
    Ok(OrderSyncOutcome::Deferred)
}

/// Record the remote binding: id, protection charge, and protection flag,
/// in one atomic attribute write.
async fn persist_remote_link(
    ctx: &SyncContext,
    order_id: i64,
    body: &RemoteOrderBody,
) -> SyncResult<()> {
    let Some(remote_id) = body.id.clone() else {
        return Err(SyncError::LocalInconsistency(format!(
            "order {order_id}: remote order body carries no id"
        )));
    };

    let charge = body.charge();
    let protection = if charge.is_empty() { "0" } else { "1" };

    ctx.store
        .set_attributes(
            order_id,
            &[
                (ATTR_REMOTE_ORDER_ID, remote_id.clone()),
                (ATTR_CHARGE, charge),
                (ATTR_PROTECTION, protection.to_string()),
            ],
        )
        .await?;

    info!(order_id, remote_order_id = %remote_id, "order linked to remote record");
    Ok(())
}

fn build_create_payload(order: &OrderRecord) -> CreateOrderPayload {
    CreateOrderPayload {
        source_order_id: order.id,
        order_number: order.number.clone(),
        currency: order.currency.clone(),
        subtotal: order.total,
        shipping_method: order.shipping_method.clone(),
        created_on: order.created_at,
    }
}
