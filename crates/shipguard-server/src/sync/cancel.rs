//! Shipment cancellation
//!
//! Used whenever a tracking number is superseded or removed from its
//! source of truth (order notes or fulfillment fields).

use shipguard_common::types::CancelShipmentPayload;
use shipguard_common::{SyncError, SyncResult};
use tracing::{debug, info};

use super::SyncContext;

/// Cancel one mirrored shipment.
///
/// Probes the remote side first; a shipment that was never mirrored is a
/// no-op (`Ok(false)`). A cancel rejected with 400, or a transport failure
/// on either call, is an error the caller reports without auto-retrying.
/// Returns `Ok(true)` once the remote shipment is cancelled.
pub async fn cancel_tracking(
    ctx: &SyncContext,
    order_id: i64,
    tracking_number: &str,
    product_ids: &[i64],
) -> SyncResult<bool> {
    if tracking_number.is_empty() {
        return Err(SyncError::LocalInconsistency(format!(
            "order {order_id}: empty tracking number in cancel request"
        )));
    }

    let existing = ctx.client.get_shipment(tracking_number, order_id).await?;
    if existing.status != 200 {
        debug!(
            order_id,
            tracking_number,
            status = existing.status,
            "shipment not mirrored remotely, nothing to cancel"
        );
        return Ok(false);
    }

    let payload = CancelShipmentPayload {
        source_order_id: order_id,
        source_product_ids: product_ids.to_vec(),
    };
    let response = ctx.client.cancel_shipment(tracking_number, &payload).await?;

    if response.status == 400 {
        return Err(SyncError::RemoteRejection {
            method: "POST".to_string(),
            endpoint: format!("shipments/{tracking_number}/cancel"),
            status: response.status,
            payload: serde_json::to_value(&payload)?,
        });
    }

    info!(order_id, tracking_number, "shipment cancelled remotely");
    Ok(true)
}
