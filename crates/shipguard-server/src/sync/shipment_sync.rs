//! Shipment-sync state machine
//!
//! Mirrors an order's shipments to the remote side exactly once. The
//! per-order completion flag records that a reconciliation attempt
//! finished, not that every create succeeded; it is the fan-out guard
//! that keeps scheduled passes from re-hammering the remote API.

use shipguard_common::types::{
    join_tracking_numbers, split_tracking_numbers, ATTR_REMOTE_ORDER_ID,
    ATTR_SHIPMENT_CRON_CALLED, ATTR_TRACKING_NUMBER, ATTR_TRACKING_PROVIDER, FLAG_SUCCESS,
};
use shipguard_common::{ShipmentRecord, SyncResult};
use tracing::{debug, info, warn};

use super::SyncContext;
use crate::store::{attribute_filled, expand_product_units};
use crate::tracking::{active_provider, CourierSource};

/// What one shipment-sync step did with an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentSyncOutcome {
    /// Completion flag already set; zero remote calls.
    AlreadyAttempted,
    /// Order not yet LINKED; shipment sync requires the remote binding.
    Unlinked,
    /// The per-record loop ran; the completion flag is now set.
    Attempted { records: usize },
}

/// Mirror one order's shipments.
pub async fn sync_order_shipments(
    ctx: &SyncContext,
    order_id: i64,
) -> SyncResult<ShipmentSyncOutcome> {
    let store = ctx.store.as_ref();

    let flag = store.get_attribute(order_id, ATTR_SHIPMENT_CRON_CALLED).await?;
    if flag.as_deref() == Some(FLAG_SUCCESS) {
        return Ok(ShipmentSyncOutcome::AlreadyAttempted);
    }
    if !attribute_filled(store, order_id, ATTR_REMOTE_ORDER_ID).await? {
        debug!(order_id, "order not linked yet, shipment sync skipped");
        return Ok(ShipmentSyncOutcome::Unlinked);
    }

    let records = format_shipping_records(ctx, order_id).await?;

    let mut seen = Vec::new();
    for record in &records {
        seen.push(record.tracking_number.clone());

        // Transport failure or an existing remote shipment both mean
        // "leave this record alone".
        match ctx
            .client
            .get_shipment(&record.tracking_number, order_id)
            .await
        {
            Err(_) => continue,
            Ok(response) if response.status == 200 => continue,
            Ok(_) => {}
        }

        match ctx
            .client
            .create_shipment(&record.tracking_number, record)
            .await
        {
            Ok(response) if response.status == 201 || response.status == 409 => {
                info!(
                    order_id,
                    tracking_number = %record.tracking_number,
                    "shipment mirrored remotely"
                );
            }
            Ok(response) => {
                warn!(
                    order_id,
                    tracking_number = %record.tracking_number,
                    status = response.status,
                    endpoint = "shipments",
                    method = "POST",
                    "create shipment rejected"
                );
            }
            Err(e) => {
                warn!(
                    order_id,
                    tracking_number = %record.tracking_number,
                    error = %e,
                    "create shipment failed"
                );
            }
        }
    }

    // Persist every number seen this pass, pipe-joined, then mark the
    // order as attempted. The flag is set regardless of per-record create
    // outcomes (at-least-attempted semantics).
    if !seen.is_empty() {
        store
            .set_attributes(
                order_id,
                &[(ATTR_TRACKING_NUMBER, join_tracking_numbers(&seen))],
            )
            .await?;
    }
    store
        .set_attributes(order_id, &[(ATTR_SHIPMENT_CRON_CALLED, FLAG_SUCCESS.to_string())])
        .await?;

    Ok(ShipmentSyncOutcome::Attempted {
        records: records.len(),
    })
}

/// Build the canonical shipment records for an order.
///
/// Locally persisted tracking data wins; when it yields nothing, ask the
/// currently active tracking provider for live shipping info.
pub async fn format_shipping_records(
    ctx: &SyncContext,
    order_id: i64,
) -> SyncResult<Vec<ShipmentRecord>> {
    let store = ctx.store.as_ref();

    let stored = store
        .get_attribute(order_id, ATTR_TRACKING_NUMBER)
        .await?
        .unwrap_or_default();
    let numbers = split_tracking_numbers(&stored);

    let provider = active_provider(&ctx.providers, store).await?;

    let courier_source = match &provider {
        Some(provider) => {
            let source = provider.shipping_provider_name(store, order_id).await?;
            if source == CourierSource::Unknown {
                stored_courier(ctx, order_id).await?
            } else {
                source
            }
        }
        None => stored_courier(ctx, order_id).await?,
    };

    let product_ids = expand_product_units(&store.line_items(order_id).await?);

    let mut records = Vec::new();
    for tracking_number in numbers {
        let Some(courier_id) = courier_source.resolve(&tracking_number) else {
            // Malformed composite: a number we can't attribute to any
            // courier is skipped rather than failing the order.
            warn!(
                order_id,
                tracking_number = %tracking_number,
                "no courier known for tracking number, record skipped"
            );
            continue;
        };
        records.push(ShipmentRecord {
            source_order_id: order_id,
            source_product_ids: product_ids.clone(),
            courier_id,
            tracking_number,
        });
    }

    if records.is_empty() {
        if let Some(provider) = provider {
            return provider.shipping_info(store, order_id).await;
        }
    }

    Ok(records)
}

async fn stored_courier(ctx: &SyncContext, order_id: i64) -> SyncResult<CourierSource> {
    match ctx
        .store
        .get_attribute(order_id, ATTR_TRACKING_PROVIDER)
        .await?
    {
        Some(provider) if !provider.is_empty() => Ok(CourierSource::Single(provider)),
        _ => Ok(CourierSource::Unknown),
    }
}
