//! Periodic reconciliation worker passes
//!
//! Each pass selects its candidate orders and drives the engine over them
//! sequentially. All mutation is idempotent and keyed per order, so passes
//! are safe to re-run and to overlap; a failure inside one order's step
//! never aborts the pass.

use chrono::{DateTime, NaiveDate, Utc};
use shipguard_common::types::{
    split_setting_list, ATTR_REMOTE_ORDER_ID, ATTR_SHIPMENT_CRON_CALLED, ATTR_TRACKING_NUMBER,
    SETTING_CANCEL_STATUSES, SETTING_INCLUDED_STATUSES, SETTING_INSTALL_DATE,
};
use shipguard_common::SyncResult;
use tracing::{info, warn};

use super::order_sync::{sync_order, OrderSyncOutcome};
use super::shipment_sync::{sync_order_shipments, ShipmentSyncOutcome};
use super::{webhooks, SyncContext};
use crate::store::OrderFilter;

/// Statuses assumed accepted when the merchant never configured a set.
const DEFAULT_ACCEPTED_STATUSES: &[&str] = &["processing", "completed"];

/// Summary of one worker pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub selected: usize,
    pub synced: usize,
    pub skipped: usize,
    pub deferred: usize,
    pub failed: usize,
}

/// Missing-order worker: link orders the remote side doesn't know about.
pub async fn missing_orders_pass(ctx: &SyncContext) -> SyncResult<PassStats> {
    let mut filter = OrderFilter::new()
        .statuses(accepted_statuses(ctx).await?)
        .attribute_missing(ATTR_REMOTE_ORDER_ID);
    if let Some(installed) = install_date(ctx).await? {
        filter = filter.created_on_or_after(installed);
    }

    let orders = ctx.store.select_orders(&filter).await?;
    let mut stats = PassStats {
        selected: orders.len(),
        ..Default::default()
    };

    for order in &orders {
        match sync_order(ctx, order).await {
            Ok(OrderSyncOutcome::Linked) => stats.synced += 1,
            Ok(OrderSyncOutcome::AlreadyLinked | OrderSyncOutcome::Ineligible) => {
                stats.skipped += 1
            }
            Ok(OrderSyncOutcome::Deferred) => stats.deferred += 1,
            Err(e) => {
                stats.failed += 1;
                warn!(order_id = order.id, error = %e, "order sync failed");
            }
        }
    }

    info!(
        selected = stats.selected,
        linked = stats.synced,
        skipped = stats.skipped,
        deferred = stats.deferred,
        failed = stats.failed,
        "missing-orders pass finished"
    );
    Ok(stats)
}

/// Missing-shipment worker: mirror shipments for linked orders that have
/// tracking data but no completion flag yet.
pub async fn missing_shipments_pass(ctx: &SyncContext) -> SyncResult<PassStats> {
    let mut statuses = accepted_statuses(ctx).await?;
    statuses.extend(cancel_statuses(ctx).await?);

    let mut filter = OrderFilter::new()
        .statuses(statuses)
        .attribute_not_empty(ATTR_TRACKING_NUMBER)
        .attribute_missing(ATTR_SHIPMENT_CRON_CALLED);
    if let Some(installed) = install_date(ctx).await? {
        filter = filter.created_on_or_after(installed);
    }

    let orders = ctx.store.select_orders(&filter).await?;
    let mut stats = PassStats {
        selected: orders.len(),
        ..Default::default()
    };

    for order in &orders {
        match sync_order_shipments(ctx, order.id).await {
            Ok(ShipmentSyncOutcome::Attempted { .. }) => stats.synced += 1,
            Ok(ShipmentSyncOutcome::AlreadyAttempted | ShipmentSyncOutcome::Unlinked) => {
                stats.skipped += 1
            }
            Err(e) => {
                stats.failed += 1;
                warn!(order_id = order.id, error = %e, "shipment sync failed");
            }
        }
    }

    info!(
        selected = stats.selected,
        attempted = stats.synced,
        skipped = stats.skipped,
        failed = stats.failed,
        "missing-shipments pass finished"
    );
    Ok(stats)
}

/// Webhook-validator worker: reconcile the remote webhook registry
/// against the expected set.
pub async fn webhook_validator_pass(ctx: &SyncContext) -> SyncResult<()> {
    webhooks::upsert_webhooks(ctx).await
}

async fn accepted_statuses(ctx: &SyncContext) -> SyncResult<Vec<String>> {
    let configured = ctx
        .store
        .get_setting(SETTING_INCLUDED_STATUSES)
        .await?
        .map(|raw| split_setting_list(&raw))
        .unwrap_or_default();

    Ok(if configured.is_empty() {
        DEFAULT_ACCEPTED_STATUSES
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        configured
    })
}

async fn cancel_statuses(ctx: &SyncContext) -> SyncResult<Vec<String>> {
    Ok(ctx
        .store
        .get_setting(SETTING_CANCEL_STATUSES)
        .await?
        .map(|raw| split_setting_list(&raw))
        .unwrap_or_default())
}

async fn install_date(ctx: &SyncContext) -> SyncResult<Option<DateTime<Utc>>> {
    let Some(raw) = ctx.store.get_setting(SETTING_INSTALL_DATE).await? else {
        return Ok(None);
    };
    Ok(parse_date_setting(&raw))
}

/// Install timestamps arrive either as RFC 3339 or as a bare date.
fn parse_date_setting(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_bare_dates() {
        assert!(parse_date_setting("2024-03-01T10:30:00Z").is_some());
        let midnight = parse_date_setting("2024-03-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert!(parse_date_setting("not a date").is_none());
    }
}
