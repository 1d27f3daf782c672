//! Order-notes tracking provider
//!
//! Some fulfillment integrations leave tracking data only as system notes
//! on the order, one note per shipment, as labelled `Key: value` lines.
//! Only notes containing the marker substring are parsed, and a note
//! yields a record only when both the tracking number and the carrier key
//! are present.

use std::collections::HashMap;

use async_trait::async_trait;
use shipguard_common::types::{
    join_tracking_numbers, split_tracking_numbers, ATTR_TRACKING_NUMBER,
};
use shipguard_common::{ShipmentRecord, SyncResult};
use tracing::warn;

use super::{CourierSource, TrackingProvider};
use crate::store::{expand_product_units, OrderStore};
use crate::sync::{cancel::cancel_tracking, SyncContext};

/// Substring a note must contain to be considered tracking data.
const NOTE_MARKER: &str = "Tracking Number";

const LABEL_TRACKING_NUMBER: &str = "Shipping Tracking Number";
const LABEL_CARRIER_KEY: &str = "Carrier Key";

pub struct OrderNotesProvider;

/// Parse one note body into (tracking_number, courier_id).
///
/// Notes arrive either as plain text or with `<br/>` line breaks.
fn parse_note(content: &str) -> Option<(String, String)> {
    if !content.contains(NOTE_MARKER) {
        return None;
    }

    let normalized = content.replace("<br/>", "\n").replace("<br>", "\n");
    let mut tracking_number = None;
    let mut courier_id = None;

    for line in normalized.lines() {
        if let Some((label, value)) = line.split_once(':') {
            match label.trim() {
                LABEL_TRACKING_NUMBER => tracking_number = Some(value.trim().to_string()),
                LABEL_CARRIER_KEY => courier_id = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    match (tracking_number, courier_id) {
        (Some(t), Some(c)) if !t.is_empty() && !c.is_empty() => Some((t, c)),
        _ => None,
    }
}

impl OrderNotesProvider {
    async fn parsed_notes(
        store: &dyn OrderStore,
        order_id: i64,
    ) -> SyncResult<Vec<(String, String)>> {
        let notes = store.order_notes(order_id).await?;
        Ok(notes.iter().filter_map(|n| parse_note(n)).collect())
    }
}

#[async_trait]
impl TrackingProvider for OrderNotesProvider {
    fn slug(&self) -> &'static str {
        "order-notes"
    }

    async fn shipping_provider_name(
        &self,
        store: &dyn OrderStore,
        order_id: i64,
    ) -> SyncResult<CourierSource> {
        let parsed = Self::parsed_notes(store, order_id).await?;
        if parsed.is_empty() {
            return Ok(CourierSource::Unknown);
        }
        let map: HashMap<String, String> = parsed.into_iter().collect();
        Ok(CourierSource::PerTracking(map))
    }

    async fn shipping_info(
        &self,
        store: &dyn OrderStore,
        order_id: i64,
    ) -> SyncResult<Vec<ShipmentRecord>> {
        let parsed = Self::parsed_notes(store, order_id).await?;
        if parsed.is_empty() {
            return Ok(Vec::new());
        }
        let product_ids = expand_product_units(&store.line_items(order_id).await?);

        Ok(parsed
            .into_iter()
            .map(|(tracking_number, courier_id)| ShipmentRecord {
                source_order_id: order_id,
                source_product_ids: product_ids.clone(),
                courier_id,
                tracking_number,
            })
            .collect())
    }

    async fn apply_update(&self, ctx: &SyncContext, order_id: i64) -> SyncResult<()> {
        let store = ctx.store.as_ref();
        let stored = store
            .get_attribute(order_id, ATTR_TRACKING_NUMBER)
            .await?
            .unwrap_or_default();
        let existing = split_tracking_numbers(&stored);
        let parsed = Self::parsed_notes(store, order_id).await?;
        let product_ids = expand_product_units(&store.line_items(order_id).await?);

        if parsed.is_empty() {
            // Notes are gone entirely (integration disabled or notes
            // deleted): un-mirror everything previously stored.
            for tracking_number in &existing {
                if let Err(e) = cancel_tracking(ctx, order_id, tracking_number, &product_ids).await
                {
                    warn!(order_id, tracking_number = %tracking_number, error = %e, "cancel failed");
                }
            }
            return Ok(());
        }

        let mut current = Vec::new();
        for (tracking_number, courier_id) in parsed {
            current.push(tracking_number.clone());
            if existing.contains(&tracking_number) {
                continue;
            }

            // Already mirrored remotely (or remote unreachable): leave it.
            match ctx.client.get_shipment(&tracking_number, order_id).await {
                Err(_) => continue,
                Ok(response) if response.status == 200 => continue,
                Ok(_) => {}
            }

            let record = ShipmentRecord {
                source_order_id: order_id,
                source_product_ids: product_ids.clone(),
                courier_id,
                tracking_number: tracking_number.clone(),
            };
            match ctx.client.create_shipment(&tracking_number, &record).await {
                Ok(response) if response.status == 201 || response.status == 409 => {}
                Ok(response) => {
                    warn!(
                        order_id,
                        tracking_number = %tracking_number,
                        status = response.status,
                        endpoint = "shipments",
                        method = "POST",
                        "create shipment rejected"
                    );
                }
                Err(e) => {
                    warn!(order_id, tracking_number = %tracking_number, error = %e, "create shipment failed");
                }
            }
        }

        // Numbers that fell out of the notes are superseded: cancel them.
        for tracking_number in &existing {
            if !current.contains(tracking_number) {
                if let Err(e) = cancel_tracking(ctx, order_id, tracking_number, &product_ids).await
                {
                    warn!(order_id, tracking_number = %tracking_number, error = %e, "cancel failed");
                }
            }
        }

        if !current.is_empty() {
            store
                .set_attributes(
                    order_id,
                    &[(ATTR_TRACKING_NUMBER, join_tracking_numbers(&current))],
                )
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_with_both_fields() {
        let note = "Shipped via ShippingEasy<br/>\
                    Shipping Tracking Number: 9400111899223<br/>\
                    Carrier Key: usps";
        assert_eq!(
            parse_note(note),
            Some(("9400111899223".to_string(), "usps".to_string()))
        );
    }

    #[test]
    fn parses_plain_text_lines() {
        let note = "Shipping Tracking Number: AB12\nCarrier Key: fedex";
        assert_eq!(parse_note(note), Some(("AB12".to_string(), "fedex".to_string())));
    }

    #[test]
    fn note_without_marker_is_ignored() {
        assert_eq!(parse_note("Order refunded by admin"), None);
    }

    #[test]
    fn note_missing_carrier_is_discarded() {
        let note = "Shipping Tracking Number: AB12";
        assert_eq!(parse_note(note), None);
    }
}
