//! Fulfillment-fields tracking provider
//!
//! Reads the fixed order attributes a field-based fulfillment integration
//! maintains: `tracking_code`, `carrier_name`, and `picked_up`. A set
//! `picked_up` flag means the order was fulfilled locally and has nothing
//! to mirror.

use async_trait::async_trait;
use shipguard_common::types::{
    courier_slug, ATTR_SHIPMENT_API_CALLED, ATTR_TRACKING_NUMBER, ATTR_TRACKING_PROVIDER,
    FLAG_SUCCESS,
};
use shipguard_common::{ShipmentRecord, SyncResult};
use tracing::warn;

use super::{CourierSource, TrackingProvider};
use crate::store::{expand_product_units, OrderStore};
use crate::sync::{cancel::cancel_tracking, SyncContext};

const FIELD_TRACKING_CODE: &str = "tracking_code";
const FIELD_CARRIER_NAME: &str = "carrier_name";
const FIELD_PICKED_UP: &str = "picked_up";

pub struct FulfillmentFieldsProvider;

impl FulfillmentFieldsProvider {
    /// Current tracking code, unless the order was locally fulfilled.
    async fn current_tracking(
        store: &dyn OrderStore,
        order_id: i64,
    ) -> SyncResult<Option<String>> {
        let picked_up = store
            .get_attribute(order_id, FIELD_PICKED_UP)
            .await?
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        if picked_up {
            return Ok(None);
        }
        Ok(store
            .get_attribute(order_id, FIELD_TRACKING_CODE)
            .await?
            .filter(|t| !t.is_empty()))
    }

    async fn courier_id(store: &dyn OrderStore, order_id: i64) -> SyncResult<String> {
        let carrier = store
            .get_attribute(order_id, FIELD_CARRIER_NAME)
            .await?
            .unwrap_or_default();
        Ok(courier_slug(&carrier))
    }
}

#[async_trait]
impl TrackingProvider for FulfillmentFieldsProvider {
    fn slug(&self) -> &'static str {
        "fulfillment-fields"
    }

    async fn shipping_provider_name(
        &self,
        store: &dyn OrderStore,
        order_id: i64,
    ) -> SyncResult<CourierSource> {
        match store.get_attribute(order_id, ATTR_TRACKING_PROVIDER).await? {
            Some(provider) if !provider.is_empty() => Ok(CourierSource::Single(provider)),
            _ => Ok(CourierSource::Unknown),
        }
    }

    async fn shipping_info(
        &self,
        store: &dyn OrderStore,
        order_id: i64,
    ) -> SyncResult<Vec<ShipmentRecord>> {
        let Some(tracking_number) = Self::current_tracking(store, order_id).await? else {
            return Ok(Vec::new());
        };

        Ok(vec![ShipmentRecord {
            source_order_id: order_id,
            source_product_ids: expand_product_units(&store.line_items(order_id).await?),
            courier_id: Self::courier_id(store, order_id).await?,
            tracking_number,
        }])
    }

    async fn apply_update(&self, ctx: &SyncContext, order_id: i64) -> SyncResult<()> {
        let store = ctx.store.as_ref();
        let Some(tracking_number) = Self::current_tracking(store, order_id).await? else {
            return Ok(());
        };

        let courier_id = Self::courier_id(store, order_id).await?;
        let product_ids = expand_product_units(&store.line_items(order_id).await?);

        // A changed tracking number supersedes the mirrored one.
        let previous = store
            .get_attribute(order_id, ATTR_TRACKING_NUMBER)
            .await?
            .unwrap_or_default();
        if !previous.is_empty() && previous != tracking_number {
            if let Err(e) = cancel_tracking(ctx, order_id, &previous, &product_ids).await {
                warn!(order_id, tracking_number = %previous, error = %e, "cancel failed");
            }
        }

        match ctx.client.get_shipment(&tracking_number, order_id).await {
            Err(_) => return Ok(()),
            Ok(response) if response.status == 200 => return Ok(()),
            Ok(_) => {}
        }

        let record = ShipmentRecord {
            source_order_id: order_id,
            source_product_ids: product_ids,
            courier_id: courier_id.clone(),
            tracking_number: tracking_number.clone(),
        };
        match ctx.client.create_shipment(&tracking_number, &record).await {
            Ok(response) if response.status == 201 || response.status == 409 => {
                store
                    .set_attributes(
                        order_id,
                        &[
                            (ATTR_SHIPMENT_API_CALLED, FLAG_SUCCESS.to_string()),
                            (ATTR_TRACKING_NUMBER, tracking_number),
                            (ATTR_TRACKING_PROVIDER, courier_id),
                        ],
                    )
                    .await?;
            }
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

        Ok(())
    }
}
