//! Tracking-data providers
//!
//! Third-party fulfillment integrations record tracking data in different
//! places on the host platform. Each integration this service can read
//! from is one [`TrackingProvider`] variant producing canonical
//! [`ShipmentRecord`]s; the engine only ever talks to the trait, so new
//! variants slot in without engine changes. At most one variant is
//! expected active at a time; [`active_provider`] probes the host's
//! integration settings and returns the first match.

pub mod fulfillment_fields;
pub mod order_notes;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shipguard_common::types::{split_setting_list, SETTING_ACTIVE_INTEGRATIONS};
use shipguard_common::{ShipmentRecord, SyncResult};

use crate::store::OrderStore;
use crate::sync::SyncContext;

pub use fulfillment_fields::FulfillmentFieldsProvider;
pub use order_notes::OrderNotesProvider;

/// How a provider names couriers: one id for the whole order, or one id
/// per tracking number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourierSource {
    Unknown,
    Single(String),
    PerTracking(HashMap<String, String>),
}

impl CourierSource {
    /// Courier id for one tracking number, if the source knows it.
    pub fn resolve(&self, tracking_number: &str) -> Option<String> {
        match self {
            CourierSource::Unknown => None,
            CourierSource::Single(id) => Some(id.clone()),
            CourierSource::PerTracking(map) => map.get(tracking_number).cloned(),
        }
    }
}

/// One third-party tracking integration the service can read from.
#[async_trait]
pub trait TrackingProvider: Send + Sync {
    /// Stable identifier, matched against the host's active-integrations
    /// setting.
    fn slug(&self) -> &'static str;

    /// Is this integration currently enabled on the host platform?
    async fn is_active(&self, store: &dyn OrderStore) -> SyncResult<bool> {
        let active = store
            .get_setting(SETTING_ACTIVE_INTEGRATIONS)
            .await?
            .unwrap_or_default();
        Ok(split_setting_list(&active).iter().any(|s| s == self.slug()))
    }

    /// Courier naming for the order.
    async fn shipping_provider_name(
        &self,
        store: &dyn OrderStore,
        order_id: i64,
    ) -> SyncResult<CourierSource>;

    /// Live canonical shipment records for the order, read from the
    /// integration's own storage.
    async fn shipping_info(
        &self,
        store: &dyn OrderStore,
        order_id: i64,
    ) -> SyncResult<Vec<ShipmentRecord>>;

    /// Provider-driven push: reconcile the integration's current tracking
    /// data against what was previously mirrored, cancelling superseded
    /// numbers and creating new ones.
    async fn apply_update(&self, ctx: &SyncContext, order_id: i64) -> SyncResult<()>;
}

/// The first active provider, if any integration is enabled.
pub async fn active_provider(
    providers: &[Arc<dyn TrackingProvider>],
    store: &dyn OrderStore,
) -> SyncResult<Option<Arc<dyn TrackingProvider>>> {
    for provider in providers {
        if provider.is_active(store).await? {
            return Ok(Some(provider.clone()));
        }
    }
    Ok(None)
}

/// The default provider set, in probe order.
pub fn default_providers() -> Vec<Arc<dyn TrackingProvider>> {
    vec![
        Arc::new(OrderNotesProvider),
        Arc::new(FulfillmentFieldsProvider),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_source_resolution() {
        assert_eq!(CourierSource::Unknown.resolve("X"), None);
        assert_eq!(
            CourierSource::Single("usps".into()).resolve("X"),
            Some("usps".into())
        );

        let mut map = HashMap::new();
        map.insert("X".to_string(), "fedex".to_string());
        let per_tracking = CourierSource::PerTracking(map);
        assert_eq!(per_tracking.resolve("X"), Some("fedex".into()));
        assert_eq!(per_tracking.resolve("Y"), None);
    }
}
