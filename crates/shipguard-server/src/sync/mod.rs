//! Reconciliation engine
//!
//! The order-sync and shipment-sync state machines, cancellation, the
//! periodic worker passes, and the cron scheduler that drives them.

pub mod cancel;
pub mod order_sync;
pub mod scheduler;
pub mod shipment_sync;
pub mod webhooks;
pub mod workers;

use std::sync::Arc;

use shipguard_common::types::{split_setting_list, SETTING_EXCLUDED_SHIPPING_METHODS};
use shipguard_common::SyncResult;

use crate::remote::ApiClient;
use crate::store::{OrderRecord, OrderStore};
use crate::tracking::TrackingProvider;

/// Everything one reconciliation step needs: the attribute store, the
/// remote client, and the tracking provider set. Shared by the workers,
/// the recovery handlers, and provider-driven updates.
pub struct SyncContext {
    pub store: Arc<dyn OrderStore>,
    pub client: ApiClient,
    pub providers: Vec<Arc<dyn TrackingProvider>>,
}

impl SyncContext {
    pub fn new(
        store: Arc<dyn OrderStore>,
        client: ApiClient,
        providers: Vec<Arc<dyn TrackingProvider>>,
    ) -> Self {
        Self {
            store,
            client,
            providers,
        }
    }

    /// Order-eligibility predicate: an order qualifies for remote tracking
    /// unless its shipping method is in the merchant's excluded set.
    pub async fn is_shipping_method_eligible(&self, order: &OrderRecord) -> SyncResult<bool> {
        let excluded = self
            .store
            .get_setting(SETTING_EXCLUDED_SHIPPING_METHODS)
            .await?
            .unwrap_or_default();
        let excluded = split_setting_list(&excluded);

        Ok(match order.shipping_method.as_deref() {
            Some(method) => !excluded.iter().any(|m| m == method),
            None => true,
        })
    }
}
