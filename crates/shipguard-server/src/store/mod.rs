//! Order attribute store
//!
//! The host platform persists orders in one of two shapes: a legacy
//! key-value meta table keyed by order id, or a newer first-class order
//! record with an attribute document. Both are exposed through the one
//! [`OrderStore`] trait; the reconciliation engine never branches on the
//! storage shape. The backend is picked once at startup by
//! [`detect_backend`].

pub mod memory;
pub mod meta_table;
pub mod order_table;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shipguard_common::{SyncError, SyncResult};
use sqlx::PgPool;

pub use memory::MemoryOrderStore;
pub use meta_table::MetaTableStore;
pub use order_table::OrderTableStore;

/// One order as returned by selection queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: i64,
    pub number: String,
    pub status: String,
    pub currency: String,
    pub total: f64,
    pub shipping_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One order line item.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LineItem {
    pub product_id: i64,
    pub quantity: i32,
}

/// Expand line items into one product id per unit, the granularity the
/// remote side tracks protection at.
pub fn expand_product_units(items: &[LineItem]) -> Vec<i64> {
    let mut product_ids = Vec::new();
    for item in items {
        for _ in 0..item.quantity.max(0) {
            product_ids.push(item.product_id);
        }
    }
    product_ids
}

/// Selection filter for orders.
///
/// Both creation-date bounds are inclusive and independently applied.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub statuses: Vec<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub attribute_missing: Vec<String>,
    pub attribute_not_empty: Vec<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses<I: IntoIterator<Item = String>>(mut self, statuses: I) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn created_on_or_after(mut self, when: DateTime<Utc>) -> Self {
        self.created_from = Some(when);
        self
    }

    pub fn created_on_or_before(mut self, when: DateTime<Utc>) -> Self {
        self.created_to = Some(when);
        self
    }

    pub fn attribute_missing(mut self, key: &str) -> Self {
        self.attribute_missing.push(key.to_string());
        self
    }

    pub fn attribute_not_empty(mut self, key: &str) -> Self {
        self.attribute_not_empty.push(key.to_string());
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Uniform access to order attributes, selection, and host settings.
///
/// `set_attributes` must apply all keys of one call atomically with respect
/// to readers of the same order.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_order(&self, order_id: i64) -> SyncResult<Option<OrderRecord>>;

    async fn get_attribute(&self, order_id: i64, key: &str) -> SyncResult<Option<String>>;

    async fn set_attributes(&self, order_id: i64, attrs: &[(&str, String)]) -> SyncResult<()>;

    /// Orders matching the filter, in creation order.
    async fn select_orders(&self, filter: &OrderFilter) -> SyncResult<Vec<OrderRecord>>;

    async fn count_orders(&self, filter: &OrderFilter) -> SyncResult<i64>;

    async fn line_items(&self, order_id: i64) -> SyncResult<Vec<LineItem>>;

    /// System note bodies for the order, oldest first.
    async fn order_notes(&self, order_id: i64) -> SyncResult<Vec<String>>;

    async fn get_setting(&self, key: &str) -> SyncResult<Option<String>>;

    /// Force a full re-save of the order, triggering the host platform's
    /// own order-update side effects (e.g. an update webhook). Does not
    /// touch attributes.
    async fn touch_order(&self, order_id: i64) -> SyncResult<()>;
}

/// Convenience: is the attribute present and non-empty?
pub async fn attribute_filled(
    store: &dyn OrderStore,
    order_id: i64,
    key: &str,
) -> SyncResult<bool> {
    Ok(store
        .get_attribute(order_id, key)
        .await?
        .map(|v| !v.is_empty())
        .unwrap_or(false))
}

pub(crate) fn db_error(e: sqlx::Error) -> SyncError {
    SyncError::Store(e.to_string())
}

/// Which storage shape the host database uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackendKind {
    /// Legacy `order_meta` key-value table.
    MetaTable,
    /// First-class `orders.attributes` document column.
    OrderTable,
}

/// Feature-detect the storage shape: the newer backend is in use when the
/// `orders` table carries an `attributes` column.
pub async fn detect_backend(pool: &PgPool) -> SyncResult<StoreBackendKind> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1::BIGINT FROM information_schema.columns \
         WHERE table_name = 'orders' AND column_name = 'attributes'",
    )
    .fetch_optional(pool)
    .await
    .map_err(|e| SyncError::Store(e.to_string()))?;

    Ok(if row.is_some() {
        StoreBackendKind::OrderTable
    } else {
        StoreBackendKind::MetaTable
    })
}

/// Build the detected backend over the pool.
pub async fn open(pool: PgPool) -> SyncResult<std::sync::Arc<dyn OrderStore>> {
    let kind = detect_backend(&pool).await?;
    tracing::info!(backend = ?kind, "order store backend detected");

    Ok(match kind {
        StoreBackendKind::MetaTable => std::sync::Arc::new(MetaTableStore::new(pool)),
        StoreBackendKind::OrderTable => std::sync::Arc::new(OrderTableStore::new(pool)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_product_units_repeats_per_quantity() {
        let items = vec![
            LineItem { product_id: 11, quantity: 2 },
            LineItem { product_id: 12, quantity: 1 },
        ];
        assert_eq!(expand_product_units(&items), vec![11, 11, 12]);
    }

    #[test]
    fn expand_product_units_ignores_nonpositive_quantities() {
        let items = vec![LineItem { product_id: 11, quantity: 0 }];
        assert!(expand_product_units(&items).is_empty());
    }
}
