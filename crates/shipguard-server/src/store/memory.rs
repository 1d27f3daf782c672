//! In-memory order store
//!
//! Backs the test suites and local experiments with the same trait
//! surface and filter semantics as the SQL backends.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shipguard_common::SyncResult;

use super::{LineItem, OrderFilter, OrderRecord, OrderStore};

#[derive(Default)]
struct Inner {
    orders: BTreeMap<i64, OrderRecord>,
    attributes: HashMap<i64, HashMap<String, String>>,
    items: HashMap<i64, Vec<LineItem>>,
    notes: HashMap<i64, Vec<String>>,
    settings: HashMap<String, String>,
    touched: Vec<i64>,
}

#[derive(Default)]
pub struct MemoryOrderStore {
    inner: RwLock<Inner>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: OrderRecord) {
        let mut inner = self.write();
        inner.orders.insert(order.id, order);
    }

    /// Shorthand used by tests: a processing order with one single-unit item.
    pub fn seed_order(&self, id: i64, created_at: DateTime<Utc>) {
        self.insert_order(OrderRecord {
            id,
            number: format!("#{id}"),
            status: "processing".to_string(),
            currency: "USD".to_string(),
            total: 50.0,
            shipping_method: Some("flat_rate".to_string()),
            created_at,
        });
        self.set_line_items(id, vec![LineItem { product_id: 1000 + id, quantity: 1 }]);
    }

    pub fn set_line_items(&self, order_id: i64, items: Vec<LineItem>) {
        self.write().items.insert(order_id, items);
    }

    pub fn add_note(&self, order_id: i64, content: &str) {
        self.write()
            .notes
            .entry(order_id)
            .or_default()
            .push(content.to_string());
    }

    pub fn put_setting(&self, key: &str, value: &str) {
        self.write()
            .settings
            .insert(key.to_string(), value.to_string());
    }

    /// Order ids passed to `touch_order`, in call order.
    pub fn touched_orders(&self) -> Vec<i64> {
        self.read().touched.clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn matches(inner: &Inner, order: &OrderRecord, filter: &OrderFilter) -> bool {
        if !filter.statuses.is_empty() && !filter.statuses.contains(&order.status) {
            return false;
        }
        if let Some(from) = filter.created_from {
            if order.created_at < from {
                return false;
            }
        }
        if let Some(to) = filter.created_to {
            if order.created_at > to {
                return false;
            }
        }
        let attrs = inner.attributes.get(&order.id);
        for key in &filter.attribute_missing {
            if attrs.map(|a| a.contains_key(key)).unwrap_or(false) {
                return false;
            }
        }
        for key in &filter.attribute_not_empty {
            let filled = attrs
                .and_then(|a| a.get(key))
                .map(|v| !v.is_empty())
                .unwrap_or(false);
            if !filled {
                return false;
            }
        }
        true
    }

    fn selection(inner: &Inner, filter: &OrderFilter) -> Vec<OrderRecord> {
        let mut matched: Vec<OrderRecord> = inner
            .orders
            .values()
            .filter(|o| Self::matches(inner, o, filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        matched
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn get_order(&self, order_id: i64) -> SyncResult<Option<OrderRecord>> {
        Ok(self.read().orders.get(&order_id).cloned())
    }

    async fn get_attribute(&self, order_id: i64, key: &str) -> SyncResult<Option<String>> {
        Ok(self
            .read()
            .attributes
            .get(&order_id)
            .and_then(|a| a.get(key))
            .cloned())
    }

    async fn set_attributes(&self, order_id: i64, attrs: &[(&str, String)]) -> SyncResult<()> {
        let mut inner = self.write();
        let entry = inner.attributes.entry(order_id).or_default();
        for (key, value) in attrs {
            entry.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    async fn select_orders(&self, filter: &OrderFilter) -> SyncResult<Vec<OrderRecord>> {
        let inner = self.read();
        let mut matched = Self::selection(&inner, filter);
        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let matched = if offset >= matched.len() {
            Vec::new()
        } else {
            matched.split_off(offset)
        };
        let limited = match filter.limit {
            Some(limit) => matched.into_iter().take(limit.max(0) as usize).collect(),
            None => matched,
        };
        Ok(limited)
    }

    async fn count_orders(&self, filter: &OrderFilter) -> SyncResult<i64> {
        let inner = self.read();
        Ok(Self::selection(&inner, filter).len() as i64)
    }

    async fn line_items(&self, order_id: i64) -> SyncResult<Vec<LineItem>> {
        Ok(self.read().items.get(&order_id).cloned().unwrap_or_default())
    }

    async fn order_notes(&self, order_id: i64) -> SyncResult<Vec<String>> {
        Ok(self.read().notes.get(&order_id).cloned().unwrap_or_default())
    }

    async fn get_setting(&self, key: &str) -> SyncResult<Option<String>> {
        Ok(self.read().settings.get(key).cloned())
    }

    async fn touch_order(&self, order_id: i64) -> SyncResult<()> {
        self.write().touched.push(order_id);
        Ok(())
    }
}
