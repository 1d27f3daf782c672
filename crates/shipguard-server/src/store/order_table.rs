//! First-class order record backend
//!
//! The newer host schema keeps attributes as a JSONB document on the
//! `orders` row itself, which makes a multi-key attribute write a single
//! atomic statement.

use async_trait::async_trait;
use shipguard_common::SyncResult;
use sqlx::{PgPool, QueryBuilder};

use super::{db_error, LineItem, OrderFilter, OrderRecord, OrderStore};

const SELECT_COLUMNS: &str = "o.id, o.number, o.status, o.currency, \
     o.total::FLOAT8 AS total, o.shipping_method, o.created_at";

pub struct OrderTableStore {
    pool: PgPool,
}

impl OrderTableStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filter<'a>(qb: &mut QueryBuilder<'a, sqlx::Postgres>, filter: &'a OrderFilter) {
        if !filter.statuses.is_empty() {
            qb.push(" AND o.status = ANY(");
            qb.push_bind(&filter.statuses);
            qb.push(")");
        }
        if let Some(from) = filter.created_from {
            qb.push(" AND o.created_at >= ");
            qb.push_bind(from);
        }
        if let Some(to) = filter.created_to {
            qb.push(" AND o.created_at <= ");
            qb.push_bind(to);
        }
        for key in &filter.attribute_missing {
            qb.push(" AND NOT jsonb_exists(COALESCE(o.attributes, '{}'::jsonb), ");
            qb.push_bind(key);
            qb.push(")");
        }
        for key in &filter.attribute_not_empty {
            qb.push(" AND COALESCE(o.attributes->>");
            qb.push_bind(key);
            qb.push(", '') <> ''");
        }
    }
}

#[async_trait]
impl OrderStore for OrderTableStore {
    async fn get_order(&self, order_id: i64) -> SyncResult<Option<OrderRecord>> {
        sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders o WHERE o.id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn get_attribute(&self, order_id: i64, key: &str) -> SyncResult<Option<String>> {
        let value: Option<Option<String>> =
            sqlx::query_scalar("SELECT attributes->>$2 FROM orders WHERE id = $1")
                .bind(order_id)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(value.flatten())
    }

    async fn set_attributes(&self, order_id: i64, attrs: &[(&str, String)]) -> SyncResult<()> {
        let mut patch = serde_json::Map::new();
        for (key, value) in attrs {
            patch.insert(key.to_string(), serde_json::Value::String(value.clone()));
        }

        sqlx::query(
            "UPDATE orders \
             SET attributes = COALESCE(attributes, '{}'::jsonb) || $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(order_id)
        .bind(serde_json::Value::Object(patch))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn select_orders(&self, filter: &OrderFilter) -> SyncResult<Vec<OrderRecord>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM orders o WHERE TRUE"
        ));
        Self::push_filter(&mut qb, filter);
        qb.push(" ORDER BY o.created_at, o.id");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }
        if let Some(offset) = filter.offset {
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }

        qb.build_query_as::<OrderRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn count_orders(&self, filter: &OrderFilter) -> SyncResult<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM orders o WHERE TRUE");
        Self::push_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn line_items(&self, order_id: i64) -> SyncResult<Vec<LineItem>> {
        sqlx::query_as::<_, LineItem>(
            "SELECT product_id, quantity FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn order_notes(&self, order_id: i64) -> SyncResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT content FROM order_notes \
             WHERE order_id = $1 AND note_type = 'system' ORDER BY created_at, id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn get_setting(&self, key: &str) -> SyncResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn touch_order(&self, order_id: i64) -> SyncResult<()> {
        sqlx::query("UPDATE orders SET updated_at = NOW() WHERE id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
