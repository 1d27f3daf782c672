//! Legacy key-value attribute backend
//!
//! Attributes live in an `order_meta(order_id, meta_key, meta_value)` table
//! next to the base `orders` table. Attribute predicates in selection
//! queries become EXISTS/NOT EXISTS subqueries against the meta table.

use async_trait::async_trait;
use shipguard_common::SyncResult;
use sqlx::{PgPool, QueryBuilder};

use super::{db_error, LineItem, OrderFilter, OrderRecord, OrderStore};

const SELECT_COLUMNS: &str = "o.id, o.number, o.status, o.currency, \
     o.total::FLOAT8 AS total, o.shipping_method, o.created_at";

pub struct MetaTableStore {
    pool: PgPool,
}

impl MetaTableStore {
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
            qb.push(
                " AND NOT EXISTS (SELECT 1 FROM order_meta m \
                 WHERE m.order_id = o.id AND m.meta_key = ",
            );
            qb.push_bind(key);
            qb.push(")");
        }
        for key in &filter.attribute_not_empty {
            qb.push(
                " AND EXISTS (SELECT 1 FROM order_meta m \
                 WHERE m.order_id = o.id AND m.meta_key = ",
            );
            qb.push_bind(key);
            qb.push(" AND m.meta_value <> '')");
        }
    }
}

#[async_trait]
impl OrderStore for MetaTableStore {
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
        sqlx::query_scalar::<_, String>(
            "SELECT meta_value FROM order_meta WHERE order_id = $1 AND meta_key = $2",
        )
        .bind(order_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn set_attributes(&self, order_id: i64, attrs: &[(&str, String)]) -> SyncResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        for (key, value) in attrs {
            sqlx::query(
                "INSERT INTO order_meta (order_id, meta_key, meta_value) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (order_id, meta_key) \
                 DO UPDATE SET meta_value = EXCLUDED.meta_value",
            )
            .bind(order_id)
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }
        tx.commit().await.map_err(db_error)
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
