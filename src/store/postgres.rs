//! PostgreSQL implementation of the catalog store.
//!
//! Every table has the same shape: `(id uuid primary key, doc jsonb,
//! created_at timestamptz)`. The full row lives in `doc`; `id` and
//! `created_at` are copied out for keying and default ordering.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{CatalogStore, Query, Row, StoreError, Table, stamp};
use crate::config::PortalConfig;

/// PostgreSQL-backed catalog store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from `config` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] when the database is unreachable or
    /// a migration fails.
    pub async fn connect(config: &PortalConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!("catalog database ready");
        Ok(Self::new(pool))
    }
}

fn into_row(doc: Value) -> Result<Row, StoreError> {
    match doc {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::Decode(format!("expected object, got {other}"))),
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut sql = format!("SELECT doc FROM {table}");
        let mut param = 0usize;
        for (i, _) in query.filters.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            sql.push_str(&format!(
                " {keyword} doc -> ${}::text = ${}::jsonb",
                param + 1,
                param + 2
            ));
            param += 2;
        }
        if let Some(order) = &query.order {
            let direction = if order.ascending {
                "ASC NULLS LAST"
            } else {
                "DESC NULLS FIRST"
            };
            if order.column == "created_at" {
                sql.push_str(&format!(" ORDER BY created_at {direction}"));
            } else {
                sql.push_str(&format!(" ORDER BY doc -> ${}::text {direction}", param + 1));
                param += 1;
            }
        }
        if query.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${}", param + 1));
        }

        let mut q = sqlx::query_scalar::<_, Value>(&sql);
        for (column, value) in &query.filters {
            q = q.bind(column.as_str()).bind(value);
        }
        if let Some(order) = &query.order
            && order.column != "created_at"
        {
            q = q.bind(order.column.as_str());
        }
        if let Some(limit) = query.limit {
            q = q.bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let docs = q.fetch_all(&self.pool).await?;
        docs.into_iter().map(into_row).collect()
    }

    async fn insert(&self, table: Table, mut row: Row) -> Result<Row, StoreError> {
        let now = Utc::now();
        let id = stamp(table, &mut row, now)?;
        let created_at = row
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map_or(now, |t| t.with_timezone(&Utc));

        let doc = sqlx::query_scalar::<_, Value>(&format!(
            "INSERT INTO {table} (id, doc, created_at) VALUES ($1, $2, $3) RETURNING doc"
        ))
        .bind(id)
        .bind(Value::Object(row))
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        into_row(doc)
    }

    async fn update(&self, table: Table, id: Uuid, mut patch: Row) -> Result<Row, StoreError> {
        patch.remove("id");
        let doc = sqlx::query_scalar::<_, Value>(&format!(
            "UPDATE {table} SET doc = doc || $2 WHERE id = $1 RETURNING doc"
        ))
        .bind(id)
        .bind(Value::Object(patch))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { table, id })?;

        into_row(doc)
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self, table: Table) -> Result<u64, StoreError> {
        let n = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }
}
