//! In-process catalog store.
//!
//! Each table is a `Vec<Row>` in insertion order behind one
//! [`tokio::sync::RwLock`]. Readers of different tables never contend;
//! writes to the same table are serialized.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, Query, Row, StoreError, Table, stamp};

/// Catalog tables held in memory.
#[derive(Debug)]
pub struct MemoryStore {
    tables: HashMap<Table, RwLock<Vec<Row>>>,
    writes: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store with every table present.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Table::ALL
                .into_iter()
                .map(|table| (table, RwLock::new(Vec::new())))
                .collect(),
            writes: AtomicU64::new(0),
        }
    }

    /// Number of successful inserts, updates and deletes so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(AtomicOrdering::Relaxed)
    }

    fn table(&self, table: Table) -> Result<&RwLock<Vec<Row>>, StoreError> {
        self.tables
            .get(&table)
            .ok_or_else(|| StoreError::Backend(format!("table {table} missing")))
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, AtomicOrdering::Relaxed);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        let rows = self.table(table)?.read().await;
        let mut hits: Vec<Row> = rows
            .iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|(column, value)| row.get(column).unwrap_or(&Value::Null) == value)
            })
            .cloned()
            .collect();
        drop(rows);

        if let Some(order) = &query.order {
            hits.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }

    async fn insert(&self, table: Table, mut row: Row) -> Result<Row, StoreError> {
        let id = stamp(table, &mut row, Utc::now())?;
        let mut rows = self.table(table)?.write().await;
        if rows.iter().any(|existing| row_id(existing) == Some(id)) {
            return Err(StoreError::Backend(format!(
                "duplicate key {id} in {table}"
            )));
        }
        rows.push(row.clone());
        self.record_write();
        Ok(row)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError> {
        let mut rows = self.table(table)?.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row_id(row) == Some(id))
            .ok_or(StoreError::NotFound { table, id })?;
        for (column, value) in patch {
            if column != "id" {
                row.insert(column, value);
            }
        }
        self.record_write();
        Ok(row.clone())
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<u64, StoreError> {
        let mut rows = self.table(table)?.write().await;
        let before = rows.len();
        rows.retain(|row| row_id(row) != Some(id));
        let removed = before - rows.len();
        if removed > 0 {
            self.record_write();
        }
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn count(&self, table: Table) -> Result<u64, StoreError> {
        let len = self.table(table)?.read().await.len();
        Ok(u64::try_from(len).unwrap_or(u64::MAX))
    }
}

fn row_id(row: &Row) -> Option<Uuid> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// Orders JSON scalars the way the SQL backend does: numbers numerically,
/// timestamps chronologically, other strings lexically, nulls last.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.to_lowercase().cmp(&y.to_lowercase()),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        let Value::Object(map) = value else {
            panic!("fixture must be an object");
        };
        map
    }

    #[tokio::test]
    async fn insert_stamps_and_select_orders() {
        let store = MemoryStore::new();
        for (title, date) in [
            ("B", "2025-04-25T10:00:00Z"),
            ("A", "2025-04-24T10:00:00Z"),
            ("C", "2025-04-26T10:00:00+05:30"),
        ] {
            let Ok(_) = store
                .insert(Table::Events, row(json!({"title": title, "date": date})))
                .await
            else {
                panic!("insert failed");
            };
        }
        let Ok(rows) = store
            .select(Table::Events, &Query::all().order_by("date", true))
            .await
        else {
            panic!("select failed");
        };
        let titles: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get("title").and_then(Value::as_str))
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert!(rows.iter().all(|r| r.contains_key("id")));
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test]
    async fn eq_filter_and_limit() {
        let store = MemoryStore::new();
        for year in ["2024", "2025", "2025"] {
            let Ok(_) = store.insert(Table::Gallery, row(json!({"year": year}))).await else {
                panic!("insert failed");
            };
        }
        let Ok(rows) = store
            .select(Table::Gallery, &Query::all().eq("year", "2025"))
            .await
        else {
            panic!("select failed");
        };
        assert_eq!(rows.len(), 2);
        let Ok(rows) = store.select(Table::Gallery, &Query::all().limit(1)).await else {
            panic!("select failed");
        };
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn update_merges_and_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let Ok(inserted) = store
            .insert(Table::Sponsors, row(json!({"name": "Acme", "tier": "gold"})))
            .await
        else {
            panic!("insert failed");
        };
        let Some(id) = row_id(&inserted) else {
            panic!("id stamped");
        };
        let Ok(updated) = store
            .update(Table::Sponsors, id, row(json!({"tier": null})))
            .await
        else {
            panic!("update failed");
        };
        assert_eq!(updated.get("name"), Some(&json!("Acme")));
        assert_eq!(updated.get("tier"), Some(&Value::Null));

        let missing = store
            .update(Table::Sponsors, Uuid::new_v4(), Row::new())
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_and_count() {
        let store = MemoryStore::new();
        let Ok(inserted) = store.insert(Table::Registrations, Row::new()).await else {
            panic!("insert failed");
        };
        let Some(id) = row_id(&inserted) else {
            panic!("id stamped");
        };
        assert_eq!(store.count(Table::Registrations).await.ok(), Some(1));
        assert_eq!(store.delete(Table::Registrations, id).await.ok(), Some(1));
        assert_eq!(store.delete(Table::Registrations, id).await.ok(), Some(0));
        assert_eq!(store.count(Table::Registrations).await.ok(), Some(0));
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4().to_string();
        let Ok(_) = store.insert(Table::Profiles, row(json!({"id": id}))).await else {
            panic!("first insert succeeds");
        };
        assert!(
            store
                .insert(Table::Profiles, row(json!({"id": id})))
                .await
                .is_err()
        );
    }

    #[test]
    fn nulls_sort_last() {
        assert_eq!(compare_values(&Value::Null, &json!(1)), Ordering::Greater);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("A")), Ordering::Greater);
    }
}
