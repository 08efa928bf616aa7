//! Catalog store: document tables keyed by UUID.
//!
//! The [`CatalogStore`] trait is the seam between the service layer and
//! storage. Rows are JSON objects; the service layer encodes domain types
//! into rows and decodes them back with [`encode`] and [`decode`].
//!
//! Two implementations exist:
//!
//! - [`MemoryStore`]: process-local tables, used by tests and when
//!   persistence is disabled.
//! - [`PostgresStore`]: JSONB document tables in PostgreSQL.

pub mod memory;
pub mod postgres;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// A stored document.
pub type Row = serde_json::Map<String, Value>;

/// The catalog's tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Festival events.
    Events,
    /// Gallery images.
    Gallery,
    /// Sponsors.
    Sponsors,
    /// Registrations.
    Registrations,
    /// User profiles.
    Profiles,
    /// Sign-in accounts owned by the identity provider.
    Accounts,
}

impl Table {
    /// Every table.
    pub const ALL: [Self; 6] = [
        Self::Events,
        Self::Gallery,
        Self::Sponsors,
        Self::Registrations,
        Self::Profiles,
        Self::Accounts,
    ];

    /// SQL table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Gallery => "gallery",
            Self::Sponsors => "sponsors",
            Self::Registrations => "registrations",
            Self::Profiles => "profiles",
            Self::Accounts => "accounts",
        }
    }

    /// Whether rows carry an `updated_at` column.
    #[must_use]
    pub const fn tracks_updates(self) -> bool {
        matches!(self, Self::Events | Self::Sponsors)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort key of a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Column to sort by.
    pub column: String,
    /// `true` for ascending.
    pub ascending: bool,
}

/// Equality filters, one sort key and an optional limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// `(column, value)` pairs that must all match.
    pub filters: Vec<(String, Value)>,
    /// Sort key; unordered when absent.
    pub order: Option<Order>,
    /// Maximum number of rows.
    pub limit: Option<usize>,
}

impl Query {
    /// Selects every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    /// Sets the sort key.
    #[must_use]
    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    /// Caps the number of rows returned.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Errors raised by a [`CatalogStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend failed (connection, SQL, I/O).
    #[error("store backend error: {0}")]
    Backend(String),

    /// No row with this id.
    #[error("{table} row {id} not found")]
    NotFound {
        /// Table searched.
        table: Table,
        /// Missing id.
        id: Uuid,
    },

    /// A row could not be converted to or from its domain type.
    #[error("malformed row: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Table storage used by the catalog service.
///
/// Every mutating call either fully applies or leaves the table unchanged.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync + fmt::Debug {
    /// Returns the rows matching `query`.
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Inserts a row and returns it as stored. A missing `id` is generated
    /// and missing timestamps are stamped with the current time.
    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Merges `patch` into the row with `id` and returns the result.
    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError>;

    /// Deletes the row with `id`; returns the number of rows removed.
    async fn delete(&self, table: Table, id: Uuid) -> Result<u64, StoreError>;

    /// Exact row count.
    async fn count(&self, table: Table) -> Result<u64, StoreError>;
}

/// Fills in `id`, `created_at` and (where tracked) `updated_at` when the
/// caller did not supply them, and returns the row id.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] when a supplied `id` is not a UUID.
pub fn stamp(table: Table, row: &mut Row, now: DateTime<Utc>) -> Result<Uuid, StoreError> {
    let id = match row.get("id") {
        Some(Value::String(text)) => Uuid::parse_str(text)
            .map_err(|e| StoreError::Decode(format!("{table}.id: {e}")))?,
        Some(Value::Null) | None => Uuid::new_v4(),
        Some(other) => return Err(StoreError::Decode(format!("{table}.id: {other}"))),
    };
    row.insert("id".into(), Value::String(id.to_string()));
    let now = Value::String(now.to_rfc3339());
    if !row.contains_key("created_at") {
        row.insert("created_at".into(), now.clone());
    }
    if table.tracks_updates() && !row.contains_key("updated_at") {
        row.insert("updated_at".into(), now);
    }
    Ok(id)
}

/// Serializes a domain value into a row.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] unless `value` serializes to an object.
pub fn encode<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::Decode(format!("expected object, got {other}"))),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}

/// Deserializes a row into a domain value.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] when the row does not match `T`.
pub fn decode<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Deserializes every row, failing on the first malformed one.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] for the first row that does not match `T`.
pub fn decode_all<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter().map(decode).collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn stamp_generates_id_and_timestamps() {
        let mut row = Row::new();
        let now = Utc::now();
        let Ok(id) = stamp(Table::Events, &mut row, now) else {
            panic!("stamp failed");
        };
        assert_eq!(row.get("id"), Some(&Value::String(id.to_string())));
        assert!(row.contains_key("created_at"));
        assert!(row.contains_key("updated_at"));
    }

    #[test]
    fn stamp_keeps_supplied_id() {
        let id = Uuid::new_v4();
        let mut row = Row::new();
        row.insert("id".into(), Value::String(id.to_string()));
        let Ok(stamped) = stamp(Table::Profiles, &mut row, Utc::now()) else {
            panic!("stamp failed");
        };
        assert_eq!(stamped, id);
        assert!(!row.contains_key("updated_at"));
    }

    #[test]
    fn stamp_rejects_bad_id() {
        let mut row = Row::new();
        row.insert("id".into(), Value::String("nope".into()));
        assert!(stamp(Table::Gallery, &mut row, Utc::now()).is_err());
    }

    #[test]
    fn query_builder() {
        let q = Query::all().eq("year", "2025").order_by("created_at", false).limit(3);
        assert_eq!(q.filters.len(), 1);
        assert_eq!(q.limit, Some(3));
        assert_eq!(
            q.order,
            Some(Order {
                column: "created_at".to_string(),
                ascending: false
            })
        );
    }

    #[test]
    fn encode_rejects_non_objects() {
        assert!(encode(&42).is_err());
        assert!(encode(&serde_json::json!({"a": 1})).is_ok());
    }
}
