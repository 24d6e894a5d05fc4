//! Store abstraction used by the loader and the verifier.

use crate::insert::InsertStatement;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use event_core::EventType;
use uuid::Uuid;

/// Backend-neutral error returned by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or refused the session.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// A statement was rejected or failed while running.
    #[error("Query failed: {0}")]
    Query(String),

    /// Error raised by the underlying driver.
    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The connection was already closed.
    #[error("Connection is closed")]
    Closed,

    /// A stored row could not be decoded.
    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
}

/// Write side of a store connection.
///
/// `execute` runs inside a transaction, opening one if none is active;
/// `commit` and `rollback` end it.
#[async_trait]
pub trait Connection: Send {
    /// Execute a multi-row insert. Returns the number of rows written.
    async fn execute(&mut self, statement: &InsertStatement) -> Result<u64, StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    async fn rollback(&mut self) -> Result<(), StoreError>;

    /// Create `table` unless it already exists. Never alters an existing table.
    async fn create_table(&mut self, table: &str) -> Result<(), StoreError>;

    /// Release the connection. Any open transaction is discarded.
    async fn close(&mut self) -> Result<(), StoreError>;
}

/// Number of rows for one `event_type` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCount {
    pub event_type: String,
    pub count: u64,
}

/// How events spread over users.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserActivity {
    pub distinct_users: u64,
    pub avg_events_per_user: f64,
}

/// Earliest and latest stored timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

/// A row read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub user_id: String,
    pub event_type: String,
    pub timestamp: NaiveDateTime,
    pub payload: serde_json::Value,
}

/// Read-only aggregate queries over the events table.
#[async_trait]
pub trait EventQueries: Send {
    async fn total_events(&mut self, table: &str) -> Result<u64, StoreError>;

    /// Row count per event type, largest first.
    async fn counts_by_type(&mut self, table: &str) -> Result<Vec<TypeCount>, StoreError>;

    async fn user_activity(&mut self, table: &str) -> Result<UserActivity, StoreError>;

    /// `None` when the table is empty.
    async fn time_range(&mut self, table: &str) -> Result<Option<TimeRange>, StoreError>;

    /// Text of the first non-null payload field among `keys` for one row of
    /// `event_type`, or `None` when no such row exists.
    async fn sample_payload_field(
        &mut self,
        table: &str,
        event_type: EventType,
        keys: &[&str],
    ) -> Result<Option<String>, StoreError>;

    async fn fetch_event(
        &mut self,
        table: &str,
        event_id: Uuid,
    ) -> Result<Option<StoredEvent>, StoreError>;
}
