//! In-process store backend.
//!
//! Used for `--dry-run` and in tests. Rows become visible only on commit,
//! payloads are kept as JSON text and parsed again when read back, and
//! execute/commit/query failures can be injected.

use crate::connect::Connector;
use crate::insert::InsertStatement;
use crate::store::{
    Connection, EventQueries, StoreError, StoredEvent, TimeRange, TypeCount, UserActivity,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use event_core::EventType;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredRow {
    event_id: Uuid,
    user_id: String,
    event_type: String,
    timestamp: NaiveDateTime,
    payload_text: String,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<StoredRow>,
    batch_sizes: Vec<usize>,
}

#[derive(Debug, Default)]
struct StoreState {
    tables: HashMap<String, Table>,
    executes: u64,
    commits: u64,
    rollbacks: u64,
    closes: u64,
    fail_execute_on: Option<u64>,
    fail_commit_on: Option<u64>,
    fail_queries: bool,
    fail_create_table: bool,
}

/// Shared in-memory database. Clones refer to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open a connection to this store.
    pub fn connect(&self) -> MemoryConnection {
        MemoryConnection {
            store: self.clone(),
            pending: HashMap::new(),
            closed: false,
        }
    }

    /// Make the `n`-th execute call (one-based, store-wide) fail.
    pub fn fail_execute_on(&self, n: u64) {
        self.state().fail_execute_on = Some(n);
    }

    /// Make the `n`-th commit call (one-based, store-wide) fail.
    pub fn fail_commit_on(&self, n: u64) {
        self.state().fail_commit_on = Some(n);
    }

    /// Make table creation fail.
    pub fn fail_create_table(&self) {
        self.state().fail_create_table = true;
    }

    /// Whether `table` exists, created explicitly or by a commit.
    pub fn has_table(&self, table: &str) -> bool {
        self.state().tables.contains_key(table)
    }

    /// Make every read query fail.
    pub fn fail_queries(&self) {
        self.state().fail_queries = true;
    }

    pub fn committed_rows(&self, table: &str) -> usize {
        self.state().tables.get(table).map_or(0, |t| t.rows.len())
    }

    /// Sizes of the committed transactions, in commit order.
    pub fn batch_sizes(&self, table: &str) -> Vec<usize> {
        self.state()
            .tables
            .get(table)
            .map(|t| t.batch_sizes.clone())
            .unwrap_or_default()
    }

    pub fn execute_count(&self) -> u64 {
        self.state().executes
    }

    pub fn commit_count(&self) -> u64 {
        self.state().commits
    }

    pub fn rollback_count(&self) -> u64 {
        self.state().rollbacks
    }

    /// Number of connections closed so far.
    pub fn close_count(&self) -> u64 {
        self.state().closes
    }
}

/// Connection to a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryConnection {
    store: MemoryStore,
    pending: HashMap<String, Vec<StoredRow>>,
    closed: bool,
}

impl MemoryConnection {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    /// Committed rows of `table`, checked for open connection and injected faults.
    fn read<T>(&self, table: &str, f: impl FnOnce(&[StoredRow]) -> T) -> Result<T, StoreError> {
        self.ensure_open()?;
        let state = self.store.state();
        if state.fail_queries {
            return Err(StoreError::Query("injected query failure".to_string()));
        }
        let rows = state
            .tables
            .get(table)
            .map(|t| t.rows.as_slice())
            .unwrap_or(&[]);
        Ok(f(rows))
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn execute(&mut self, statement: &InsertStatement) -> Result<u64, StoreError> {
        self.ensure_open()?;
        {
            let mut state = self.store.state();
            state.executes += 1;
            if state.fail_execute_on == Some(state.executes) {
                return Err(StoreError::Query(format!(
                    "injected failure on execute #{}",
                    state.executes
                )));
            }
        }

        let rows = statement.rows().iter().map(|row| StoredRow {
            event_id: row.event_id,
            user_id: row.user_id.clone(),
            event_type: row.event_type.as_str().to_string(),
            timestamp: row.timestamp,
            payload_text: row.payload.to_string(),
        });
        self.pending
            .entry(statement.table().to_string())
            .or_default()
            .extend(rows);

        Ok(statement.len() as u64)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut state = self.store.state();
        state.commits += 1;
        if state.fail_commit_on == Some(state.commits) {
            return Err(StoreError::Query(format!(
                "injected failure on commit #{}",
                state.commits
            )));
        }
        for (table, rows) in self.pending.drain() {
            let target = state.tables.entry(table).or_default();
            target.batch_sizes.push(rows.len());
            target.rows.extend(rows);
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.pending.clear();
        self.store.state().rollbacks += 1;
        Ok(())
    }

    async fn create_table(&mut self, table: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut state = self.store.state();
        if state.fail_create_table {
            return Err(StoreError::Query("injected create table failure".to_string()));
        }
        state.tables.entry(table.to_string()).or_default();
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pending.clear();
        if !self.closed {
            self.store.state().closes += 1;
        }
        self.closed = true;
        Ok(())
    }
}

#[async_trait]
impl EventQueries for MemoryConnection {
    async fn total_events(&mut self, table: &str) -> Result<u64, StoreError> {
        self.read(table, |rows| rows.len() as u64)
    }

    async fn counts_by_type(&mut self, table: &str) -> Result<Vec<TypeCount>, StoreError> {
        self.read(table, |rows| {
            let mut counts: HashMap<&str, u64> = HashMap::new();
            for row in rows {
                *counts.entry(row.event_type.as_str()).or_default() += 1;
            }
            let mut counts: Vec<TypeCount> = counts
                .into_iter()
                .map(|(event_type, count)| TypeCount {
                    event_type: event_type.to_string(),
                    count,
                })
                .collect();
            counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.event_type.cmp(&b.event_type)));
            counts
        })
    }

    async fn user_activity(&mut self, table: &str) -> Result<UserActivity, StoreError> {
        self.read(table, |rows| {
            let users: HashSet<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
            let distinct_users = users.len() as u64;
            let avg_events_per_user = if distinct_users == 0 {
                0.0
            } else {
                rows.len() as f64 / distinct_users as f64
            };
            UserActivity {
                distinct_users,
                avg_events_per_user,
            }
        })
    }

    async fn time_range(&mut self, table: &str) -> Result<Option<TimeRange>, StoreError> {
        self.read(table, |rows| {
            let first = rows.iter().map(|r| r.timestamp).min()?;
            let last = rows.iter().map(|r| r.timestamp).max()?;
            Some(TimeRange { first, last })
        })
    }

    async fn sample_payload_field(
        &mut self,
        table: &str,
        event_type: EventType,
        keys: &[&str],
    ) -> Result<Option<String>, StoreError> {
        let payload_text = self.read(table, |rows| {
            rows.iter()
                .find(|r| r.event_type == event_type.as_str())
                .map(|r| r.payload_text.clone())
        })?;
        let Some(payload_text) = payload_text else {
            return Ok(None);
        };

        let doc: serde_json::Value = serde_json::from_str(&payload_text)
            .map_err(|e| StoreError::InvalidRow(e.to_string()))?;
        Ok(keys.iter().find_map(|key| match doc.get(*key) {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }))
    }

    async fn fetch_event(
        &mut self,
        table: &str,
        event_id: Uuid,
    ) -> Result<Option<StoredEvent>, StoreError> {
        let row = self.read(table, |rows| {
            rows.iter().find(|r| r.event_id == event_id).cloned()
        })?;
        row.map(|row| {
            let payload = serde_json::from_str(&row.payload_text)
                .map_err(|e| StoreError::InvalidRow(e.to_string()))?;
            Ok(StoredEvent {
                event_id: row.event_id,
                user_id: row.user_id,
                event_type: row.event_type,
                timestamp: row.timestamp,
                payload,
            })
        })
        .transpose()
    }
}

/// [`Connector`] for a [`MemoryStore`] that can refuse its first attempts.
#[derive(Debug)]
pub struct MemoryConnector {
    store: MemoryStore,
    failures_left: AtomicU32,
    attempts: AtomicU32,
}

impl MemoryConnector {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            failures_left: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
        }
    }

    /// Refuse the first `n` connection attempts.
    pub fn failing_first(self, n: u32) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    /// Number of connection attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    fn endpoint(&self) -> String {
        "memory".to_string()
    }

    async fn connect(&self) -> Result<MemoryConnection, StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let refused = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(StoreError::Connect(format!(
                "memory store refused attempt {attempt}"
            )));
        }
        Ok(self.store.connect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_generator::{EventGenerator, GeneratorConfig, TimeWindow};

    fn statement(count: u64) -> (Vec<event_core::Event>, InsertStatement) {
        let config = GeneratorConfig::default()
            .with_window(TimeWindow::parse("2025-05-01", "2025-05-02").unwrap());
        let events = EventGenerator::new(config, 8).unwrap().generate(count);
        let statement = InsertStatement::new("events", &events);
        (events, statement)
    }

    #[tokio::test]
    async fn test_rows_visible_only_after_commit() {
        let store = MemoryStore::new();
        let mut conn = store.connect();
        let (_, stmt) = statement(3);

        assert_eq!(conn.execute(&stmt).await.unwrap(), 3);
        assert_eq!(conn.total_events("events").await.unwrap(), 0);

        conn.commit().await.unwrap();
        assert_eq!(conn.total_events("events").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_table_keeps_existing_rows() {
        let store = MemoryStore::new();
        let mut conn = store.connect();
        conn.create_table("events").await.unwrap();
        assert!(store.has_table("events"));

        let (_, stmt) = statement(2);
        conn.execute(&stmt).await.unwrap();
        conn.commit().await.unwrap();
        conn.create_table("events").await.unwrap();
        assert_eq!(store.committed_rows("events"), 2);

        store.fail_create_table();
        assert!(conn.create_table("other").await.is_err());
        assert!(!store.has_table("other"));
    }

    #[tokio::test]
    async fn test_rollback_discards_pending() {
        let store = MemoryStore::new();
        let mut conn = store.connect();
        let (_, stmt) = statement(3);

        conn.execute(&stmt).await.unwrap();
        conn.rollback().await.unwrap();
        conn.commit().await.unwrap();

        assert_eq!(store.committed_rows("events"), 0);
        assert_eq!(store.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_closed_connection_refuses_work() {
        let store = MemoryStore::new();
        let mut conn = store.connect();
        let (_, stmt) = statement(1);

        conn.close().await.unwrap();
        assert!(matches!(conn.execute(&stmt).await, Err(StoreError::Closed)));
        assert!(matches!(conn.total_events("events").await, Err(StoreError::Closed)));
    }

    #[tokio::test]
    async fn test_fetch_event_round_trip() {
        let store = MemoryStore::new();
        let mut conn = store.connect();
        let (events, stmt) = statement(20);
        conn.execute(&stmt).await.unwrap();
        conn.commit().await.unwrap();

        for event in &events {
            let stored = conn.fetch_event("events", event.event_id).await.unwrap().unwrap();
            assert_eq!(stored.event_type, event.event_type().as_str());
            assert_eq!(stored.payload, event.payload.to_json());
            assert_eq!(stored.timestamp, event.timestamp);
        }
        assert!(conn.fetch_event("events", Uuid::nil()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_aggregates() {
        let store = MemoryStore::new();
        let mut conn = store.connect();
        let (events, stmt) = statement(200);
        conn.execute(&stmt).await.unwrap();
        conn.commit().await.unwrap();

        let counts = conn.counts_by_type("events").await.unwrap();
        assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), 200);
        assert!(counts.windows(2).all(|w| w[0].count >= w[1].count));

        let activity = conn.user_activity("events").await.unwrap();
        let users: HashSet<_> = events.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(activity.distinct_users, users.len() as u64);
        assert!((activity.avg_events_per_user - 200.0 / users.len() as f64).abs() < 1e-9);

        let range = conn.time_range("events").await.unwrap().unwrap();
        assert_eq!(range.first, events.iter().map(|e| e.timestamp).min().unwrap());
        assert_eq!(range.last, events.iter().map(|e| e.timestamp).max().unwrap());

        let url = conn
            .sample_payload_field("events", EventType::View, &["url"])
            .await
            .unwrap()
            .unwrap();
        assert!(url.starts_with("https://"));
    }

    #[tokio::test]
    async fn test_empty_table_aggregates() {
        let store = MemoryStore::new();
        let mut conn = store.connect();

        assert_eq!(conn.total_events("events").await.unwrap(), 0);
        assert!(conn.counts_by_type("events").await.unwrap().is_empty());
        assert_eq!(conn.user_activity("events").await.unwrap().distinct_users, 0);
        assert!(conn.time_range("events").await.unwrap().is_none());
        assert!(conn
            .sample_payload_field("events", EventType::Click, &["element_id", "xpath"])
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_injected_query_failure() {
        let store = MemoryStore::new();
        store.fail_queries();
        let mut conn = store.connect();

        assert!(matches!(
            conn.total_events("events").await,
            Err(StoreError::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_connector_refuses_then_connects() {
        let connector = MemoryConnector::new(MemoryStore::new()).failing_first(2);

        assert!(connector.connect().await.is_err());
        assert!(connector.connect().await.is_err());
        assert!(connector.connect().await.is_ok());
        assert_eq!(connector.attempts(), 3);
    }
}
