//! Batched event loading.
//!
//! This crate turns an in-memory sequence of events into committed rows:
//!
//! ```text
//! Connector ──acquire (fixed retry)──▶ Connection
//!                                          │
//! [Event; n] ──BatchLoader──▶ InsertStatement per batch ──execute──▶ commit
//!                                                   └── on failure ──▶ rollback
//! ```
//!
//! The store is reached only through the [`Connection`] and [`EventQueries`]
//! traits. `event-populate-postgresql` provides the PostgreSQL backend;
//! [`memory`] provides an in-process backend for dry runs and tests.

pub mod args;
pub mod connect;
pub mod error;
pub mod insert;
pub mod loader;
pub mod memory;
pub mod store;

pub use args::CommonPopulateArgs;
pub use connect::{
    acquire, Connector, RetryPolicy, Sleeper, TokioSleeper, DEFAULT_CONNECT_ATTEMPTS,
    DEFAULT_CONNECT_DELAY,
};
pub use error::{BatchInsertError, BatchStage, ConnectionError, LoaderConfigError};
pub use insert::{
    quote_identifier, EventRow, InsertStatement, DEFAULT_BATCH_SIZE, DEFAULT_TABLE, EVENT_COLUMNS,
    MAX_BIND_PARAMETERS,
};
pub use loader::{BatchLoader, LoadSummary};
pub use memory::{MemoryConnection, MemoryConnector, MemoryStore};
pub use store::{Connection, EventQueries, StoreError, StoredEvent, TimeRange, TypeCount, UserActivity};
