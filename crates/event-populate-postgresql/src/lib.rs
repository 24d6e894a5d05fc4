//! PostgreSQL backend for the event seeder.
//!
//! Provides [`PostgreSQLConnector`], which opens `tokio-postgres` sessions,
//! and [`PostgreSQLConnection`], which implements the loader's
//! [`Connection`](event_populate::Connection) and the verifier's
//! [`EventQueries`](event_populate::EventQueries) on top of them.

pub mod args;
pub mod connection;
pub mod ddl;
pub mod types;

pub use args::PostgreSQLArgs;
pub use connection::{PostgreSQLConnection, PostgreSQLConnector};
pub use ddl::generate_create_table;
pub use types::EventTypeParam;
