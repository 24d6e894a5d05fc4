//! Event seeder library.
//!
//! Fills an analytics `events` table with synthetic page views, clicks and
//! location pings, then checks what landed.
//!
//! A run has four phases:
//!
//! 1. Generate events with a seeded [`EventGenerator`](event_generator::EventGenerator).
//! 2. Acquire a connection, retrying at a fixed interval.
//! 3. Insert in batches, one transaction per batch.
//! 4. Verify with read-only queries (advisory; failures are logged).
//!
//! # CLI Usage
//!
//! ```bash
//! # 1000 events into the local database
//! event-seeder --count 1000 --seed 42
//!
//! # Custom generator config, create the table first
//! event-seeder --config seeder.yaml --create-table
//!
//! # Generate and load into memory only
//! event-seeder --dry-run --count 500
//! ```

pub mod error;
pub mod pipeline;

pub use error::SeedError;
pub use pipeline::{GeneratedEvents, RunSummary, SeedOptions, Seeder};
