//! Synthetic analytics event generator.
//!
//! This crate provides the [`EventGenerator`] which produces realistic,
//! internally-consistent analytics events. The generator uses a seeded RNG so
//! the same config and seed always yield the same events.
//!
//! # Architecture
//!
//! ```text
//! GeneratorConfig (YAML / defaults)
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │    EventGenerator    │
//! │                      │
//! │  - rng (StdRng)      │
//! │  - IdentityPool      │
//! │  - TimestampSampler  │
//! │  - PayloadGenerator  │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!    Event { event_id, user_id, timestamp, payload }
//! ```
//!
//! # Example
//!
//! ```rust
//! use event_generator::{EventGenerator, GeneratorConfig, TimeWindow};
//!
//! let config = GeneratorConfig::default()
//!     .with_window(TimeWindow::parse("2025-05-01", "2025-05-02").unwrap());
//! let mut generator = EventGenerator::new(config, 42).unwrap();
//! let events = generator.generate(10);
//! assert_eq!(events.len(), 10);
//! ```

pub mod config;
pub mod generator;
pub mod generators;

pub use config::{ConfigError, EventCount, EventWeights, GeneratorConfig, GeoBounds, TimeWindow};
pub use generator::{EventGenerator, EventIterator, GeneratorError};
pub use generators::{IdentityPool, PayloadGenerator, TimestampSampler};
