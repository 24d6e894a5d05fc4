//! Core types for the analytics event seeder.
//!
//! Every crate in the workspace speaks in terms of these types:
//!
//! - [`Event`] - one synthesized analytics record
//! - [`EventType`] - the closed set of event categories
//! - [`Payload`] - the type-specific document attached to an event
//!
//! ```text
//! Event { event_id, user_id, timestamp, payload }
//!                                          │
//!                      ┌───────────────────┼───────────────────┐
//!                      ▼                   ▼                   ▼
//!                 ViewPayload         ClickPayload       LocationPayload
//! ```
//!
//! The event type is derived from the payload variant, so a record can never
//! declare one category while carrying another category's document.

pub mod event;
pub mod payload;

pub use event::{Event, EventType, ParseEventTypeError};
pub use payload::{ClickPayload, LocationPayload, Payload, PayloadError, ViewPayload};
