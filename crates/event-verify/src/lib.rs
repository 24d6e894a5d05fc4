//! Read-only verification of a loaded events table.
//!
//! [`Verifier::verify`] runs the aggregate checks (row count, per-type
//! counts, user activity, time range and one payload sample per type) and
//! collects them into a [`VerificationReport`]. [`Verifier::verify_round_trip`]
//! reads individual events back by id and compares them with the events
//! that were generated.
//!
//! # Example
//!
//! ```ignore
//! use event_verify::Verifier;
//!
//! let verifier = Verifier::new("events");
//! let report = verifier.verify(&mut connection).await?;
//! report.log();
//! ```

pub mod args;
pub mod error;
pub mod report;
pub mod verifier;

pub use args::VerifyArgs;
pub use error::{Check, VerifyError};
pub use report::{
    FieldMismatch, MismatchInfo, MissingInfo, PayloadSample, RoundTripReport, VerificationReport,
};
pub use verifier::{compare_event, payload_sample_keys, Verifier};
