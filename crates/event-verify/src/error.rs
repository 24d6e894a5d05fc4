//! Error types for the verifier.

use event_populate::StoreError;
use std::fmt;
use thiserror::Error;

/// The read-only check that was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    TotalEvents,
    CountsByType,
    UserActivity,
    TimeRange,
    PayloadSample,
    RoundTrip,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::TotalEvents => "total events",
            Check::CountsByType => "counts by type",
            Check::UserActivity => "user activity",
            Check::TimeRange => "time range",
            Check::PayloadSample => "payload sample",
            Check::RoundTrip => "round trip",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// A verification query failed.
    #[error("Verification query '{check}' failed: {source}")]
    Query {
        check: Check,
        #[source]
        source: StoreError,
    },

    /// Events read back did not match what was loaded.
    #[error("Round trip failed: {found} found, {missing} missing, {mismatched} mismatched")]
    RoundTripFailed {
        found: u64,
        missing: u64,
        mismatched: u64,
    },
}

impl VerifyError {
    pub(crate) fn query(check: Check) -> impl FnOnce(StoreError) -> Self {
        move |source| VerifyError::Query { check, source }
    }
}
