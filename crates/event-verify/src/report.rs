//! Verification report types.

use crate::error::VerifyError;
use event_core::EventType;
use event_populate::{TimeRange, TypeCount, UserActivity};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// One payload field read back for an event type.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadSample {
    pub event_type: EventType,
    /// `None` when no row of this type exists.
    pub value: Option<String>,
}

/// Results of the aggregate checks.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub total_events: u64,
    /// Row count per event type, largest first.
    pub counts_by_type: Vec<TypeCount>,
    pub user_activity: UserActivity,
    /// `None` when the table is empty.
    pub time_range: Option<TimeRange>,
    pub payload_samples: Vec<PayloadSample>,
    /// Set when a round-trip spot check was run.
    pub round_trip: Option<RoundTripReport>,
    pub total_duration: Duration,
}

impl VerificationReport {
    /// Count for `event_type`, zero when absent.
    pub fn count_for(&self, event_type: EventType) -> u64 {
        self.counts_by_type
            .iter()
            .find(|c| c.event_type == event_type.as_str())
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        let counts = self
            .counts_by_type
            .iter()
            .map(|c| format!("{}={}", c.event_type, c.count))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} events ({}) from {} users in {:?}",
            self.total_events, counts, self.user_activity.distinct_users, self.total_duration
        )
    }

    /// Log every section of the report.
    pub fn log(&self) {
        info!("Total events: {}", self.total_events);
        for count in &self.counts_by_type {
            info!("  {}: {}", count.event_type, count.count);
        }
        info!(
            "Distinct users: {}, average events per user: {:.2}",
            self.user_activity.distinct_users, self.user_activity.avg_events_per_user
        );
        match &self.time_range {
            Some(range) => info!("Time range: {} to {}", range.first, range.last),
            None => info!("Time range: table is empty"),
        }
        for sample in &self.payload_samples {
            match &sample.value {
                Some(value) => info!("Sample {} payload: {}", sample.event_type, value),
                None => info!("Sample {} payload: none stored", sample.event_type),
            }
        }
        if let Some(round_trip) = &self.round_trip {
            round_trip.log();
        }
    }
}

/// A field that differs between the generated and the stored event.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMismatch {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

/// A stored event that does not match what was generated.
#[derive(Debug, Clone)]
pub struct MismatchInfo {
    pub event_id: Uuid,
    /// Position in the generated sequence.
    pub index: u64,
    pub field_mismatches: Vec<FieldMismatch>,
}

/// A generated event that was not found in the store.
#[derive(Debug, Clone)]
pub struct MissingInfo {
    pub event_id: Uuid,
    /// Position in the generated sequence.
    pub index: u64,
}

/// Results of reading generated events back from the store.
#[derive(Debug, Clone, Default)]
pub struct RoundTripReport {
    pub expected: u64,
    pub found: u64,
    pub missing: u64,
    pub mismatched: u64,
    pub matched: u64,
    pub missing_rows: Vec<MissingInfo>,
    pub mismatched_rows: Vec<MismatchInfo>,
    pub total_duration: Duration,
}

impl RoundTripReport {
    /// Check if every event was found unchanged.
    pub fn is_success(&self) -> bool {
        self.missing == 0 && self.mismatched == 0
    }

    /// `Err` with the counts when any event was missing or changed.
    pub fn ensure_success(&self) -> Result<(), VerifyError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(VerifyError::RoundTripFailed {
                found: self.found,
                missing: self.missing,
                mismatched: self.mismatched,
            })
        }
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!(
                "Round trip PASSED: {}/{} events matched in {:?}",
                self.matched, self.expected, self.total_duration
            )
        } else {
            format!(
                "Round trip FAILED: {} missing, {} mismatched out of {} expected",
                self.missing, self.mismatched, self.expected
            )
        }
    }

    fn log(&self) {
        if self.is_success() {
            info!("{}", self.summary());
            return;
        }
        warn!("{}", self.summary());
        for missing in &self.missing_rows {
            warn!("  missing #{}: {}", missing.index, missing.event_id);
        }
        for mismatch in &self.mismatched_rows {
            for field in &mismatch.field_mismatches {
                warn!(
                    "  mismatch #{} {} field '{}': expected {}, got {}",
                    mismatch.index, mismatch.event_id, field.field, field.expected, field.actual
                );
            }
        }
    }
}
