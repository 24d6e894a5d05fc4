//! Verifier implementation.

use crate::error::{Check, VerifyError};
use crate::report::{
    FieldMismatch, MismatchInfo, MissingInfo, PayloadSample, RoundTripReport, VerificationReport,
};
use event_core::{Event, EventType, Payload};
use event_populate::{EventQueries, StoredEvent};
use std::time::Instant;
use tracing::{debug, info};

/// Payload keys sampled per event type, tried in order.
pub fn payload_sample_keys(event_type: EventType) -> &'static [&'static str] {
    match event_type {
        EventType::View => &["url"],
        EventType::Click => &["element_id", "xpath"],
        EventType::Location => &["latitude"],
    }
}

/// Runs read-only checks against one events table.
#[derive(Debug, Clone)]
pub struct Verifier {
    table: String,
}

impl Verifier {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Run the aggregate checks. The first failing query aborts the report.
    pub async fn verify<Q>(&self, queries: &mut Q) -> Result<VerificationReport, VerifyError>
    where
        Q: EventQueries + ?Sized,
    {
        let start_time = Instant::now();
        info!("Verifying table '{}'", self.table);

        let total_events = queries
            .total_events(&self.table)
            .await
            .map_err(VerifyError::query(Check::TotalEvents))?;
        let counts_by_type = queries
            .counts_by_type(&self.table)
            .await
            .map_err(VerifyError::query(Check::CountsByType))?;
        let user_activity = queries
            .user_activity(&self.table)
            .await
            .map_err(VerifyError::query(Check::UserActivity))?;
        let time_range = queries
            .time_range(&self.table)
            .await
            .map_err(VerifyError::query(Check::TimeRange))?;

        let mut payload_samples = Vec::with_capacity(EventType::ALL.len());
        for event_type in EventType::ALL {
            let value = queries
                .sample_payload_field(&self.table, event_type, payload_sample_keys(event_type))
                .await
                .map_err(VerifyError::query(Check::PayloadSample))?;
            debug!("Sampled {} payload: {:?}", event_type, value);
            payload_samples.push(PayloadSample { event_type, value });
        }

        Ok(VerificationReport {
            total_events,
            counts_by_type,
            user_activity,
            time_range,
            payload_samples,
            round_trip: None,
            total_duration: start_time.elapsed(),
        })
    }

    /// Read each of `expected` back by id and compare it field by field.
    pub async fn verify_round_trip<Q>(
        &self,
        queries: &mut Q,
        expected: &[Event],
    ) -> Result<RoundTripReport, VerifyError>
    where
        Q: EventQueries + ?Sized,
    {
        let start_time = Instant::now();
        let mut report = RoundTripReport {
            expected: expected.len() as u64,
            ..Default::default()
        };

        for (index, event) in expected.iter().enumerate() {
            let index = index as u64;
            let stored = queries
                .fetch_event(&self.table, event.event_id)
                .await
                .map_err(VerifyError::query(Check::RoundTrip))?;

            match stored {
                Some(stored) => {
                    report.found += 1;
                    let mismatches = compare_event(event, &stored);
                    if mismatches.is_empty() {
                        report.matched += 1;
                    } else {
                        report.mismatched += 1;
                        report.mismatched_rows.push(MismatchInfo {
                            event_id: event.event_id,
                            index,
                            field_mismatches: mismatches,
                        });
                    }
                }
                None => {
                    report.missing += 1;
                    report.missing_rows.push(MissingInfo {
                        event_id: event.event_id,
                        index,
                    });
                }
            }
        }

        report.total_duration = start_time.elapsed();
        debug!(
            "Round trip of {} events: {} matched, {} missing, {} mismatched",
            report.expected, report.matched, report.missing, report.mismatched
        );
        Ok(report)
    }
}

/// Differences between a generated event and its stored row.
///
/// The stored payload is parsed back into a [`Payload`] for the stored
/// event type, so a document that no longer has its variant's shape is
/// reported as a payload mismatch.
pub fn compare_event(expected: &Event, stored: &StoredEvent) -> Vec<FieldMismatch> {
    let mut mismatches = Vec::new();
    let mut push = |field: &str, expected: String, actual: String| {
        mismatches.push(FieldMismatch {
            field: field.to_string(),
            expected,
            actual,
        });
    };

    if stored.user_id != expected.user_id {
        push("user_id", expected.user_id.clone(), stored.user_id.clone());
    }
    if stored.timestamp != expected.timestamp {
        push(
            "timestamp",
            expected.timestamp.to_string(),
            stored.timestamp.to_string(),
        );
    }

    let expected_type = expected.event_type();
    let stored_type = match stored.event_type.parse::<EventType>() {
        Ok(t) => t,
        Err(e) => {
            push("event_type", expected_type.to_string(), e.to_string());
            return mismatches;
        }
    };
    if stored_type != expected_type {
        push(
            "event_type",
            expected_type.to_string(),
            stored_type.to_string(),
        );
        return mismatches;
    }

    match Payload::from_json(stored_type, stored.payload.clone()) {
        Ok(payload) if payload == expected.payload => {}
        Ok(_) => push(
            "payload",
            expected.payload.to_json().to_string(),
            stored.payload.to_string(),
        ),
        Err(e) => push(
            "payload",
            expected.payload.to_json().to_string(),
            e.to_string(),
        ),
    }

    mismatches
}
