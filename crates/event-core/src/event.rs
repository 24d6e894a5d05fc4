//! The event record and its category.

use crate::payload::Payload;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Category of an analytics event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    View,
    Click,
    Location,
}

impl EventType {
    /// All event types, in their canonical order.
    pub const ALL: [EventType; 3] = [EventType::View, EventType::Click, EventType::Location];

    /// The textual form stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::View => "view",
            EventType::Click => "click",
            EventType::Location => "location",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known event type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown event type: {0}")]
pub struct ParseEventTypeError(pub String);

impl FromStr for EventType {
    type Err = ParseEventTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(EventType::View),
            "click" => Ok(EventType::Click),
            "location" => Ok(EventType::Location),
            other => Err(ParseEventTypeError(other.to_string())),
        }
    }
}

/// One synthesized analytics record.
///
/// All fields are fixed at construction. The event type is not stored
/// separately; it is read from the payload variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Unique identifier of this record.
    pub event_id: Uuid,
    /// Owner of the event, drawn from the run's identity pool.
    pub user_id: String,
    /// When the event happened.
    pub timestamp: NaiveDateTime,
    /// Type-specific document.
    pub payload: Payload,
}

impl Event {
    pub fn new(event_id: Uuid, user_id: String, timestamp: NaiveDateTime, payload: Payload) -> Self {
        Self {
            event_id,
            user_id,
            timestamp,
            payload,
        }
    }

    /// The category of this event, determined by its payload.
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::ViewPayload;
    use chrono::NaiveDate;

    #[test]
    fn test_event_type_round_trips_through_str() {
        for event_type in EventType::ALL {
            let parsed: EventType = event_type.as_str().parse().unwrap();
            assert_eq!(parsed, event_type);
        }
    }

    #[test]
    fn test_unknown_event_type() {
        let err = "scroll".parse::<EventType>().unwrap_err();
        assert_eq!(err, ParseEventTypeError("scroll".to_string()));
    }

    #[test]
    fn test_event_type_follows_payload() {
        let timestamp = NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let event = Event::new(
            Uuid::nil(),
            "user_0000abcd".to_string(),
            timestamp,
            Payload::View(ViewPayload {
                url: "https://example.com/about".to_string(),
                title: "About us today.".to_string(),
            }),
        );

        assert_eq!(event.event_type(), EventType::View);
        assert_eq!(event.event_type().to_string(), "view");
    }
}
