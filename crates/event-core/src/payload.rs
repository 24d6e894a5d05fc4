//! Type-specific payload documents.
//!
//! Payloads are a closed set of variants, one per [`EventType`]. They are
//! serialized into a generic JSON document with [`Payload::to_json`] for
//! storage and parsed back with [`Payload::from_json`] when the stored
//! document needs to be compared against the in-memory original.

use crate::event::EventType;
use serde::{Deserialize, Serialize};

/// Error produced when a stored document cannot be read back as a payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The document does not have the shape of the declared event type.
    #[error("Invalid {event_type} payload: {source}")]
    Shape {
        event_type: EventType,
        #[source]
        source: serde_json::Error,
    },

    /// A click document carries neither `element_id` nor `xpath`.
    #[error("Click payload has no identifying field")]
    MissingClickIdentifier,
}

/// Page view: which page was shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewPayload {
    pub url: String,
    pub title: String,
}

/// Click on a page element.
///
/// At least one of `element_id` / `xpath` is always present; `text` is the
/// visible label of the clicked element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClickPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    pub text: String,
}

impl ClickPayload {
    /// Number of identifying fields (`element_id`, `xpath`) present.
    pub fn identifier_count(&self) -> usize {
        usize::from(self.element_id.is_some()) + usize::from(self.xpath.is_some())
    }

    /// The identifying field used for sampling: `element_id`, else `xpath`.
    pub fn primary_identifier(&self) -> Option<&str> {
        self.element_id.as_deref().or(self.xpath.as_deref())
    }
}

/// Geolocation ping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationPayload {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius, one decimal place.
    pub accuracy: f64,
}

/// Payload of an event; the variant decides the event type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    View(ViewPayload),
    Click(ClickPayload),
    Location(LocationPayload),
}

impl Payload {
    pub fn event_type(&self) -> EventType {
        match self {
            Payload::View(_) => EventType::View,
            Payload::Click(_) => EventType::Click,
            Payload::Location(_) => EventType::Location,
        }
    }

    /// Serialize into the generic JSON document stored in the `payload` column.
    pub fn to_json(&self) -> serde_json::Value {
        // Plain structs of strings and finite floats always serialize.
        let result = match self {
            Payload::View(p) => serde_json::to_value(p),
            Payload::Click(p) => serde_json::to_value(p),
            Payload::Location(p) => serde_json::to_value(p),
        };
        result.unwrap_or(serde_json::Value::Null)
    }

    /// Parse a stored document back into the variant for `event_type`.
    pub fn from_json(event_type: EventType, value: serde_json::Value) -> Result<Self, PayloadError> {
        let shape = |source| PayloadError::Shape { event_type, source };
        match event_type {
            EventType::View => serde_json::from_value(value).map(Payload::View).map_err(shape),
            EventType::Click => {
                let click: ClickPayload = serde_json::from_value(value).map_err(shape)?;
                if click.identifier_count() == 0 {
                    return Err(PayloadError::MissingClickIdentifier);
                }
                Ok(Payload::Click(click))
            }
            EventType::Location => serde_json::from_value(value)
                .map(Payload::Location)
                .map_err(shape),
        }
    }
}
