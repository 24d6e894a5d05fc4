//! Parameterized multi-row INSERT statements.

use chrono::NaiveDateTime;
use event_core::{Event, EventType};
use uuid::Uuid;

/// Default number of events per batch.
pub const DEFAULT_BATCH_SIZE: usize = 250;

/// Default target table.
pub const DEFAULT_TABLE: &str = "events";

/// Columns written for every event, in bind order.
pub const EVENT_COLUMNS: [&str; 5] = ["event_id", "user_id", "event_type", "timestamp", "payload"];

/// PostgreSQL's limit on bind parameters in a single statement.
pub const MAX_BIND_PARAMETERS: usize = 65_535;

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// One event flattened into its column values.
///
/// The payload is serialized to its JSON document here, once, so every
/// backend stores exactly the same document.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub event_id: Uuid,
    pub user_id: String,
    pub event_type: EventType,
    pub timestamp: NaiveDateTime,
    pub payload: serde_json::Value,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.event_id,
            user_id: event.user_id.clone(),
            event_type: event.event_type(),
            timestamp: event.timestamp,
            payload: event.payload.to_json(),
        }
    }
}

/// A multi-row INSERT into the events table.
///
/// Values are never spliced into the SQL text; the statement carries them as
/// rows and each backend binds them as parameters.
#[derive(Debug, Clone)]
pub struct InsertStatement {
    table: String,
    rows: Vec<EventRow>,
}

impl InsertStatement {
    pub fn new(table: &str, events: &[Event]) -> Self {
        Self {
            table: table.to_string(),
            rows: events.iter().map(EventRow::from).collect(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn rows(&self) -> &[EventRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of bind parameters the statement needs.
    pub fn parameter_count(&self) -> usize {
        self.rows.len() * EVENT_COLUMNS.len()
    }

    /// SQL text with numbered placeholders; the payload is cast to `jsonb`.
    pub fn sql(&self) -> String {
        let columns = EVENT_COLUMNS
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        let width = EVENT_COLUMNS.len();
        let values = (0..self.rows.len())
            .map(|row| {
                let base = row * width;
                format!(
                    "(${}, ${}, ${}, ${}, ${}::jsonb)",
                    base + 1,
                    base + 2,
                    base + 3,
                    base + 4,
                    base + 5
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES {}",
            quote_identifier(&self.table),
            columns,
            values
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use event_core::{ClickPayload, Payload, ViewPayload};

    fn event(n: u8, payload: Payload) -> Event {
        let timestamp = NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, n as u32)
            .unwrap();
        Event::new(
            Uuid::from_bytes([n; 16]),
            format!("user_{n:08x}"),
            timestamp,
            payload,
        )
    }

    fn view(n: u8) -> Event {
        event(
            n,
            Payload::View(ViewPayload {
                url: "https://example.com/about".to_string(),
                title: "It's a \"quoted\" title.".to_string(),
            }),
        )
    }

    #[test]
    fn test_sql_shape() {
        let statement = InsertStatement::new("events", &[view(1), view(2)]);

        assert_eq!(
            statement.sql(),
            "INSERT INTO \"events\" (\"event_id\", \"user_id\", \"event_type\", \"timestamp\", \"payload\") \
             VALUES ($1, $2, $3, $4, $5::jsonb), ($6, $7, $8, $9, $10::jsonb)"
        );
        assert_eq!(statement.parameter_count(), 10);
    }

    #[test]
    fn test_values_stay_out_of_sql() {
        let statement = InsertStatement::new("events", &[view(1)]);
        let sql = statement.sql();

        assert!(!sql.contains("quoted"));
        assert!(!sql.contains("user_"));
        assert_eq!(statement.rows()[0].payload["title"], "It's a \"quoted\" title.");
    }

    #[test]
    fn test_row_carries_type_and_document() {
        let click = event(
            3,
            Payload::Click(ClickPayload {
                element_id: None,
                xpath: Some("download-btn".to_string()),
                text: "Download".to_string(),
            }),
        );
        let row = EventRow::from(&click);

        assert_eq!(row.event_type, EventType::Click);
        assert_eq!(row.payload, click.payload.to_json());
        assert_eq!(row.event_id, click.event_id);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("events"), "\"events\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
