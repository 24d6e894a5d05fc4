//! Table bootstrap DDL.

use event_core::EventType;
use event_populate::quote_identifier;

/// `CREATE TABLE IF NOT EXISTS` for an events table. Never alters an
/// existing table.
pub fn generate_create_table(table: &str) -> String {
    let allowed = EventType::ALL
        .iter()
        .map(|t| format!("'{}'", t.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         \"event_id\" UUID PRIMARY KEY, \
         \"user_id\" TEXT NOT NULL, \
         \"event_type\" TEXT NOT NULL CHECK (\"event_type\" IN ({allowed})), \
         \"timestamp\" TIMESTAMP NOT NULL, \
         \"payload\" JSONB NOT NULL)",
        quote_identifier(table)
    )
}
