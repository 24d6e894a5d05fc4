//! Bind parameter types.

use bytes::BytesMut;
use event_core::EventType;
use std::error::Error;
use tokio_postgres::types::{to_sql_checked, IsNull, Kind, ToSql, Type};

/// Binds an [`EventType`] to a text-like column or to a PostgreSQL enum
/// whose labels are the event type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTypeParam(pub EventType);

impl ToSql for EventTypeParam {
    fn to_sql(&self, _ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        // Text and enum values share the same wire format: the raw label.
        out.extend_from_slice(self.0.as_str().as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(ty: &Type) -> bool {
        match *ty {
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => true,
            _ => matches!(ty.kind(), Kind::Enum(_)),
        }
    }

    to_sql_checked!();
}
