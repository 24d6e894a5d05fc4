//! `tokio-postgres` implementation of the store traits.

use crate::args::PostgreSQLArgs;
use crate::ddl::generate_create_table;
use crate::types::EventTypeParam;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use event_core::EventType;
use event_populate::{
    quote_identifier, Connection, Connector, EventQueries, InsertStatement, StoreError,
    StoredEvent, TimeRange, TypeCount, UserActivity,
};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info};
use uuid::Uuid;

fn backend(e: tokio_postgres::Error) -> StoreError {
    StoreError::Backend(Box::new(e))
}

/// Opens PostgreSQL sessions from connection parameters.
#[derive(Debug, Clone)]
pub struct PostgreSQLConnector {
    config: tokio_postgres::Config,
    endpoint: String,
}

impl PostgreSQLConnector {
    pub fn new(config: tokio_postgres::Config, endpoint: String) -> Self {
        Self { config, endpoint }
    }

    pub fn from_args(args: &PostgreSQLArgs) -> Self {
        Self::new(args.to_config(), args.endpoint())
    }
}

#[async_trait]
impl Connector for PostgreSQLConnector {
    type Connection = PostgreSQLConnection;

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn connect(&self) -> Result<PostgreSQLConnection, StoreError> {
        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        // Spawn the connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        // Test connection
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        Ok(PostgreSQLConnection::new(client))
    }
}

/// One PostgreSQL session.
///
/// `execute` opens a transaction with `BEGIN` when none is active, so each
/// batch's insert and commit form one atomic unit.
pub struct PostgreSQLConnection {
    client: Option<Client>,
    in_transaction: bool,
}

impl PostgreSQLConnection {
    pub fn new(client: Client) -> Self {
        Self {
            client: Some(client),
            in_transaction: false,
        }
    }

    fn client(&self) -> Result<&Client, StoreError> {
        self.client.as_ref().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl Connection for PostgreSQLConnection {
    async fn execute(&mut self, statement: &InsertStatement) -> Result<u64, StoreError> {
        if statement.is_empty() {
            return Ok(0);
        }
        if !self.in_transaction {
            self.client()?.batch_execute("BEGIN").await.map_err(backend)?;
            self.in_transaction = true;
        }

        let event_types: Vec<EventTypeParam> = statement
            .rows()
            .iter()
            .map(|row| EventTypeParam(row.event_type))
            .collect();

        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(statement.parameter_count());
        for (row, event_type) in statement.rows().iter().zip(&event_types) {
            params.push(&row.event_id);
            params.push(&row.user_id);
            params.push(event_type);
            params.push(&row.timestamp);
            params.push(&row.payload);
        }

        self.client()?
            .execute(&statement.sql(), &params)
            .await
            .map_err(backend)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Ok(());
        }
        // A failed COMMIT still ends the transaction on the server.
        self.in_transaction = false;
        self.client()?.batch_execute("COMMIT").await.map_err(backend)
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.client()?.batch_execute("ROLLBACK").await.map_err(backend)
    }

    async fn create_table(&mut self, table: &str) -> Result<(), StoreError> {
        let sql = generate_create_table(table);
        info!("Creating table if missing: {}", table);
        debug!("DDL: {}", sql);
        self.client()?.batch_execute(&sql).await.map_err(backend)
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        if self.in_transaction {
            self.rollback().await?;
        }
        // Dropping the client ends the spawned connection task.
        self.client = None;
        Ok(())
    }
}

#[async_trait]
impl EventQueries for PostgreSQLConnection {
    async fn total_events(&mut self, table: &str) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let row = self.client()?.query_one(&sql, &[]).await.map_err(backend)?;
        let count: i64 = row.get(0);
        Ok(count as u64)
    }

    async fn counts_by_type(&mut self, table: &str) -> Result<Vec<TypeCount>, StoreError> {
        let sql = format!(
            "SELECT \"event_type\"::text, COUNT(*) FROM {} \
             GROUP BY \"event_type\" ORDER BY COUNT(*) DESC, \"event_type\"",
            quote_identifier(table)
        );
        let rows = self.client()?.query(&sql, &[]).await.map_err(backend)?;
        Ok(rows
            .iter()
            .map(|row| {
                let count: i64 = row.get(1);
                TypeCount {
                    event_type: row.get(0),
                    count: count as u64,
                }
            })
            .collect())
    }

    async fn user_activity(&mut self, table: &str) -> Result<UserActivity, StoreError> {
        let sql = format!(
            "SELECT COUNT(DISTINCT \"user_id\"), \
             COALESCE(COUNT(*)::float8 / NULLIF(COUNT(DISTINCT \"user_id\"), 0), 0) \
             FROM {}",
            quote_identifier(table)
        );
        let row = self.client()?.query_one(&sql, &[]).await.map_err(backend)?;
        let distinct_users: i64 = row.get(0);
        Ok(UserActivity {
            distinct_users: distinct_users as u64,
            avg_events_per_user: row.get(1),
        })
    }

    async fn time_range(&mut self, table: &str) -> Result<Option<TimeRange>, StoreError> {
        let sql = format!(
            "SELECT MIN(\"timestamp\"), MAX(\"timestamp\") FROM {}",
            quote_identifier(table)
        );
        let row = self.client()?.query_one(&sql, &[]).await.map_err(backend)?;
        let first: Option<NaiveDateTime> = row.get(0);
        let last: Option<NaiveDateTime> = row.get(1);
        Ok(first.zip(last).map(|(first, last)| TimeRange { first, last }))
    }

    async fn sample_payload_field(
        &mut self,
        table: &str,
        event_type: EventType,
        keys: &[&str],
    ) -> Result<Option<String>, StoreError> {
        if keys.is_empty() {
            return Ok(None);
        }
        let fields = (0..keys.len())
            .map(|i| format!("\"payload\" ->> (${}::text)", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT COALESCE({fields}) FROM {} WHERE \"event_type\"::text = $1 LIMIT 1",
            quote_identifier(table)
        );

        let type_name = event_type.as_str();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(keys.len() + 1);
        params.push(&type_name);
        params.extend(keys.iter().map(|k| k as &(dyn ToSql + Sync)));

        let row = self
            .client()?
            .query_opt(&sql, &params)
            .await
            .map_err(backend)?;
        Ok(row.and_then(|row| row.get::<_, Option<String>>(0)))
    }

    async fn fetch_event(
        &mut self,
        table: &str,
        event_id: Uuid,
    ) -> Result<Option<StoredEvent>, StoreError> {
        let sql = format!(
            "SELECT \"event_id\", \"user_id\", \"event_type\"::text, \"timestamp\", \"payload\" \
             FROM {} WHERE \"event_id\" = $1",
            quote_identifier(table)
        );
        let row = self
            .client()?
            .query_opt(&sql, &[&event_id])
            .await
            .map_err(backend)?;

        row.map(|row| {
            Ok(StoredEvent {
                event_id: row.try_get(0).map_err(backend)?,
                user_id: row.try_get(1).map_err(backend)?,
                event_type: row.try_get(2).map_err(backend)?,
                timestamp: row.try_get(3).map_err(backend)?,
                payload: row.try_get(4).map_err(backend)?,
            })
        })
        .transpose()
    }
}
