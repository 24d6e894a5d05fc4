//! Batch loader: one transaction per batch.

use crate::error::{BatchInsertError, BatchStage, LoaderConfigError};
use crate::insert::{InsertStatement, DEFAULT_BATCH_SIZE, DEFAULT_TABLE, EVENT_COLUMNS, MAX_BIND_PARAMETERS};
use crate::store::{Connection, StoreError};
use event_core::Event;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Metrics from a load operation.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Number of rows committed.
    pub rows_committed: u64,
    /// Number of batches committed.
    pub batches_committed: usize,
    /// Total time taken.
    pub total_duration: Duration,
}

impl LoadSummary {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_committed as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Splits events into fixed-size batches and commits each atomically.
///
/// A failing batch is rolled back and aborts the load. Batches committed
/// before it are left in place; there is no run-wide transaction.
#[derive(Debug, Clone)]
pub struct BatchLoader {
    batch_size: usize,
    table: String,
}

impl BatchLoader {
    pub fn new(batch_size: usize) -> Result<Self, LoaderConfigError> {
        if batch_size == 0 {
            return Err(LoaderConfigError::ZeroBatchSize);
        }
        let parameters = batch_size * EVENT_COLUMNS.len();
        if parameters > MAX_BIND_PARAMETERS {
            return Err(LoaderConfigError::TooManyParameters {
                batch_size,
                parameters,
                limit: MAX_BIND_PARAMETERS,
            });
        }
        Ok(Self {
            batch_size,
            table: DEFAULT_TABLE.to_string(),
        })
    }

    /// Set the target table.
    pub fn with_table(mut self, table: &str) -> Result<Self, LoaderConfigError> {
        if table.is_empty() {
            return Err(LoaderConfigError::EmptyTableName);
        }
        self.table = table.to_string();
        Ok(self)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Number of batches `event_count` events split into.
    pub fn batch_count(&self, event_count: usize) -> usize {
        event_count.div_ceil(self.batch_size)
    }

    /// Load `events` in order, one committed transaction per batch.
    pub async fn load<C>(&self, connection: &mut C, events: &[Event]) -> Result<LoadSummary, BatchInsertError>
    where
        C: Connection + ?Sized,
    {
        let start_time = Instant::now();
        let mut summary = LoadSummary::default();
        let total_batches = self.batch_count(events.len());

        info!(
            "Inserting {} events into '{}' in batches of {}",
            events.len(),
            self.table,
            self.batch_size
        );

        for (i, chunk) in events.chunks(self.batch_size).enumerate() {
            let batch = i + 1;
            let statement = InsertStatement::new(&self.table, chunk);
            debug!("Batch {}/{} SQL: {}", batch, total_batches, statement.sql());

            if let Err((stage, source)) = self.run_batch(connection, &statement).await {
                error!(
                    "Batch {}/{} failed during {}: {}; rolling back",
                    batch, total_batches, stage, source
                );
                let rollback_error = connection.rollback().await.err();
                if let Some(e) = &rollback_error {
                    error!("Rollback of batch {} failed: {}", batch, e);
                }
                return Err(BatchInsertError {
                    batch,
                    total_batches,
                    stage,
                    committed_rows: summary.rows_committed,
                    committed_batches: summary.batches_committed,
                    source,
                    rollback_error,
                });
            }

            summary.rows_committed += chunk.len() as u64;
            summary.batches_committed += 1;
            info!("Batch {}/{} committed ({} rows)", batch, total_batches, chunk.len());
        }

        summary.total_duration = start_time.elapsed();
        info!(
            "Load complete: {} rows in {} batches in {:?} ({:.2} rows/sec)",
            summary.rows_committed,
            summary.batches_committed,
            summary.total_duration,
            summary.rows_per_second()
        );

        Ok(summary)
    }

    async fn run_batch<C>(
        &self,
        connection: &mut C,
        statement: &InsertStatement,
    ) -> Result<(), (BatchStage, StoreError)>
    where
        C: Connection + ?Sized,
    {
        connection
            .execute(statement)
            .await
            .map_err(|e| (BatchStage::Execute, e))?;
        connection
            .commit()
            .await
            .map_err(|e| (BatchStage::Commit, e))
    }
}

impl Default for BatchLoader {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use event_generator::{EventGenerator, GeneratorConfig, TimeWindow};

    fn events(count: u64) -> Vec<Event> {
        let config = GeneratorConfig::default()
            .with_window(TimeWindow::parse("2025-05-01", "2025-05-02").unwrap());
        EventGenerator::new(config, 42).unwrap().generate(count)
    }

    #[test]
    fn test_batch_size_validation() {
        assert_eq!(BatchLoader::new(0).unwrap_err(), LoaderConfigError::ZeroBatchSize);
        assert!(matches!(
            BatchLoader::new(20_000),
            Err(LoaderConfigError::TooManyParameters { .. })
        ));
        assert!(BatchLoader::new(13_107).is_ok());
        assert_eq!(
            BatchLoader::new(5).unwrap().with_table("").unwrap_err(),
            LoaderConfigError::EmptyTableName
        );
    }

    #[test]
    fn test_batch_count() {
        let loader = BatchLoader::default();
        assert_eq!(loader.batch_size(), 250);
        assert_eq!(loader.batch_count(0), 0);
        assert_eq!(loader.batch_count(250), 1);
        assert_eq!(loader.batch_count(251), 2);
        assert_eq!(loader.batch_count(1000), 4);
    }

    #[tokio::test]
    async fn test_load_commits_every_batch() {
        let store = MemoryStore::new();
        let mut connection = store.connect();
        let loader = BatchLoader::new(5).unwrap();

        let summary = loader.load(&mut connection, &events(10)).await.unwrap();

        assert_eq!(summary.rows_committed, 10);
        assert_eq!(summary.batches_committed, 2);
        assert_eq!(store.committed_rows("events"), 10);
        assert_eq!(store.commit_count(), 2);
        assert_eq!(store.rollback_count(), 0);
    }

    #[tokio::test]
    async fn test_final_batch_may_be_smaller() {
        let store = MemoryStore::new();
        let mut connection = store.connect();
        let loader = BatchLoader::new(4).unwrap();

        let summary = loader.load(&mut connection, &events(10)).await.unwrap();

        assert_eq!(summary.batches_committed, 3);
        assert_eq!(store.batch_sizes("events"), vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_empty_input_commits_nothing() {
        let store = MemoryStore::new();
        let mut connection = store.connect();

        let summary = BatchLoader::default().load(&mut connection, &[]).await.unwrap();

        assert_eq!(summary.rows_committed, 0);
        assert_eq!(summary.batches_committed, 0);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_failure_rolls_back_and_stops() {
        let store = MemoryStore::new();
        store.fail_execute_on(3);
        let mut connection = store.connect();
        let loader = BatchLoader::new(5).unwrap();

        let err = loader.load(&mut connection, &events(25)).await.unwrap_err();

        assert_eq!(err.batch, 3);
        assert_eq!(err.total_batches, 5);
        assert_eq!(err.stage, BatchStage::Execute);
        assert_eq!(err.committed_rows, 10);
        assert_eq!(err.committed_batches, 2);
        assert!(err.rollback_error.is_none());
        assert_eq!(store.committed_rows("events"), 10);
        assert_eq!(store.rollback_count(), 1);
        // Nothing after the failing batch was attempted.
        assert_eq!(store.execute_count(), 3);
    }

    #[tokio::test]
    async fn test_commit_failure_discards_batch() {
        let store = MemoryStore::new();
        store.fail_commit_on(2);
        let mut connection = store.connect();
        let loader = BatchLoader::new(5).unwrap();

        let err = loader.load(&mut connection, &events(15)).await.unwrap_err();

        assert_eq!(err.batch, 2);
        assert_eq!(err.stage, BatchStage::Commit);
        assert_eq!(err.committed_rows, 5);
        assert_eq!(store.committed_rows("events"), 5);
    }

    #[test]
    fn test_summary_rate() {
        let summary = LoadSummary {
            rows_committed: 1000,
            batches_committed: 4,
            total_duration: Duration::from_secs(10),
        };
        assert_eq!(summary.rows_per_second(), 100.0);
    }
}
