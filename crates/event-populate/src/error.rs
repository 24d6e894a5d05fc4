//! Error types for connection acquisition and batch loading.

use crate::store::StoreError;
use std::fmt;
use thiserror::Error;

/// Retry budget exhausted while acquiring a connection.
#[derive(Error, Debug)]
#[error("Failed to connect to {endpoint} after {attempts} attempts. Last error: {last_error}")]
pub struct ConnectionError {
    pub endpoint: String,
    pub attempts: u32,
    #[source]
    pub last_error: StoreError,
}

/// Which step of a batch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    Execute,
    Commit,
}

impl fmt::Display for BatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStage::Execute => f.write_str("execute"),
            BatchStage::Commit => f.write_str("commit"),
        }
    }
}

/// A batch failed and was rolled back. Batches before it stay committed.
#[derive(Error, Debug)]
#[error(
    "Batch {batch}/{total_batches} failed during {stage} ({committed_rows} rows already committed): {source}"
)]
pub struct BatchInsertError {
    /// One-based number of the failing batch.
    pub batch: usize,
    pub total_batches: usize,
    pub stage: BatchStage,
    /// Rows committed by the batches before the failing one.
    pub committed_rows: u64,
    pub committed_batches: usize,
    #[source]
    pub source: StoreError,
    /// Set when the rollback itself also failed.
    pub rollback_error: Option<StoreError>,
}

/// Invalid batch loader settings.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoaderConfigError {
    #[error("Batch size must be at least 1")]
    ZeroBatchSize,

    #[error("Batch size {batch_size} needs {parameters} bind parameters, limit is {limit}")]
    TooManyParameters {
        batch_size: usize,
        parameters: usize,
        limit: usize,
    },

    #[error("Table name must not be empty")]
    EmptyTableName,
}
