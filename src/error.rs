//! Errors that end a seeding run.

use event_generator::{ConfigError, GeneratorError};
use event_populate::{BatchInsertError, ConnectionError, LoaderConfigError, StoreError};
use thiserror::Error;

/// A fatal failure of one of the run's phases.
///
/// Verification failures never appear here; they are logged and the run
/// still succeeds.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Invalid generator configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("Invalid loader settings: {0}")]
    Loader(#[from] LoaderConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("Failed to create table '{table}': {source}")]
    CreateTable {
        table: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    BatchInsert(#[from] BatchInsertError),
}
