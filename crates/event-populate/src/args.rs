//! CLI argument definitions shared by every backend.

use crate::connect::RetryPolicy;
use crate::error::LoaderConfigError;
use crate::insert::{DEFAULT_BATCH_SIZE, DEFAULT_TABLE};
use crate::loader::BatchLoader;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Arguments controlling generation and loading.
#[derive(Args, Clone, Debug)]
pub struct CommonPopulateArgs {
    /// Path to a generator config YAML file (defaults are used when omitted)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Exact number of events to generate (default: random within the configured range)
    #[arg(long)]
    pub count: Option<u64>,

    /// Number of events per committed batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Random seed for deterministic generation (default: drawn at startup and logged)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start of the event time window (YYYY-MM-DD or RFC 3339)
    #[arg(long, requires = "window_end")]
    pub window_start: Option<String>,

    /// End of the event time window, inclusive (YYYY-MM-DD or RFC 3339)
    #[arg(long, requires = "window_start")]
    pub window_end: Option<String>,

    /// Target table
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Maximum number of connection attempts
    #[arg(long, default_value_t = 5)]
    pub connect_attempts: u32,

    /// Seconds to wait between connection attempts
    #[arg(long, default_value_t = 2)]
    pub connect_delay_secs: u64,

    /// Load into an in-memory store instead of the database
    #[arg(long)]
    pub dry_run: bool,

    /// Create the target table if it does not exist
    #[arg(long)]
    pub create_table: bool,
}

impl CommonPopulateArgs {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.connect_attempts,
            Duration::from_secs(self.connect_delay_secs),
        )
    }

    pub fn batch_loader(&self) -> Result<BatchLoader, LoaderConfigError> {
        BatchLoader::new(self.batch_size)?.with_table(&self.table)
    }
}
