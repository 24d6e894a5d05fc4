//! The seeding run: generate, connect, load, verify.

use crate::error::SeedError;
use event_core::Event;
use event_generator::{EventGenerator, GeneratorConfig, TimeWindow};
use event_populate::{
    acquire, BatchLoader, CommonPopulateArgs, Connection, Connector, EventQueries, LoadSummary,
    RetryPolicy, Sleeper,
};
use event_verify::{VerificationReport, Verifier, VerifyArgs};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub generator: GeneratorConfig,
    /// `None` draws a fresh seed for each run.
    pub seed: Option<u64>,
    pub loader: BatchLoader,
    pub retry: RetryPolicy,
    /// Create the target table before loading.
    pub create_table: bool,
    pub verify: VerifyArgs,
}

impl SeedOptions {
    /// Build options from CLI arguments.
    ///
    /// The config file, if any, is read first; `--count` and the window
    /// flags then override it.
    pub fn from_args(common: &CommonPopulateArgs, verify: &VerifyArgs) -> Result<Self, SeedError> {
        let mut generator = match &common.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(count) = common.count {
            generator = generator.with_event_count(count);
        }
        if let (Some(start), Some(end)) = (&common.window_start, &common.window_end) {
            generator = generator.with_window(TimeWindow::parse(start, end)?);
        }
        generator.validate()?;

        Ok(Self {
            generator,
            seed: common.seed,
            loader: common.batch_loader()?,
            retry: common.retry_policy(),
            create_table: common.create_table,
            verify: verify.clone(),
        })
    }
}

/// Events generated for one run.
#[derive(Debug, Clone)]
pub struct GeneratedEvents {
    pub seed: u64,
    pub events: Vec<Event>,
    pub duration: Duration,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub seed: u64,
    pub events_generated: u64,
    pub generation_duration: Duration,
    pub load: LoadSummary,
    /// `None` when verification was skipped or its queries failed.
    pub verification: Option<VerificationReport>,
}

/// Drives one seeding run.
#[derive(Debug, Clone)]
pub struct Seeder {
    options: SeedOptions,
}

impl Seeder {
    pub fn new(options: SeedOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SeedOptions {
        &self.options
    }

    pub fn table(&self) -> &str {
        self.options.loader.table()
    }

    /// Generate the run's events. Nothing touches the store here.
    pub fn generate(&self) -> Result<GeneratedEvents, SeedError> {
        let seed = match self.options.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!("No seed given, using {} (pass --seed {} to replay)", seed, seed);
                seed
            }
        };

        let start_time = Instant::now();
        let mut generator = EventGenerator::new(self.options.generator.clone(), seed)?;
        let events = generator.generate_run();
        let duration = start_time.elapsed();

        info!(
            "Generated {} events from {} users in {:?} (seed={})",
            events.len(),
            generator.identities().len(),
            duration,
            seed
        );

        Ok(GeneratedEvents {
            seed,
            events,
            duration,
        })
    }

    /// Acquire a connection under the configured retry policy.
    pub async fn connect<C, S>(&self, connector: &C, sleeper: &S) -> Result<C::Connection, SeedError>
    where
        C: Connector,
        S: Sleeper,
    {
        Ok(acquire(connector, &self.options.retry, sleeper).await?)
    }

    /// Optionally create the table, then load `generated` over an open
    /// connection, verify, and close it.
    ///
    /// The connection is closed on every path. A failed table creation or
    /// batch ends the run; failed verification is only logged.
    pub async fn finish<C>(
        &self,
        connection: &mut C,
        generated: GeneratedEvents,
    ) -> Result<RunSummary, SeedError>
    where
        C: Connection + EventQueries + ?Sized,
    {
        if self.options.create_table {
            if let Err(source) = connection.create_table(self.table()).await {
                close(connection).await;
                return Err(SeedError::CreateTable {
                    table: self.table().to_string(),
                    source,
                });
            }
        }

        let load = match self.options.loader.load(connection, &generated.events).await {
            Ok(load) => load,
            Err(e) => {
                close(connection).await;
                return Err(e.into());
            }
        };

        let verification = self.verify(connection, &generated.events).await;
        close(connection).await;

        Ok(RunSummary {
            seed: generated.seed,
            events_generated: generated.events.len() as u64,
            generation_duration: generated.duration,
            load,
            verification,
        })
    }

    /// Run every phase: generate, connect, load, verify.
    pub async fn run<C, S>(&self, connector: &C, sleeper: &S) -> Result<RunSummary, SeedError>
    where
        C: Connector,
        C::Connection: EventQueries,
        S: Sleeper,
    {
        let generated = self.generate()?;
        let mut connection = self.connect(connector, sleeper).await?;
        self.finish(&mut connection, generated).await
    }

    /// Run the read-only checks. Never fails the run.
    pub async fn verify<Q>(&self, queries: &mut Q, events: &[Event]) -> Option<VerificationReport>
    where
        Q: EventQueries + ?Sized,
    {
        if self.options.verify.skip_verify {
            info!("Skipping verification");
            return None;
        }

        let verifier = Verifier::new(self.table());
        let mut report = match verifier.verify(queries).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Verification failed: {}", e);
                return None;
            }
        };

        let spot_check = self.options.verify.spot_check.min(events.len());
        if spot_check > 0 {
            match verifier.verify_round_trip(queries, &events[..spot_check]).await {
                Ok(round_trip) => {
                    if let Err(e) = round_trip.ensure_success() {
                        warn!("{}", e);
                    }
                    report.round_trip = Some(round_trip);
                }
                Err(e) => warn!("Round-trip check failed: {}", e),
            }
        }

        report.log();
        Some(report)
    }
}

async fn close<C>(connection: &mut C)
where
    C: Connection + ?Sized,
{
    if let Err(e) = connection.close().await {
        warn!("Failed to close connection: {}", e);
    }
}
