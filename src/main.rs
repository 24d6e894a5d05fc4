//! Command-line interface for event-seeder
//!
//! Connection parameters come from `--db-*` flags or the `DB_HOST`,
//! `DB_PORT`, `DB_NAME`, `DB_USER` and `DB_PASSWORD` environment variables.
//! Set `RUST_LOG` to change the log level (default `info`).

use anyhow::Context;
use clap::Parser;
use event_populate::{CommonPopulateArgs, MemoryConnector, MemoryStore, TokioSleeper};
use event_populate_postgresql::{PostgreSQLArgs, PostgreSQLConnector};
use event_seeder::{RunSummary, SeedOptions, Seeder};
use event_verify::VerifyArgs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "event-seeder")]
#[command(about = "Seed an analytics events table with synthetic data")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonPopulateArgs,

    #[command(flatten)]
    postgresql: PostgreSQLArgs,

    #[command(flatten)]
    verify: VerifyArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let options =
        SeedOptions::from_args(&cli.common, &cli.verify).context("Invalid seeder options")?;
    let seeder = Seeder::new(options);

    let summary = if cli.common.dry_run {
        tracing::info!("Dry run: loading into an in-memory store");
        let connector = MemoryConnector::new(MemoryStore::new());
        seeder
            .run(&connector, &TokioSleeper)
            .await
            .context("Dry run failed")?
    } else {
        let connector = PostgreSQLConnector::from_args(&cli.postgresql);
        seeder
            .run(&connector, &TokioSleeper)
            .await
            .with_context(|| format!("Failed to seed PostgreSQL table '{}'", seeder.table()))?
    };

    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    tracing::info!(
        "Seeded {} events (seed={}): generated in {:?}, loaded {} rows in {} batches in {:?} ({:.2} rows/sec)",
        summary.events_generated,
        summary.seed,
        summary.generation_duration,
        summary.load.rows_committed,
        summary.load.batches_committed,
        summary.load.total_duration,
        summary.load.rows_per_second()
    );
    if let Some(report) = &summary.verification {
        tracing::info!("Verification: {}", report.summary());
    }
}
