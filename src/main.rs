//! modcache entry point.
//!
//! Runs one refresh of the mod cache. Logs go to stderr; the run summary goes to stdout.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use modcache::cli::Cli;
use modcache::{AppConfig, Pipeline, RunOutcome, RunReport};

async fn run(cli: Cli) -> modcache::Result<RunReport> {
    let mut config = AppConfig::load()?;
    cli.apply(&mut config);
    config.validate()?;

    if cli.force_hash {
        tracing::info!("Forcing recomputation of all asset hashes");
    }

    let mut pipeline = Pipeline::new(config)?;
    pipeline.run(cli.force_hash).await
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modcache=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            if report.outcome == RunOutcome::RateLimitedPartial {
                println!("Rate limit reached; cache written with partial refresh.");
            }
            println!("{}", report.stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Refresh aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
