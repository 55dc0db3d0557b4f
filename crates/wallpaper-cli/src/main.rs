//! wallpaper-collect - fetch today's random wallpaper into the rolling ledger.
//!
//! Exit status: 0 on success, 2 when no payload could be fetched (ledger
//! untouched), 1 for any other fatal error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wallpaper_core::app::{JobBuilder, JobConfig, RetryMode};
use wallpaper_core::domain::{DedupKey, RunError};

const EXIT_FETCH_FAILED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "wallpaper-collect")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Randomization endpoint to fetch
    #[arg(long)]
    url: Option<String>,

    /// Ledger file to update
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Dedup key for new records
    #[arg(long, value_enum)]
    dedup: Option<DedupArg>,

    /// Retry behaviour when the fetch fails
    #[arg(long, value_enum)]
    retry: Option<RetryArg>,

    /// Days between today and the date a record is filed under
    #[arg(long)]
    lookahead_days: Option<u32>,

    /// Days of history kept before today
    #[arg(long)]
    retention_days: Option<u32>,

    /// Civil timezone as minutes east of UTC
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DedupArg {
    Date,
    IdDate,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RetryArg {
    FailFast,
    Bounded,
    Forever,
}

impl Cli {
    fn load_config(&self) -> Result<JobConfig> {
        let mut config = match &self.config {
            Some(path) => JobConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => JobConfig::default(),
        };

        if let Some(url) = &self.url {
            config.target_url = url.clone();
        }
        if let Some(ledger) = &self.ledger {
            config.ledger_path = ledger.clone();
        }
        if let Some(dedup) = self.dedup {
            config.dedup = match dedup {
                DedupArg::Date => DedupKey::Date,
                DedupArg::IdDate => DedupKey::IdDate,
            };
        }
        if let Some(retry) = self.retry {
            config.retry.mode = match retry {
                RetryArg::FailFast => RetryMode::FailFast,
                RetryArg::Bounded => RetryMode::Bounded,
                RetryArg::Forever => RetryMode::Forever,
            };
        }
        if let Some(days) = self.lookahead_days {
            config.lookahead_days = days;
        }
        if let Some(days) = self.retention_days {
            config.retention_days = days;
        }
        if let Some(minutes) = self.utc_offset_minutes {
            config.utc_offset_minutes = minutes;
        }
        Ok(config)
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit_code(&err),
    }
}

/// Fetch failures were already logged by the job; everything else is logged here.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let status = exit_status(err);
    if status != EXIT_FETCH_FAILED {
        error!("{err:#}");
    }
    ExitCode::from(status)
}

/// Looks through the whole context chain, so wrapping a `RunError` keeps status 2.
fn exit_status(err: &anyhow::Error) -> u8 {
    let fetch_failed = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<RunError>())
        .any(RunError::is_fetch_failure);
    if fetch_failed { EXIT_FETCH_FAILED } else { 1 }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let job = JobBuilder::production(&config)
        .context("invalid configuration")?
        .build()?;

    let report = job.run().await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
