//! skywatch-bot: watches published observing schedules and announces
//! each visit at the moment its observation window opens.
//!
//! Startup is the only place the process is allowed to die: the `.env`
//! file carrying the sink credentials must exist, and the four signing
//! secrets must be set. Everything after that is absorbed by the loop.

use std::time::Duration;

use clap::Parser;
use tracing::info;

use skywatch_core::config::{self, Config};
use skywatch_ingest::Ingestor;
use skywatch_notify::StatusNotifier;
use skywatch_schedule::persist::{self, StatePaths};

mod detect;
mod runner;

use runner::Runner;

/// Observation schedule bot: ingests published schedules and announces
/// visits as their windows open.
#[derive(Parser, Debug)]
#[command(name = "skywatch-bot", version, about)]
struct Cli {
    /// Seconds between window-detection passes.
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 5)]
    poll_interval: u64,

    /// Seconds between schedule re-ingestion and state saves.
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 3600)]
    refresh_interval: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let dotenv_path = config::load_dotenv()?;
    info!(path = %dotenv_path.display(), "loaded environment file");

    let config = Config::from_env()?;
    config.log_summary();

    let paths = StatePaths::in_dir(&config.storage.data_dir);
    let store = persist::load(&paths);

    let ingestor = Ingestor::new(config.source.clone());
    let notifier = StatusNotifier::new(&config.sink);

    let mut runner = Runner::new(
        store,
        ingestor,
        Box::new(notifier),
        paths,
        Duration::from_secs(cli.poll_interval),
        Duration::from_secs(cli.refresh_interval),
    );

    info!(
        poll_interval = cli.poll_interval,
        refresh_interval = cli.refresh_interval,
        "skywatch-bot starting"
    );
    runner.run().await;

    Ok(())
}
