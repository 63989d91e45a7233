// SPDX-License-Identifier: MIT

//! Enduro-Tracker CLI
//!
//! Pulls ride data from Strava under the persisted call budget, caches it in
//! the configured storage backend, and derives best-effort enduro attempts.

use clap::{Parser, Subcommand};
use enduro_tracker::{
    config::{Config, StorageKind},
    models::EnduroCatalog,
    services::{report, ActivitySync, Credentials, QuotaLimits, QuotaTracker, StravaClient},
    storage,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "enduro-tracker", version, about = "Track enduro attempts from Strava rides")]
struct Cli {
    /// Storage backend override (flat-file, memory, sqlite)
    #[arg(long, global = true)]
    storage: Option<String>,

    /// Data directory override
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the most recent activities and merge them into the cache
    UpdateActivities {
        /// How many recent activities to consider (max 200)
        #[arg(long, default_value_t = 200)]
        count: u32,
    },
    /// Walk the full activity history (slow, paced by the API quota)
    GenerateActivities,
    /// Fetch detailed segment records for every enduro segment
    UpdateSegments,
    /// Recompute enduro attempts from the cached rides
    UpdateAttempts,
    /// Print the attempt table for one enduro
    Show {
        /// Enduro name from enduros.json
        enduro: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(name) = &cli.storage {
        config.storage = StorageKind::parse(name)?;
    }

    let storage = storage::open(config.storage, &config.data_dir)?;
    let quota = QuotaTracker::new(config.call_log_path(), QuotaLimits::default());
    let credentials = Credentials::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
        config.strava_refresh_token.clone(),
    );
    let strava =
        StravaClient::new(credentials, quota).with_max_quota_wait(config.max_quota_wait_secs);
    let sync = ActivitySync::new(strava, storage);

    match cli.command {
        Command::UpdateActivities { count } => {
            let fetched = sync.update_activities(count).await?;
            println!("Fetched {} new activities", fetched);
        }
        Command::GenerateActivities => {
            let fetched = sync.generate_all_activities().await?;
            println!("Fetched {} activities from full history", fetched);
        }
        Command::UpdateSegments => {
            let catalog = EnduroCatalog::load_from_file(config.enduros_path())?;
            let count = sync.update_enduro_segments(&catalog).await?;
            println!("Stored {} detailed segments", count);
        }
        Command::UpdateAttempts => {
            let catalog = EnduroCatalog::load_from_file(config.enduros_path())?;
            let total = sync.update_enduro_attempts(&catalog)?;
            println!("Stored {} enduro attempts", total);
        }
        Command::Show { enduro } => {
            let attempts = sync.stored_enduro_attempts(&enduro)?;
            println!("{}", report::tabulate_enduro_attempts(&attempts));
        }
    }

    Ok(())
}

/// Initialize env-filter controlled logging.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("enduro_tracker=info")),
        )
        .init();
}
