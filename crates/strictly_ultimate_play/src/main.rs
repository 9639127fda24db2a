//! Strictly Ultimate - Unified CLI
//!
//! Terminal Ultimate Tic-Tac-Toe with a random or learning opponent.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use strictly_ultimate_play::{
    LearningClient, OpponentKind, PlayConfig, ServiceConfig, TurnController,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never interleave with the board on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            opponent,
            service_url,
            seed,
        } => run_play(config, opponent, service_url, seed).await,
        Command::Metrics {
            config,
            service_url,
        } => run_metrics(config, service_url).await,
    }
}

/// Load config file (if any), then environment, then CLI overrides.
fn load_config(path: Option<PathBuf>, service_url: Option<String>) -> Result<PlayConfig> {
    let config = match path {
        Some(path) => PlayConfig::from_file(path)?,
        None => PlayConfig::default(),
    }
    .apply_env();

    Ok(match service_url {
        Some(url) => {
            let service = ServiceConfig::new(url)
                .with_timeout(config.service().timeout())
                .with_training(*config.service().training());
            config.with_service(service)
        }
        None => config,
    })
}

/// Run an interactive match
#[instrument(skip_all)]
async fn run_play(
    config: Option<PathBuf>,
    opponent: Option<OpponentKind>,
    service_url: Option<String>,
    seed: Option<u64>,
) -> Result<()> {
    let mut config = load_config(config, service_url)?;
    if let Some(opponent) = opponent {
        config = config.with_opponent(opponent);
    }
    if seed.is_some() {
        config = config.with_seed(seed);
    }

    let client = match LearningClient::new(config.service()) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "Learning service client unavailable");
            None
        }
    };

    info!(opponent = %config.opponent(), service = %config.service().base_url(), "Starting match");
    let controller = TurnController::new(&config, client)?;
    strictly_ultimate_play::terminal::run(controller).await
}

/// Print learning metrics from the service
#[instrument(skip_all)]
async fn run_metrics(config: Option<PathBuf>, service_url: Option<String>) -> Result<()> {
    let config = load_config(config, service_url)?;
    let client = LearningClient::new(config.service())?;

    info!(service = %client.base_url(), "Fetching learning metrics");
    let metrics = client.metrics().await?;
    println!("{}", metrics);
    Ok(())
}
