//! Command-line interface for strictly_ultimate.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strictly_ultimate_play::OpponentKind;

/// Strictly Ultimate - Ultimate Tic-Tac-Toe against a random or learning opponent
#[derive(Parser, Debug)]
#[command(name = "strictly_ultimate")]
#[command(about = "Ultimate Tic-Tac-Toe with a pluggable opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a match in the terminal
    Play {
        /// Path to match config (TOML). Defaults apply if omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Opponent controlling O: none, random or remote
        #[arg(short, long)]
        opponent: Option<OpponentKind>,

        /// Learning service base URL
        #[arg(long)]
        service_url: Option<String>,

        /// Seed for the random opponent
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print learning metrics from the service
    Metrics {
        /// Path to match config (TOML). Defaults apply if omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Learning service base URL
        #[arg(long)]
        service_url: Option<String>,
    },
}
