//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod lookup;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;

#[derive(Parser)]
#[command(name = "gamereviews")]
#[command(about = "Game reviews, latest reviewed titles and release calendars from 3DJuegos")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON API server
    Serve {
        /// Bind address: port, host, or host:port (defaults to the configured bind)
        #[arg(short, long, env = "GAMEREVIEWS_BIND")]
        bind: Option<String>,
    },

    /// Look up the reviews of a game and print them as JSON
    Review {
        /// Game name as typed in the site search
        game: String,
    },

    /// List the latest reviewed games
    Latest {
        /// Platform slug (e.g. pc, ps4); all platforms when omitted
        platform: Option<String>,
        /// Number of entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the release calendar for a month
    Releases {
        /// Platform slug; all platforms when omitted
        #[arg(short, long)]
        platform: Option<String>,
        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
        /// Month 1-12 (defaults to the current month)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Review { game } => lookup::cmd_review(&settings, &game).await,
        Commands::Latest { platform, limit } => {
            lookup::cmd_latest(&settings, platform.as_deref(), limit).await
        }
        Commands::Releases {
            platform,
            year,
            month,
        } => lookup::cmd_releases(&settings, platform.as_deref(), year, month).await,
    }
}
