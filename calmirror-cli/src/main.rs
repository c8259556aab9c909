mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calmirror")]
#[command(version, about = "Mirror events between two calendars as tagged copies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror both calendars onto each other
    Sync {
        /// Number of days to mirror, starting at --from
        #[arg(short, long)]
        days: Option<u32>,

        /// First day to mirror (YYYY-MM-DD); defaults to today
        #[arg(long)]
        from: Option<String>,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// List every action instead of per-day counts, and log progress
        #[arg(short, long)]
        verbose: bool,

        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check that both configured calendars can be reached
    Check {
        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the config file location
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Sync { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Commands::Sync {
            days,
            from,
            dry_run,
            verbose,
            config,
        } => {
            let args = commands::sync::SyncArgs {
                days,
                from,
                dry_run,
                verbose,
            };
            commands::sync::run(config.as_deref(), args).await
        }
        Commands::Check { config } => commands::check::run(config.as_deref()).await,
        Commands::Config => commands::config::run(),
    }
}

/// Logs go to stderr so they never interleave with the action log.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
