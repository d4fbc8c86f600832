//! Operator CLI for importing job offers and events from web pages.

mod cmd;
mod config;
mod context;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::context::AppContext;

#[derive(Parser)]
#[command(name = "job-import")]
#[command(about = "Import job offers and events from web pages")]
struct Cli {
    /// Accept every prompt with its default answer
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview one page and import it after confirmation
    Single(cmd::single::SingleArgs),

    /// Discover the links on a listing page and import them one by one
    Batch(cmd::batch::BatchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_import=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(endpoint = %config.extraction_endpoint, "Configuration loaded");

    let ctx = AppContext::new(config, cli.yes);

    match cli.command {
        Commands::Single(args) => cmd::single::run(&ctx, args).await,
        Commands::Batch(args) => cmd::batch::run(&ctx, args).await,
    }
}
