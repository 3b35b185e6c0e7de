//! Fitroom CLI - virtual try-on synthesis and vision-language tagging.
//!
//! Thin front end over `fitroom-core`: reads image files, drives the
//! orchestrator, and writes structured results to stdout (or a file).
//! All provider settings come from the environment (`TRYON_PROVIDER`,
//! `DASHSCOPE_API_KEY`, ...).
//!
//! # Usage
//!
//! ```bash
//! # Tag a garment photo
//! fitroom tag shirt.jpg
//!
//! # Composite a try-on locally (TRYON_PROVIDER=mock, the default)
//! fitroom tryon person.jpg shirt.jpg --output result.jpg
//!
//! # Outfit recommendation from a closet/weather summary
//! fitroom recommend --input closet.json
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Fitroom - virtual try-on synthesis and vision-language tagging.
#[derive(Parser, Debug)]
#[command(name = "fitroom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Tag a clothing image with the vision-language model
    Tag(cli::tag::TagArgs),

    /// Produce a try-on image for a person/garment pair
    Tryon(cli::tryon::TryonArgs),

    /// Suggest an outfit from a closet/weather summary
    Recommend(cli::recommend::RecommendArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    // Note: a malformed numeric env var falls back to defaults rather
    // than aborting, so unrelated commands keep working.
    let config = match fitroom_core::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("failed to read configuration from environment: {e}; using defaults");
            fitroom_core::Config::default()
        }
    };
    tracing::debug!("fitroom v{}", fitroom_core::VERSION);

    let fitroom = fitroom_core::Fitroom::new(config);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Tag(args) => cli::tag::execute(&fitroom, args).await,
        Commands::Tryon(args) => cli::tryon::execute(&fitroom, args).await,
        Commands::Recommend(args) => cli::recommend::execute(&fitroom, args).await,
    }
}
