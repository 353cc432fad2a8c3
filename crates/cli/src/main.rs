//! Gamewise CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Create the config directory, config file and a sample catalog
//! - `ask`      — Ask one question, or start an interactive session
//! - `catalog`  — List the catalog or preview retrieval for a query
//! - `doctor`   — Diagnose configuration, catalog and provider

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gamewise",
    about = "Gamewise — ask an LLM about video games",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and show each loop step
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the sample game catalog
    Onboard,

    /// Ask James a question
    Ask {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Override the number of model calls allowed per question
        #[arg(long)]
        max_loops: Option<u32>,
    },

    /// Show the game catalog, or the games retrieved for a query
    Catalog {
        /// Preview retrieval for this query
        query: Option<String>,
    },

    /// Diagnose configuration and provider health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Ask { message, max_loops } => {
            commands::ask::run(message, max_loops, cli.verbose).await?
        }
        Commands::Catalog { query } => commands::catalog::run(query).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
