//! Cold wallet treasury - operator CLI
//!
//! Bootstraps and inspects the signed state the sweep runs against, and
//! runs the cold wallet address check on demand.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

// Use the library crate
use cold_wallet_treasury::cli::commands;
use cold_wallet_treasury::config::Config;

/// Cold wallet treasury operator tool
#[derive(Parser)]
#[command(name = "treasury")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml", env = "TREASURY_CONFIG")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set missing transfer timestamps so the sweep has a baseline
    InitState,

    /// Check the configured cold wallet addresses against the recorded hashes
    CheckColdWallet,

    /// Show the stored state configuration and verify its hash
    State,

    /// Show per-network target and sweep threshold
    Thresholds,

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cold_wallet_treasury=info".parse()?),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::InitState => commands::init_state(&config).await,
        Commands::CheckColdWallet => commands::check_cold_wallet(&config).await,
        Commands::State => commands::show_state(&config).await,
        Commands::Thresholds => commands::thresholds(&config),
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
