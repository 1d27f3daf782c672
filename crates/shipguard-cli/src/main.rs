//! Shipguard CLI - operator tooling for the reconciliation service

mod api;
mod commands;
mod error;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shipguard_common::logging::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "shipguard", about = "Shipguard reconciliation operator CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a paced batch-recovery session over an order date range
    Recover(commands::recover::RecoverArgs),
    /// Check that the reconciliation server is reachable
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging(&LogConfig::for_service("shipguard-cli"))?;

    let cli = Cli::parse();
    let client = api::ApiClient::from_env()?;

    match cli.command {
        Commands::Recover(args) => commands::recover::run(&client, args).await?,
        Commands::Status => commands::status(&client).await?,
    }

    Ok(())
}
