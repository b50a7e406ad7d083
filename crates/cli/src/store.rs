use std::io;
use std::path::PathBuf;

use clap::Parser;
use mcp::Service;
use store::{StoreConfig, StoreTools};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clerk-store")]
#[command(about = "Merchant store tool host", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (api_base, merchant_id)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol; everything else goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::from_env(),
    };
    info!(api_base = %config.api_base, merchant_id = %config.merchant_id, "serving store tools");

    let service = Service::new("clerk-store", StoreTools::new(config));
    service.run().await?;

    info!("transport closed, exiting");
    Ok(())
}

/// Host binary errors.
#[derive(Debug, thiserror::Error)]
enum Error {
    /// Configuration is invalid or unreadable.
    #[error(transparent)]
    Config(#[from] store::ConfigError),

    /// The transport loop failed.
    #[error(transparent)]
    Transport(#[from] mcp::Error),
}

type Result<T> = std::result::Result<T, Error>;
