use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use threadscribe::cli::{commands, Cli};
use threadscribe::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        warn!("{}; using default configuration", e);
        Config::default()
    });

    commands::scrape(&cli, &config).await?;

    Ok(())
}
