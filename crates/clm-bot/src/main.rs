//! Concentrated-Liquidity Market-Making Bot - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Concentrated-liquidity market-making bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via CLM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    clm_telemetry::init_logging()?;

    info!("Starting clm-bot v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("CLM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = clm_bot::AppConfig::from_file(&config_path)?;
    info!(
        pool = %config.pair().cex_symbol(),
        hedge_mode = ?config.strategy.hedge_mode,
        "Configuration loaded"
    );

    let app = clm_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
