//! Cellflow - File-based processing pipeline for cell response experiment data
//!
//! Watches a drop directory for raw experiment files and runs them through
//! extraction, validation, and aggregation until interrupted.

use anyhow::Result;
use cellflow::{Pipeline, PipelineConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cellflow")]
#[command(version)]
#[command(about = "File-based processing pipeline for cell response experiment data")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CELLFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cellflow={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = if let Some(config_path) = cli.config {
        let content = std::fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        PipelineConfig::default()
    };

    let mut pipeline = Pipeline::new(config);
    pipeline.start().await?;

    tracing::info!("Pipeline is running. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down...");
    pipeline.stop().await;

    Ok(())
}
