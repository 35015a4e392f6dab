//! `block-herald` entry point.
//!
//! Events are handled on a single thread; the block gate only serializes
//! overlapping async handler invocations.

use anyhow::{Context, Result};
use herald_runtime::{HeraldConfig, HeraldRuntime};
use herald_telemetry::{init_logging, TelemetryConfig};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging(&TelemetryConfig::from_env())?;

    // Load configuration
    let config = HeraldConfig::from_env().context("Invalid configuration")?;
    info!(?config, "Configuration loaded");

    let runtime = HeraldRuntime::new(config)?;
    let _connection = runtime.start().await?;

    // Keep the subscription alive
    info!("Herald is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    Ok(())
}
