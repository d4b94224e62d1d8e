//! # Cross-Chain Proof Relay
//!
//! Entry point of the relay binary.
//!
//! ## Configuration
//!
//! All settings come from `XR_*` environment variables; see
//! [`RuntimeConfig`]. `XR_RELAYER_KEY` is required. Logging is controlled by
//! `XR_LOG_LEVEL` (or `RUST_LOG`) and `XR_JSON_LOGS`.

use anyhow::{Context, Result};
use relay_runtime::{RelayRuntime, RuntimeConfig};
use relay_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("failed to load configuration")?;
    let runtime = RelayRuntime::new(config).context("invalid configuration")?;
    runtime.start();

    info!("Relay is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
