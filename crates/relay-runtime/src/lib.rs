//! # Relay Runtime Library
//!
//! Configuration, devnet adapters and the runtime that drives the relay
//! engine. The main entry point is the `main.rs` binary.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load and validate configuration (fatal on error)
//! 3. Build the container (chains, oracle, verifier, dispatcher, engine)
//! 4. Start the attestation task, the relay loop and the loan expiry sweep
//! 5. Run until Ctrl+C, then stop and wait for in-flight jobs

#![warn(missing_docs)]

pub mod adapters;
pub mod container;
pub mod sweeper;

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::adapters::run_attestor;
use crate::sweeper::run_expiry_sweeper;
pub use crate::container::{ConfigError, RelayContainer, RuntimeConfig};

/// The runtime orchestrating the relay.
pub struct RelayRuntime {
    /// Configuration the runtime was built with.
    config: RuntimeConfig,
    /// Container with all services.
    container: Arc<RelayContainer>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    /// Background tasks.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl RelayRuntime {
    /// Validate `config` and build the container.
    pub fn new(config: RuntimeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(deployment = %config.describe(), "Creating relay runtime");

        let container = Arc::new(RelayContainer::new(&config)?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            config,
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the attestation task, the relay loop and the expiry sweeper.
    pub fn start(&self) {
        info!("===========================================");
        info!("  Cross-Chain Proof Relay v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let attestor = tokio::spawn(run_attestor(
            Arc::clone(&self.container.source),
            self.config.attestation_interval,
            self.shutdown_rx.clone(),
        ));

        let engine = Arc::clone(&self.container.engine);
        let shutdown = self.shutdown_rx.clone();
        let relay = tokio::spawn(async move { engine.run(shutdown).await });

        let sweeper = tokio::spawn(run_expiry_sweeper(
            Arc::clone(&self.container.dispatcher) as _,
            self.config.poll_interval,
            self.shutdown_rx.clone(),
        ));

        self.tasks.lock().extend([attestor, relay, sweeper]);
        info!("Relay running");
    }

    /// Signal shutdown and wait for the relay loop and its jobs to finish.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Background task failed");
            }
        }
        info!("Shutdown complete");
    }

    /// Container with all services.
    pub fn container(&self) -> Arc<RelayContainer> {
        Arc::clone(&self.container)
    }

    /// Configuration in use.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}
