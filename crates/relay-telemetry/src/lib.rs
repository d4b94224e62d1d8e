//! # Relay Telemetry
//!
//! Logging and metrics for the relay process.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an env filter, JSON or human output
//! - **Metrics**: Prometheus counters and gauges in a process-wide registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `XR_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `XR_JSON_LOGS` | `true` in containers | JSON formatted logs |
//! | `XR_SERVICE_NAME` | `xr-relay` | Service name in logs |
//! | `XR_NETWORK` | `devnet` | Network label |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    gather_metrics, register_metrics, COMPLETIONS_OBSERVED, CURSOR_HEIGHT, EVENTS_OBSERVED,
    EVENTS_REJECTED, GAS_FALLBACKS, IN_FLIGHT_JOBS, JOB_OUTCOMES, PROOF_LATENCY, PROOF_REQUESTS,
    RETRY_QUEUE_DEPTH, SCAN_ERRORS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric registration failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Bad configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Hold the returned guard for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(&config)?;
    tracing::info!(
        service = %config.service_name,
        network = %config.network,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(TelemetryGuard { config })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    config: TelemetryConfig,
}

impl TelemetryGuard {
    /// Configuration telemetry was started with.
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.config.service_name, "Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "xr-relay");
    }

    #[test]
    fn test_metric_inc_macro() {
        metric_inc!(GAS_FALLBACKS);
        metric_inc!(JOB_OUTCOMES, &["completed"]);
        assert!(GAS_FALLBACKS.get() >= 1.0);
        assert!(JOB_OUTCOMES.with_label_values(&["completed"]).get() >= 1.0);
    }
}
