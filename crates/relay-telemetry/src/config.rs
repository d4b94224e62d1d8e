//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error or a full directive)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to include thread ids and source locations
    pub verbose_fields: bool,

    /// Network identifier (devnet, testnet, mainnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "xr-relay".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            verbose_fields: true,
            network: "devnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `XR_SERVICE_NAME`: Service name (default: xr-relay)
    /// - `XR_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `XR_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `XR_VERBOSE_LOGS`: Thread ids and file/line fields (default: true)
    /// - `XR_NETWORK`: Network name (default: devnet)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("XR_SERVICE_NAME").unwrap_or_else(|_| "xr-relay".to_string()),

            log_level: env::var("XR_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("XR_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            verbose_fields: env::var("XR_VERBOSE_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),

            network: env::var("XR_NETWORK").unwrap_or_else(|_| "devnet".to_string()),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.network, "devnet");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
    }

    #[test]
    fn test_config_serializes() {
        let json = serde_json::to_string(&TelemetryConfig::default()).unwrap();
        assert!(json.contains("xr-relay"));
    }
}
