//! # Relay Configuration
//!
//! Runtime configuration loaded from `XR_*` environment variables.
//!
//! The runtime drives an in-process devnet: both chains, the attestation
//! oracle and the dispatcher live in this process. Network endpoint
//! variables (`XR_SOURCE_RPC_URL`, `XR_EXECUTION_RPC_URL`, `XR_PROVER_URL`)
//! are rejected rather than ignored.
//!
//! ## Security Requirements
//!
//! - `relayer_key` MUST be set and MUST NOT be the zero key
//! - Unparseable values are fatal; nothing silently falls back to a default

use shared_types::{short_hex, Address, ChainKey, EventKind};
use std::time::Duration;
use thiserror::Error;
use xr_04_relay_engine::{RelayConfig, StreamSpec};

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Required variable not set.
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    /// Variable set but unparseable.
    #[error("Invalid value for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// Values parse but do not make sense together.
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Complete relay configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Relayer signing key.
    pub relayer_key: [u8; 32],
    /// Sleep between relay cycles.
    pub poll_interval: Duration,
    /// Sleep after a failed scan.
    pub error_backoff: Duration,
    /// Processed transaction cache capacity.
    pub cache_capacity: usize,
    /// Attempts per fact before it is abandoned.
    pub max_job_attempts: u32,
    /// Bounded wait inside the proof oracle.
    pub proof_max_wait: Duration,
    /// Interval of the devnet attestation task.
    pub attestation_interval: Duration,
    /// Bridge contract on the source chain.
    pub bridge_contract: Address,
    /// Loan contract on the source chain.
    pub loan_contract: Address,
    /// Dispatcher contract on the execution chain.
    pub dispatcher_contract: Address,
    /// Only accept source events sent by this account.
    pub monitored_actor: Option<Address>,
    /// Chain key of the source chain.
    pub source_chain_key: ChainKey,
    /// Chain key of the execution chain.
    pub execution_chain_key: ChainKey,
    /// Disable replay protection in the dispatcher. Development only.
    pub dev_bypass_replay: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            relayer_key: [0u8; 32],
            poll_interval: Duration::from_secs(5),
            error_backoff: Duration::from_secs(10),
            cache_capacity: 10_000,
            max_job_attempts: 5,
            proof_max_wait: Duration::from_secs(300),
            attestation_interval: Duration::from_secs(2),
            bridge_contract: [0xB1; 20],
            loan_contract: [0x10; 20],
            dispatcher_contract: [0xD1; 20],
            monitored_actor: None,
            source_chain_key: ChainKey(1),
            execution_chain_key: ChainKey(2),
            dev_bypass_replay: false,
        }
    }
}

fn parse_with<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => parse(raw.trim())
            .map(Some)
            .map_err(|reason| ConfigError::Invalid { var, reason }),
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| e.to_string())
}

fn parse_millis(raw: &str) -> Result<Duration, String> {
    parse_number::<u64>(raw).map(Duration::from_millis)
}

fn parse_secs(raw: &str) -> Result<Duration, String> {
    parse_number::<u64>(raw).map(Duration::from_secs)
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got {other:?}")),
    }
}

fn parse_fixed<const N: usize>(raw: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(raw)).map_err(|e| e.to_string())?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| format!("expected {N} bytes, got {len}"))
}

/// Endpoint variables of a networked deployment. No network adapters are
/// wired, so setting any of them is a configuration error.
pub const UNSUPPORTED_ENDPOINT_VARS: [&str; 3] =
    ["XR_SOURCE_RPC_URL", "XR_EXECUTION_RPC_URL", "XR_PROVER_URL"];

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let lookup = &lookup;

        if let Some(var) = UNSUPPORTED_ENDPOINT_VARS
            .into_iter()
            .find(|var| lookup(var).is_some())
        {
            return Err(ConfigError::Invalid {
                var,
                reason: "network endpoints are not supported by the devnet runtime".into(),
            });
        }
        config.relayer_key = parse_with(lookup, "XR_RELAYER_KEY", parse_fixed::<32>)?
            .ok_or(ConfigError::Missing("XR_RELAYER_KEY"))?;

        if let Some(v) = parse_with(lookup, "XR_POLL_INTERVAL_MS", parse_millis)? {
            config.poll_interval = v;
        }
        if let Some(v) = parse_with(lookup, "XR_ERROR_BACKOFF_MS", parse_millis)? {
            config.error_backoff = v;
        }
        if let Some(v) = parse_with(lookup, "XR_CACHE_CAPACITY", parse_number::<usize>)? {
            config.cache_capacity = v;
        }
        if let Some(v) = parse_with(lookup, "XR_MAX_JOB_ATTEMPTS", parse_number::<u32>)? {
            config.max_job_attempts = v;
        }
        if let Some(v) = parse_with(lookup, "XR_PROOF_MAX_WAIT_SECS", parse_secs)? {
            config.proof_max_wait = v;
        }
        if let Some(v) = parse_with(lookup, "XR_ATTESTATION_INTERVAL_MS", parse_millis)? {
            config.attestation_interval = v;
        }

        if let Some(v) = parse_with(lookup, "XR_BRIDGE_CONTRACT", parse_fixed::<20>)? {
            config.bridge_contract = v;
        }
        if let Some(v) = parse_with(lookup, "XR_LOAN_CONTRACT", parse_fixed::<20>)? {
            config.loan_contract = v;
        }
        if let Some(v) = parse_with(lookup, "XR_DISPATCHER_CONTRACT", parse_fixed::<20>)? {
            config.dispatcher_contract = v;
        }
        config.monitored_actor = parse_with(lookup, "XR_MONITORED_ACTOR", parse_fixed::<20>)?;

        if let Some(v) = parse_with(lookup, "XR_SOURCE_CHAIN_KEY", parse_number::<u64>)? {
            config.source_chain_key = ChainKey(v);
        }
        if let Some(v) = parse_with(lookup, "XR_EXECUTION_CHAIN_KEY", parse_number::<u64>)? {
            config.execution_chain_key = ChainKey(v);
        }
        if let Some(v) = parse_with(lookup, "XR_DEV_BYPASS_REPLAY", parse_flag)? {
            config.dev_bypass_replay = v;
        }

        Ok(config)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relayer_key == [0u8; 32] {
            return Err(ConfigError::Validation(
                "SECURITY VIOLATION: relayer key is the zero key. Set XR_RELAYER_KEY.".into(),
            ));
        }
        if self.source_chain_key == self.execution_chain_key {
            return Err(ConfigError::Validation(format!(
                "source and execution chain keys must differ (both {})",
                self.source_chain_key
            )));
        }
        for (name, contract) in [
            ("bridge", self.bridge_contract),
            ("loan", self.loan_contract),
            ("dispatcher", self.dispatcher_contract),
        ] {
            if contract == [0u8; 20] {
                return Err(ConfigError::Validation(format!(
                    "{name} contract address is zero"
                )));
            }
        }
        if self.attestation_interval.is_zero() {
            return Err(ConfigError::Validation(
                "attestation interval must be non-zero".into(),
            ));
        }
        self.relay_config()
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// Streams and engine settings derived from this configuration.
    ///
    /// Source streams are filtered by the monitored actor when one is set.
    pub fn relay_config(&self) -> RelayConfig {
        let source = |contract: Address, event: EventKind| {
            let spec = StreamSpec::source(contract, event);
            match self.monitored_actor {
                Some(actor) => spec.with_actor(actor),
                None => spec,
            }
        };

        RelayConfig {
            poll_interval: self.poll_interval,
            error_backoff: self.error_backoff,
            cache_capacity: self.cache_capacity,
            max_job_attempts: self.max_job_attempts,
            source_chain_key: self.source_chain_key,
            ..RelayConfig::default()
        }
        .with_stream(source(self.bridge_contract, EventKind::BurnForBridge))
        .with_stream(source(self.loan_contract, EventKind::LoanFunded))
        .with_stream(source(self.loan_contract, EventKind::LoanRepaid))
        .with_stream(StreamSpec::execution(self.dispatcher_contract, EventKind::TokensMinted))
        .with_stream(StreamSpec::execution(
            self.dispatcher_contract,
            EventKind::LoanFundingConfirmed,
        ))
        .with_stream(StreamSpec::execution(
            self.dispatcher_contract,
            EventKind::LoanRepaymentNoted,
        ))
        .with_stream(StreamSpec::execution(self.dispatcher_contract, EventKind::FactRecorded))
    }

    /// Deployment summary for startup logs.
    pub fn describe(&self) -> String {
        format!(
            "devnet source={}, execution={}, bridge={}, loan={}, dispatcher={}",
            self.source_chain_key,
            self.execution_chain_key,
            short_hex(&self.bridge_contract),
            short_hex(&self.loan_contract),
            short_hex(&self.dispatcher_contract),
        )
    }
}
