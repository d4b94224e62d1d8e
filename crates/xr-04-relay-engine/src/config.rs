//! # Relay Engine Configuration

use crate::domain::{RelayError, RelayResult, StreamKey, StreamSpec};
use serde::{Deserialize, Serialize};
use shared_types::ChainKey;
use std::collections::HashSet;
use std::time::Duration;

/// Relay engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Sleep between cycles.
    pub poll_interval: Duration,
    /// Sleep after a failed scan.
    pub error_backoff: Duration,
    /// Processed transaction cache capacity.
    pub cache_capacity: usize,
    /// Attempts per fact before it is abandoned.
    pub max_job_attempts: u32,
    /// Abandoned facts kept for inspection; the oldest are dropped first.
    pub abandoned_capacity: usize,
    /// Chain key of the source chain, used in proof requests.
    pub source_chain_key: ChainKey,
    /// Streams to poll.
    pub streams: Vec<StreamSpec>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            error_backoff: Duration::from_secs(10),
            cache_capacity: 10_000,
            max_job_attempts: 5,
            abandoned_capacity: 1_000,
            source_chain_key: ChainKey(1),
            streams: Vec::new(),
        }
    }
}

impl RelayConfig {
    /// Add a stream.
    pub fn with_stream(mut self, stream: StreamSpec) -> Self {
        self.streams.push(stream);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> RelayResult<()> {
        if self.poll_interval.is_zero() {
            return Err(RelayError::Config("poll_interval must be non-zero".into()));
        }
        if self.cache_capacity == 0 {
            return Err(RelayError::Config("cache_capacity must be non-zero".into()));
        }
        if self.max_job_attempts == 0 {
            return Err(RelayError::Config("max_job_attempts must be non-zero".into()));
        }
        if self.abandoned_capacity == 0 {
            return Err(RelayError::Config("abandoned_capacity must be non-zero".into()));
        }
        if self.streams.is_empty() {
            return Err(RelayError::Config("at least one stream is required".into()));
        }

        let mut seen: HashSet<StreamKey> = HashSet::new();
        for stream in &self.streams {
            let key = stream.key;
            if !seen.insert(key) {
                return Err(RelayError::Config(format!("duplicate stream {key}")));
            }
            if key.event.side() != key.side {
                return Err(RelayError::Config(format!(
                    "{} is not emitted on the {} chain",
                    key.event, key.side
                )));
            }
        }
        Ok(())
    }
}
