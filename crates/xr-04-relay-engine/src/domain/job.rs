//! Relay job bookkeeping.

use super::stream::{ObservedEvent, StreamKey};
use serde::{Deserialize, Serialize};
use shared_types::{Action, TxHash};

/// A source fact waiting for (another) proof-and-submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFact {
    /// Stream the fact was observed on.
    pub stream: StreamKey,
    /// The observed event.
    pub event: ObservedEvent,
    /// Action the fact authorises.
    pub action: Action,
    /// Attempts already made.
    pub attempts: u32,
}

impl PendingFact {
    /// Fact seen for the first time.
    pub fn new(stream: StreamKey, event: ObservedEvent, action: Action) -> Self {
        Self {
            stream,
            event,
            action,
            attempts: 0,
        }
    }

    /// Transaction hash of the fact.
    pub fn tx_hash(&self) -> TxHash {
        self.event.tx_hash
    }
}

/// A fact the relay gave up on. Needs operator attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbandonedFact {
    /// Stream the fact was observed on.
    pub stream: StreamKey,
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Attempts made.
    pub attempts: u32,
    /// Last error.
    pub reason: String,
}
