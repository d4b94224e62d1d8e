//! # Streams
//!
//! A stream is one `(chain side, contract, event)` triple the relay polls.

use serde::{Deserialize, Serialize};
use shared_types::{short_hex, Address, BlockHeight, ChainSide, EventKind, Hash, TxHash};
use std::fmt;

/// Identity of a polled stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamKey {
    /// Chain the contract lives on.
    pub side: ChainSide,
    /// Tracked contract.
    pub contract: Address,
    /// Event name.
    pub event: EventKind,
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.side, short_hex(&self.contract), self.event)
    }
}

/// A stream plus the filters applied to its events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSpec {
    /// Stream identity.
    pub key: StreamKey,
    /// When set, only events whose actor matches are accepted.
    pub monitored_actor: Option<Address>,
    /// First height to scan on cold start instead of the live height.
    pub start_height: Option<BlockHeight>,
}

impl StreamSpec {
    /// Stream on `side` for `event` emitted by `contract`.
    pub fn new(side: ChainSide, contract: Address, event: EventKind) -> Self {
        Self {
            key: StreamKey {
                side,
                contract,
                event,
            },
            monitored_actor: None,
            start_height: None,
        }
    }

    /// Source chain fact stream.
    pub fn source(contract: Address, event: EventKind) -> Self {
        Self::new(ChainSide::Source, contract, event)
    }

    /// Execution chain completion stream.
    pub fn execution(contract: Address, event: EventKind) -> Self {
        Self::new(ChainSide::Execution, contract, event)
    }

    /// Only accept events from `actor`.
    pub fn with_actor(mut self, actor: Address) -> Self {
        self.monitored_actor = Some(actor);
        self
    }

    /// Resume scanning at `height` on cold start.
    pub fn starting_at(mut self, height: BlockHeight) -> Self {
        self.start_height = Some(height);
        self
    }
}

/// An event returned by a chain scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedEvent {
    /// Event name (from topic 0).
    pub kind: EventKind,
    /// Transaction that emitted it.
    pub tx_hash: TxHash,
    /// Including block.
    pub block_height: BlockHeight,
    /// Position among the block's logs.
    pub log_index: u32,
    /// Contract that emitted the log.
    pub emitter: Address,
    /// Sender of the emitting transaction.
    pub actor: Address,
    /// Query identity carried by completion events.
    pub query_id: Option<Hash>,
}
