//! # Error Types
//!
//! Errors shared across subsystems.

use thiserror::Error;

/// Errors decoding raw transaction bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// No bytes at all.
    #[error("Empty transaction bytes")]
    Empty,

    /// Tag byte outside the supported transaction formats.
    #[error("Unknown transaction type tag: 0x{0:02x}")]
    UnknownTxType(u8),

    /// Body failed to (de)serialize.
    #[error("Malformed transaction body: {0}")]
    Body(String),
}

/// Transient failures talking to a chain endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Endpoint unreachable or returned a transport error.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Requested range is not available on the endpoint.
    #[error("Range unavailable: {from}..={to}")]
    RangeUnavailable { from: u64, to: u64 },

    /// The endpoint could not produce a gas estimate.
    #[error("Gas estimation unavailable: {0}")]
    EstimationUnavailable(String),
}
