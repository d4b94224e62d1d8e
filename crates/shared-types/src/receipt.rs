//! # Transaction Envelope Schema
//!
//! Raw transaction bytes carried inside a proof are a closed, versioned
//! format: one tag byte selecting the transaction format, followed by the
//! fixed-int bincode encoding of the transaction body and its receipt.
//!
//! ```text
//! ┌────────┬─────────────────────────────────────────────┐
//! │ tag u8 │ bincode(TransactionBody { .., receipt })    │
//! └────────┴─────────────────────────────────────────────┘
//! ```
//!
//! Unknown tags and trailing bytes are rejected; there is no best-effort
//! parsing.

use crate::entities::{Address, Hash, TxHash};
use crate::errors::CodecError;
use crate::hashing::keccak256;
use bincode::Options;
use serde::{Deserialize, Serialize};

/// Upper bound on an encoded transaction body.
pub const MAX_ENCODED_TX_BYTES: u64 = 1 << 20;

/// Supported transaction formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TxType {
    /// Pre-typed transaction.
    Legacy = 0x00,
    /// Transaction with an access list.
    AccessList = 0x01,
    /// Transaction with dynamic fee fields.
    DynamicFee = 0x02,
}

impl TxType {
    /// Tag byte written in front of the body.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Map a tag byte back onto the closed set.
    pub fn from_tag(tag: u8) -> Option<TxType> {
        match tag {
            0x00 => Some(TxType::Legacy),
            0x01 => Some(TxType::AccessList),
            0x02 => Some(TxType::DynamicFee),
            _ => None,
        }
    }
}

/// Receipt status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    /// Execution reverted.
    Failure,
    /// Execution succeeded.
    Success,
}

/// A single receipt log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics, topic 0 being the event signature.
    pub topics: Vec<Hash>,
    /// Non-indexed data.
    pub data: Vec<u8>,
}

/// Execution receipt of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Success or failure.
    pub status: ReceiptStatus,
    /// Emitted logs, in emission order.
    pub logs: Vec<Log>,
}

/// Transaction fields shared by every format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    /// Sender.
    pub from: Address,
    /// Called contract.
    pub to: Address,
    /// Sender nonce.
    pub nonce: u64,
    /// Call data.
    pub input: Vec<u8>,
    /// Receipt produced by executing the transaction.
    pub receipt: Receipt,
}

/// Tagged transaction as carried in a proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    /// Format tag.
    pub tx_type: TxType,
    /// Body and receipt.
    pub body: TransactionBody,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
        .with_limit(MAX_ENCODED_TX_BYTES)
        .reject_trailing_bytes()
}

impl TransactionEnvelope {
    /// Create an envelope.
    pub fn new(tx_type: TxType, body: TransactionBody) -> Self {
        Self { tx_type, body }
    }

    /// Encode into raw transaction bytes.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let body = codec()
            .serialize(&self.body)
            .map_err(|e| CodecError::Body(e.to_string()))?;
        let mut raw = Vec::with_capacity(body.len() + 1);
        raw.push(self.tx_type.tag());
        raw.extend_from_slice(&body);
        Ok(raw)
    }

    /// Decode raw transaction bytes.
    pub fn decode(raw: &[u8]) -> Result<Self, CodecError> {
        let (tag, body) = raw.split_first().ok_or(CodecError::Empty)?;
        let tx_type = TxType::from_tag(*tag).ok_or(CodecError::UnknownTxType(*tag))?;
        let body = codec()
            .deserialize::<TransactionBody>(body)
            .map_err(|e| CodecError::Body(e.to_string()))?;
        Ok(Self { tx_type, body })
    }

    /// Whether the receipt reports success.
    pub fn succeeded(&self) -> bool {
        self.body.receipt.status == ReceiptStatus::Success
    }
}

/// Hash identifying raw transaction bytes on their origin chain.
pub fn transaction_hash(raw: &[u8]) -> TxHash {
    keccak256(raw)
}
