//! # Core Chain Entities
//!
//! Primitives for both ledgers and the proof structure produced by the
//! attestation oracle.
//!
//! ## Clusters
//!
//! - **Primitives**: `Hash`, `Address`, `U256`, `ChainKey`, `ChainSide`
//! - **Proofs**: `Proof`, `ProofNode`
//! - **Word encoding**: 32-byte left-padded words as used in log topics/data

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: PRIMITIVES
// =============================================================================

/// A 32-byte keccak-256 digest.
pub type Hash = [u8; 32];

/// A 20-byte account or contract address.
pub type Address = [u8; 20];

/// Hash of a transaction's raw bytes on its origin chain.
pub type TxHash = Hash;

/// Height of a block on either chain.
pub type BlockHeight = u64;

/// Integer key identifying a ledger inside a query identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainKey(pub u64);

impl ChainKey {
    /// Fixed-width big-endian encoding used in identity hashing.
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of the two ledgers a stream or event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainSide {
    /// Chain where facts originate (burns, loan funding, repayments).
    Source,
    /// Chain where proofs are verified and actions applied.
    Execution,
}

impl fmt::Display for ChainSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSide::Source => write!(f, "source"),
            ChainSide::Execution => write!(f, "execution"),
        }
    }
}

// =============================================================================
// CLUSTER B: PROOFS
// =============================================================================

/// One step of an inclusion path, ordered leaf to root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    /// Sibling hash at this level.
    pub hash: Hash,
    /// `true` when the sibling sits to the left, i.e. the proven node is the
    /// right child at this level.
    pub is_left_sibling: bool,
}

impl ProofNode {
    /// Sibling positioned to the left of the proven node.
    pub fn left(hash: Hash) -> Self {
        Self {
            hash,
            is_left_sibling: true,
        }
    }

    /// Sibling positioned to the right of the proven node.
    pub fn right(hash: Hash) -> Self {
        Self {
            hash,
            is_left_sibling: false,
        }
    }
}

/// Inclusion + continuity proof for one source-chain transaction.
///
/// Produced once by the oracle, consumed once by the verifier, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Ledger the transaction was included in.
    pub chain_key: ChainKey,
    /// Height of the including block.
    pub block_height: BlockHeight,
    /// Raw transaction bytes (tagged envelope, see `receipt`).
    pub raw_transaction: Vec<u8>,
    /// Inclusion tree root committed by the block.
    pub merkle_root: Hash,
    /// Sibling path from leaf to root.
    pub sibling_path: Vec<ProofNode>,
    /// Digest anchoring the lower end of the continuity chain.
    pub continuity_lower_digest: Hash,
    /// Ordered per-block digests up to the attested height.
    pub continuity_roots: Vec<Hash>,
}

impl Proof {
    /// Number of blocks covered by the continuity chain.
    pub fn continuity_proof_size(&self) -> usize {
        self.continuity_roots.len()
    }
}

// =============================================================================
// CLUSTER C: WORD ENCODING
// =============================================================================

/// Left-pad an address into a 32-byte word.
pub fn address_to_word(address: &Address) -> Hash {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

/// Take the low 20 bytes of a word as an address.
///
/// Returns `None` if the upper 12 bytes are not zero.
pub fn word_to_address(word: &Hash) -> Option<Address> {
    if word[..12].iter().any(|b| *b != 0) {
        return None;
    }
    let mut address = [0u8; 20];
    address.copy_from_slice(&word[12..]);
    Some(address)
}

/// Big-endian 32-byte encoding of a `U256`.
pub fn u256_to_word(value: U256) -> Hash {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Decode a big-endian 32-byte word.
pub fn word_to_u256(word: &[u8]) -> U256 {
    U256::from_big_endian(word)
}

/// Short hex rendering for log fields (`0xabcd…`).
pub fn short_hex(bytes: &[u8]) -> String {
    let take = bytes.len().min(4);
    format!("0x{}…", hex::encode(&bytes[..take]))
}
