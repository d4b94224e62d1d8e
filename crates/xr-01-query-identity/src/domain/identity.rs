//! # Query Identity
//!
//! ```text
//! queryId = keccak256( chainKey (u64 BE) ‖ blockHeight (u64 BE) ‖ txIndex (u256 BE) )
//! ```
//!
//! The transaction index is not carried in the proof. It is reconstructed
//! from the sibling path: bit `i` is set iff the sibling at depth `i` sits on
//! the left, least significant bit first.

use super::errors::IdentityError;
use serde::{Deserialize, Serialize};
use shared_types::{keccak256_concat, BlockHeight, ChainKey, Hash, Proof, ProofNode, U256};
use std::fmt;

/// Deepest sibling path whose index fits in 256 bits.
pub const MAX_PATH_DEPTH: usize = 256;

/// Identity of a proven cross-chain fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryId(pub Hash);

impl QueryId {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Owned digest bytes.
    pub fn into_bytes(self) -> Hash {
        self.0
    }
}

impl From<Hash> for QueryId {
    fn from(hash: Hash) -> Self {
        Self(hash)
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Rebuild the leaf position from a leaf-to-root sibling path.
///
/// An empty path yields index 0. Paths deeper than [`MAX_PATH_DEPTH`] are
/// rejected rather than truncated.
pub fn compute_transaction_index(sibling_path: &[ProofNode]) -> Result<U256, IdentityError> {
    if sibling_path.len() > MAX_PATH_DEPTH {
        return Err(IdentityError::PathTooLong {
            depth: sibling_path.len(),
            max: MAX_PATH_DEPTH,
        });
    }

    let mut index = U256::zero();
    for (bit, node) in sibling_path.iter().enumerate() {
        if node.is_left_sibling {
            index = index | (U256::one() << bit);
        }
    }
    Ok(index)
}

/// Hash the `(chain, height, index)` triple into a query identity.
pub fn compute_identity(chain_key: ChainKey, block_height: BlockHeight, tx_index: U256) -> QueryId {
    let mut index_bytes = [0u8; 32];
    tx_index.to_big_endian(&mut index_bytes);
    QueryId(keccak256_concat(&[
        chain_key.to_be_bytes().as_slice(),
        block_height.to_be_bytes().as_slice(),
        index_bytes.as_slice(),
    ]))
}

/// Identity of the fact a proof attests to.
pub fn identity_for_proof(proof: &Proof) -> Result<QueryId, IdentityError> {
    let index = compute_transaction_index(&proof.sibling_path)?;
    Ok(compute_identity(proof.chain_key, proof.block_height, index))
}
