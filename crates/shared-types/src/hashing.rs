//! # Keccak-256 Hashing
//!
//! One-shot helpers used for identities, inclusion trees, event signatures
//! and transaction hashes.

use crate::entities::Hash;
use sha3::{Digest, Keccak256};

/// Keccak-256 of a single input.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 of the concatenation of several inputs.
pub fn keccak256_concat(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().into()
}
