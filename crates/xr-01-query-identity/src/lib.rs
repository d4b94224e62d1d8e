//! # XR-01 Query Identity
//!
//! Deterministic identities for cross-chain facts and the replay guard that
//! keeps each identity from being acted on more than once.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! A fact is a transaction at a position inside a block of a ledger. Its
//! identity is `keccak256(chainKey ‖ blockHeight ‖ transactionIndex)`, where
//! the transaction index is rebuilt bit by bit from the inclusion proof's
//! sibling path. Verifiers on the execution chain record these identities,
//! so the byte layout is fixed.
//!
//! ## Module Structure
//!
//! ```text
//! xr-01-query-identity/
//! ├── domain/          # QueryId, index reconstruction, inclusion tree
//! ├── ports/           # ReplayGuard
//! └── adapters/        # InMemoryReplayGuard
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::InMemoryReplayGuard;
pub use domain::{
    compute_identity, compute_transaction_index, identity_for_proof, IdentityError,
    InclusionTree, QueryId, MAX_PATH_DEPTH, SENTINEL_HASH,
};
pub use ports::ReplayGuard;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
