//! # Outbound Ports (Driven Ports)
//!
//! Collaborators the dispatcher calls out to.

use async_trait::async_trait;
use shared_types::{BlockHeight, Proof};
use thiserror::Error;

/// Verifier transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Verifier error: {0}")]
pub struct VerifierError(pub String);

/// Inclusion and continuity verifier.
///
/// Treated as a trusted boolean oracle: `Ok(false)` means the proof does
/// not check out, `Err` means no answer could be obtained.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    /// Check a proof.
    async fn verify(&self, proof: &Proof) -> Result<bool, VerifierError>;
}

/// Current execution chain height, used for loan deadlines.
pub trait ExecutionClock: Send + Sync {
    /// Height of the block being executed.
    fn current_height(&self) -> BlockHeight;
}
