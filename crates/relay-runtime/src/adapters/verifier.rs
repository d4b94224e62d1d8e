//! # Devnet Proof Verifier
//!
//! Light-client style check of a proof against the attested source chain:
//! the inclusion path must lead to the block root, the block root must open
//! the continuity chain, and the chain folded from the lower digest must end
//! on an attested digest.

use crate::adapters::sim_chain::SimulatedChain;
use async_trait::async_trait;
use shared_types::{keccak256_concat, transaction_hash, Proof};
use std::sync::Arc;
use tracing::debug;
use xr_01_query_identity::InclusionTree;
use xr_03_action_dispatcher::{ProofVerifier, VerifierError};

/// Verifier backed by the source chain's attestations.
pub struct ContinuityVerifier {
    source: Arc<SimulatedChain>,
}

impl ContinuityVerifier {
    /// Verifier trusting the attestations of `source`.
    pub fn new(source: Arc<SimulatedChain>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ProofVerifier for ContinuityVerifier {
    async fn verify(&self, proof: &Proof) -> Result<bool, VerifierError> {
        if proof.chain_key != self.source.key() {
            debug!(chain_key = %proof.chain_key, "[devnet] Proof for unknown chain");
            return Ok(false);
        }
        if proof.continuity_roots.first() != Some(&proof.merkle_root) {
            return Ok(false);
        }

        let leaf = transaction_hash(&proof.raw_transaction);
        if !InclusionTree::verify(&leaf, &proof.sibling_path, &proof.merkle_root) {
            return Ok(false);
        }

        let tip = proof
            .continuity_roots
            .iter()
            .fold(proof.continuity_lower_digest, |digest, root| {
                keccak256_concat(&[digest.as_slice(), root.as_slice()])
            });
        let Some(end) = proof
            .block_height
            .checked_add(proof.continuity_roots.len() as u64 - 1)
        else {
            return Ok(false);
        };

        match self.source.attested_digest(end) {
            Some(attested) => Ok(attested == tip),
            None => Err(VerifierError(format!("block {end} is not attested yet"))),
        }
    }
}
