//! # Devnet Proof Oracle
//!
//! Builds inclusion and continuity proofs from a [`SimulatedChain`] once the
//! including block is attested. Waits up to `max_wait` for the transaction
//! to be mined and attested before giving up.

use crate::adapters::sim_chain::{SimBlock, SimulatedChain};
use async_trait::async_trait;
use shared_types::{short_hex, BlockHeight, ChainKey, Proof, TxHash};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use xr_04_relay_engine::{OracleError, ProofOracle};

/// Proof oracle over a simulated source chain.
pub struct DevnetOracle {
    chain: Arc<SimulatedChain>,
    max_wait: Duration,
    poll_interval: Duration,
}

impl DevnetOracle {
    /// Oracle for `chain`.
    pub fn new(chain: Arc<SimulatedChain>, max_wait: Duration) -> Self {
        Self {
            chain,
            max_wait,
            poll_interval: Duration::from_millis(250),
        }
    }

    /// Override the re-check interval while waiting.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// One attempt, no waiting.
    pub fn try_build(&self, tx_hash: &TxHash) -> Result<Proof, OracleError> {
        let (height, index) = self.chain.locate(tx_hash).ok_or(OracleError::NotYetMined)?;
        let attested = self.chain.attested_height();
        let attested_to = match attested {
            Some(attested_to) if attested_to >= height => attested_to,
            _ => return Err(OracleError::NotYetAttested { height, attested }),
        };

        let block = self.block(height)?;
        let sibling_path = block
            .tree()
            .path(index)
            .map_err(|e| OracleError::ProofGenerationFailed(e.to_string()))?;
        let continuity_roots = (height..=attested_to)
            .map(|h| self.block(h).map(|b| b.root))
            .collect::<Result<Vec<_>, _>>()?;
        let raw_transaction = block
            .transactions
            .get(index)
            .cloned()
            .ok_or_else(|| OracleError::ProofGenerationFailed("transaction vanished".into()))?;

        Ok(Proof {
            chain_key: self.chain.key(),
            block_height: height,
            raw_transaction,
            merkle_root: block.root,
            sibling_path,
            continuity_lower_digest: block.parent_digest,
            continuity_roots,
        })
    }

    fn block(&self, height: BlockHeight) -> Result<SimBlock, OracleError> {
        self.chain
            .block(height)
            .ok_or_else(|| OracleError::ProofGenerationFailed(format!("block {height} missing")))
    }
}

#[async_trait]
impl ProofOracle for DevnetOracle {
    async fn generate_proof(
        &self,
        tx_hash: TxHash,
        chain_key: ChainKey,
    ) -> Result<Proof, OracleError> {
        if chain_key != self.chain.key() {
            return Err(OracleError::ProofGenerationFailed(format!(
                "oracle serves chain {}, not {chain_key}",
                self.chain.key()
            )));
        }

        let deadline = Instant::now() + self.max_wait;
        loop {
            match self.try_build(&tx_hash) {
                Ok(proof) => {
                    debug!(
                        tx_hash = %short_hex(&tx_hash),
                        height = proof.block_height,
                        continuity_blocks = proof.continuity_proof_size(),
                        "[devnet] Proof generated"
                    );
                    return Ok(proof);
                }
                Err(e) if Instant::now() >= deadline => return Err(e),
                Err(e) => {
                    debug!(tx_hash = %short_hex(&tx_hash), reason = %e, "[devnet] Waiting for proof");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}
