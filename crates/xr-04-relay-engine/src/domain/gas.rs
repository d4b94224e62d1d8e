//! # Gas Estimation
//!
//! Direct estimate from the execution chain, falling back to a size-based
//! formula over the continuity proof:
//!
//! ```text
//! gas = 21_000 + continuity_blocks × 5_000 + 20_000
//! ```

use crate::ports::GasOracle;
use relay_telemetry::GAS_FALLBACKS;
use shared_types::{Action, Proof};
use std::sync::Arc;
use tracing::{debug, warn};

/// Intrinsic transaction cost.
pub const BASE_GAS: u64 = 21_000;

/// Cost per block in the continuity proof.
pub const PER_CONTINUITY_BLOCK_GAS: u64 = 5_000;

/// Dispatch and event emission overhead.
pub const DISPATCH_OVERHEAD_GAS: u64 = 20_000;

/// Size-based budget for a proof covering `continuity_blocks` blocks.
pub fn fallback_gas(continuity_blocks: usize) -> u64 {
    let blocks = u64::try_from(continuity_blocks).unwrap_or(u64::MAX);
    BASE_GAS
        .saturating_add(blocks.saturating_mul(PER_CONTINUITY_BLOCK_GAS))
        .saturating_add(DISPATCH_OVERHEAD_GAS)
}

/// Gas budget for a submission.
pub struct GasEstimator {
    oracle: Arc<dyn GasOracle>,
}

impl GasEstimator {
    /// Estimator backed by `oracle`.
    pub fn new(oracle: Arc<dyn GasOracle>) -> Self {
        Self { oracle }
    }

    /// Direct estimate, or the fallback formula if the oracle fails.
    pub async fn estimate(&self, proof: &Proof, action: Option<Action>) -> u64 {
        match self.oracle.estimate_gas(proof, action).await {
            Ok(gas) => {
                debug!(gas, "[xr-04] Direct gas estimate");
                gas
            }
            Err(e) => {
                let gas = fallback_gas(proof.continuity_proof_size());
                warn!(
                    error = %e,
                    gas,
                    continuity_blocks = proof.continuity_proof_size(),
                    "[xr-04] Gas estimation failed, using fallback"
                );
                GAS_FALLBACKS.inc();
                gas
            }
        }
    }
}
