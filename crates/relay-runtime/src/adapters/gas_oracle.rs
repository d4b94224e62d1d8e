//! Devnet gas oracle.
//!
//! The simulated execution chain has no estimation endpoint, so every
//! request fails and the relay falls back to the size-based budget.

use async_trait::async_trait;
use shared_types::{Action, ChainError, Proof};
use xr_04_relay_engine::GasOracle;

/// Gas oracle without an estimation backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEstimateGasOracle;

#[async_trait]
impl GasOracle for NoEstimateGasOracle {
    async fn estimate_gas(&self, _proof: &Proof, _action: Option<Action>) -> Result<u64, ChainError> {
        Err(ChainError::EstimationUnavailable(
            "devnet execution chain does not estimate gas".into(),
        ))
    }
}
