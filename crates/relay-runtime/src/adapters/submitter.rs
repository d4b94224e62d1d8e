//! # Dispatcher Submitter
//!
//! Hands proofs to the execution-chain dispatcher and writes the resulting
//! completion event into the execution chain so the completion streams can
//! observe it.

use crate::adapters::sim_chain::SimulatedChain;
use async_trait::async_trait;
use shared_types::{short_hex, Address};
use std::sync::Arc;
use tracing::{debug, info};
use xr_03_action_dispatcher::{DispatchError, DispatcherApi};
use xr_04_relay_engine::{ProofSubmitter, SubmissionOutcome, SubmissionRequest, SubmitError};

/// Map a dispatcher failure onto the relay's submission taxonomy.
pub fn classify(error: DispatchError) -> Result<SubmissionOutcome, SubmitError> {
    match error {
        DispatchError::AlreadyProcessed(_) => Ok(SubmissionOutcome::AlreadyProcessed),
        DispatchError::VerificationFailed(_) | DispatchError::VerifierUnavailable(_) => {
            Err(SubmitError::VerificationFailed(error.to_string()))
        }
        DispatchError::InvalidProof(_) | DispatchError::MalformedEvent(_) => {
            Err(SubmitError::MalformedEvent(error.to_string()))
        }
        DispatchError::Ledger(_) | DispatchError::Token(_) => {
            Err(SubmitError::Rejected(error.to_string()))
        }
    }
}

/// Submitter calling a dispatcher in-process.
pub struct DispatcherSubmitter {
    dispatcher: Arc<dyn DispatcherApi>,
    execution: Arc<SimulatedChain>,
    relayer: Address,
    dispatcher_contract: Address,
}

impl DispatcherSubmitter {
    /// Submitter sending from `relayer` to the dispatcher at
    /// `dispatcher_contract`.
    pub fn new(
        dispatcher: Arc<dyn DispatcherApi>,
        execution: Arc<SimulatedChain>,
        relayer: Address,
        dispatcher_contract: Address,
    ) -> Self {
        Self {
            dispatcher,
            execution,
            relayer,
            dispatcher_contract,
        }
    }
}

#[async_trait]
impl ProofSubmitter for DispatcherSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionOutcome, SubmitError> {
        debug!(
            correlation_id = %request.correlation_id,
            gas_budget = request.gas_budget,
            height = request.proof.block_height,
            "[devnet] Submitting proof"
        );

        let event = match self.dispatcher.execute(&request.proof, request.action).await {
            Ok(event) => event,
            Err(e) => return classify(e),
        };

        let (tx_hash, height) = self
            .execution
            .record_completion(&event, self.relayer, self.dispatcher_contract)
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        info!(
            correlation_id = %request.correlation_id,
            query_id = %short_hex(&event.query_id()),
            tx_hash = %short_hex(&tx_hash),
            height,
            "[devnet] Completion written to execution chain"
        );
        Ok(SubmissionOutcome::Completed(event))
    }
}
