//! Action Dispatcher Service - proof-gated execution
//!
//! Holds the replay guard, the loan ledger and the token ledger for one
//! execution chain deployment.

use crate::domain::{
    decode_event, DecodedEvent, DispatcherConfig, ReplayProtection, SourceContracts, TokenLedger,
};
use crate::error::{DispatchError, DispatchResult};
use crate::ports::{DispatcherApi, ExecutionClock, ProofVerifier};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{short_hex, Action, Address, ExecutionEvent, Proof, U256};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use xr_01_query_identity::{identity_for_proof, QueryId, ReplayGuard};
use xr_02_loan_ledger::{LedgerResult, LoanLedger, LoanLedgerApi, LoanOrder};

/// Action dispatcher implementation
pub struct ActionDispatcher<V, C>
where
    V: ProofVerifier,
    C: ExecutionClock,
{
    config: DispatcherConfig,
    verifier: Arc<V>,
    clock: Arc<C>,
    replay_guard: Arc<dyn ReplayGuard>,
    loans: Arc<LoanLedger>,
    tokens: Mutex<TokenLedger>,
    events: broadcast::Sender<ExecutionEvent>,
}

impl<V, C> ActionDispatcher<V, C>
where
    V: ProofVerifier,
    C: ExecutionClock,
{
    /// Create a dispatcher.
    pub fn new(
        config: DispatcherConfig,
        verifier: Arc<V>,
        clock: Arc<C>,
        replay_guard: Arc<dyn ReplayGuard>,
        loans: Arc<LoanLedger>,
    ) -> Self {
        if config.replay_protection == ReplayProtection::DevBypass {
            warn!("[xr-03] Replay protection DISABLED - identities may execute more than once");
        }
        let (events, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            config,
            verifier,
            clock,
            replay_guard,
            loans,
            tokens: Mutex::new(TokenLedger::new()),
            events,
        }
    }

    /// Create a dispatcher with replay protection bypassed.
    ///
    /// Development networks only.
    pub fn permissive(
        sources: SourceContracts,
        verifier: Arc<V>,
        clock: Arc<C>,
        replay_guard: Arc<dyn ReplayGuard>,
        loans: Arc<LoanLedger>,
    ) -> Self {
        Self::new(
            DispatcherConfig::dev_bypass(sources),
            verifier,
            clock,
            replay_guard,
            loans,
        )
    }

    /// Active configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Loan ledger driven by this dispatcher.
    pub fn loans(&self) -> &Arc<LoanLedger> {
        &self.loans
    }

    /// Total bridged supply.
    pub fn total_supply(&self) -> U256 {
        self.tokens.lock().total_supply()
    }

    fn enforced(&self) -> bool {
        self.config.replay_protection == ReplayProtection::Enforced
    }

    /// Steps 5 and 6: decode and mutate.
    fn apply(
        &self,
        query_id: QueryId,
        proof: &Proof,
        action: Option<Action>,
    ) -> DispatchResult<ExecutionEvent> {
        let query = query_id.into_bytes();
        let Some(action) = action else {
            return Ok(ExecutionEvent::FactRecorded { query_id: query });
        };

        let emitter = self.config.sources.emitter_for(action);
        let decoded = decode_event(&proof.raw_transaction, action, &emitter)?;
        let height = self.clock.current_height();

        let event = match decoded {
            DecodedEvent::Burn {
                beneficiary,
                amount,
            } => {
                self.tokens.lock().mint(beneficiary, amount)?;
                ExecutionEvent::TokensMinted {
                    query_id: query,
                    beneficiary,
                    amount,
                }
            }
            DecodedEvent::LoanFunded { loan_id, amount } => {
                if self.loans.record_funding(loan_id, amount, height)? {
                    ExecutionEvent::LoanFundingConfirmed {
                        query_id: query,
                        loan_id,
                        amount,
                    }
                } else {
                    // Funding is confirmed once, when the principal is complete.
                    ExecutionEvent::FactRecorded { query_id: query }
                }
            }
            DecodedEvent::LoanRepaid { loan_id, amount } => {
                self.loans.note_repayment(loan_id, amount, height)?;
                ExecutionEvent::LoanRepaymentNoted {
                    query_id: query,
                    loan_id,
                    amount,
                }
            }
        };
        Ok(event)
    }
}

#[async_trait]
impl<V, C> DispatcherApi for ActionDispatcher<V, C>
where
    V: ProofVerifier + 'static,
    C: ExecutionClock + 'static,
{
    async fn execute(
        &self,
        proof: &Proof,
        action: Option<Action>,
    ) -> DispatchResult<ExecutionEvent> {
        // 1. Identity
        let query_id = identity_for_proof(proof)?;
        let enforced = self.enforced();

        // 2. Replay check
        if enforced && self.replay_guard.contains(&query_id) {
            debug!(%query_id, "[xr-03] Query already processed");
            return Err(DispatchError::AlreadyProcessed(query_id));
        }

        // 3. Verification
        match self.verifier.verify(proof).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(%query_id, height = proof.block_height, "[xr-03] Proof rejected by verifier");
                return Err(DispatchError::VerificationFailed(query_id));
            }
            Err(e) => return Err(DispatchError::VerifierUnavailable(e.0)),
        }

        // 4. Mark
        if enforced && !self.replay_guard.try_mark(query_id) {
            debug!(%query_id, "[xr-03] Lost race for query");
            return Err(DispatchError::AlreadyProcessed(query_id));
        }

        // 5 + 6. Decode and apply, reverting the mark on failure
        let event = match self.apply(query_id, proof, action) {
            Ok(event) => event,
            Err(e) => {
                if enforced {
                    self.replay_guard.release(&query_id);
                }
                warn!(%query_id, error = %e, "[xr-03] Execution reverted");
                return Err(e);
            }
        };

        // 7. Broadcast
        info!(
            %query_id,
            event = %event.kind(),
            chain = %proof.chain_key,
            height = proof.block_height,
            "[xr-03] Action executed"
        );
        if self.events.send(event.clone()).is_err() {
            debug!("[xr-03] No completion subscribers");
        }
        Ok(event)
    }

    fn is_processed(&self, query_id: &QueryId) -> bool {
        self.replay_guard.contains(query_id)
    }

    fn get_loan_order(&self, id: u64) -> LedgerResult<LoanOrder> {
        self.loans.get(id)
    }

    fn balance_of(&self, account: &Address) -> U256 {
        let balance = self.tokens.lock().balance_of(account);
        debug!(account = %short_hex(account), %balance, "[xr-03] Balance query");
        balance
    }

    fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.events.subscribe()
    }

    fn expire_overdue_loans(&self) -> Vec<u64> {
        let height = self.clock.current_height();
        let expired = self.loans.expire_overdue(height);
        if !expired.is_empty() {
            info!(count = expired.len(), height, "[xr-03] Overdue loans expired");
        }
        expired
    }
}
