//! # Inbound Ports
//!
//! API trait defining what the dispatcher can do.

use crate::error::DispatchResult;
use async_trait::async_trait;
use shared_types::{Action, Address, ExecutionEvent, Proof, U256};
use tokio::sync::broadcast;
use xr_01_query_identity::QueryId;
use xr_02_loan_ledger::{LedgerResult, LoanOrder};

/// Dispatcher API - inbound port.
#[async_trait]
pub trait DispatcherApi: Send + Sync {
    /// Verify a proof and apply `action` at most once.
    ///
    /// `None` verifies and records the identity without a domain mutation.
    async fn execute(&self, proof: &Proof, action: Option<Action>)
        -> DispatchResult<ExecutionEvent>;

    /// Whether an identity has been executed.
    fn is_processed(&self, query_id: &QueryId) -> bool;

    /// Snapshot of a loan.
    fn get_loan_order(&self, id: u64) -> LedgerResult<LoanOrder>;

    /// Bridged token balance.
    fn balance_of(&self, account: &Address) -> U256;

    /// Stream of completion events.
    fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent>;

    /// Expire every live loan whose deadline has been reached at the
    /// current execution height. Returns the expired ids.
    fn expire_overdue_loans(&self) -> Vec<u64>;
}
