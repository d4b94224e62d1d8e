//! # Inbound Ports
//!
//! API trait defining what the loan ledger can do. Heights are execution
//! chain heights supplied by the caller.

use crate::domain::{LedgerResult, LoanOrder, LoanRequest};
use shared_types::{BlockHeight, U256};

/// Loan ledger API - inbound port.
pub trait LoanLedgerApi: Send + Sync {
    /// Register a signed loan, returning its id.
    fn register(&self, request: LoanRequest, current: BlockHeight) -> LedgerResult<u64>;

    /// Move a `Created` loan to `Funded`.
    fn mark_funded(&self, id: u64, current: BlockHeight) -> LedgerResult<()>;

    /// Accumulate funding; returns `true` when the loan became `Funded`.
    fn record_funding(&self, id: u64, amount: U256, current: BlockHeight) -> LedgerResult<bool>;

    /// Record a repayment.
    fn note_repayment(&self, id: u64, amount: U256, current: BlockHeight) -> LedgerResult<()>;

    /// Expire a loan whose deadline has been reached.
    fn mark_expired(&self, id: u64, current: BlockHeight) -> LedgerResult<()>;

    /// Expire every non-terminal loan whose deadline is reached at
    /// `current`. Returns the expired ids in ascending order.
    fn expire_overdue(&self, current: BlockHeight) -> Vec<u64>;

    /// Snapshot of a loan.
    fn get(&self, id: u64) -> LedgerResult<LoanOrder>;
}
