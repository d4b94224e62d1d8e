//! # Domain Errors

use super::value_objects::LoanStatus;
use shared_types::BlockHeight;
use thiserror::Error;

/// Loan ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A party's signature does not recover to the expected address.
    #[error("Invalid {role} signature: {reason}")]
    InvalidSignature {
        /// `lender` or `borrower`.
        role: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// Terms rejected at registration.
    #[error("Invalid loan terms: {0}")]
    InvalidTerms(String),

    /// Operation not allowed from the loan's current status.
    #[error("Loan {id}: cannot {operation} while {status}")]
    InvalidState {
        /// Loan id.
        id: u64,
        /// Current status.
        status: LoanStatus,
        /// Attempted operation.
        operation: &'static str,
    },

    /// Deadline already reached.
    #[error("Loan {id} expired: deadline {deadline}, current height {current}")]
    Expired {
        /// Loan id.
        id: u64,
        /// Deadline height.
        deadline: BlockHeight,
        /// Height at which the call was made.
        current: BlockHeight,
    },

    /// Loan is already `Repaid` or `Expired`.
    #[error("Loan {id} already finalized as {status}")]
    AlreadyFinalized {
        /// Loan id.
        id: u64,
        /// Terminal status.
        status: LoanStatus,
    },

    /// No loan with this id was ever registered.
    #[error("Loan {0} not found")]
    NotFound(u64),

    /// Zero or overflowing amount.
    #[error("Invalid amount for loan {id}: {reason}")]
    InvalidAmount {
        /// Loan id.
        id: u64,
        /// What went wrong.
        reason: &'static str,
    },

    /// Expiry requested before the deadline.
    #[error("Loan {id} deadline {deadline} not reached at height {current}")]
    DeadlineNotReached {
        /// Loan id.
        id: u64,
        /// Deadline height.
        deadline: BlockHeight,
        /// Height at which the call was made.
        current: BlockHeight,
    },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
