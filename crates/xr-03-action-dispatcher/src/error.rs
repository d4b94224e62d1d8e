//! Error types for the action dispatcher

use crate::domain::{DecodeError, TokenError};
use thiserror::Error;
use xr_01_query_identity::{IdentityError, QueryId};
use xr_02_loan_ledger::LedgerError;

/// Dispatcher errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Identity already executed. Not a failure for the caller.
    #[error("Query {0} already processed")]
    AlreadyProcessed(QueryId),

    /// Verifier rejected the proof.
    #[error("Proof verification failed for query {0}")]
    VerificationFailed(QueryId),

    /// Verifier could not be reached.
    #[error("Proof verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// Proof structure cannot yield an identity.
    #[error("Invalid proof: {0}")]
    InvalidProof(#[from] IdentityError),

    /// Proven transaction does not carry the expected event.
    #[error("Malformed event: {0}")]
    MalformedEvent(#[from] DecodeError),

    /// Loan transition rejected.
    #[error("Loan ledger: {0}")]
    Ledger(#[from] LedgerError),

    /// Mint rejected.
    #[error("Token ledger: {0}")]
    Token(#[from] TokenError),
}

impl DispatchError {
    /// Whether resubmitting the same proof later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::VerificationFailed(_) | DispatchError::VerifierUnavailable(_)
        )
    }
}

/// Result type for dispatcher operations
pub type DispatchResult<T> = Result<T, DispatchError>;
