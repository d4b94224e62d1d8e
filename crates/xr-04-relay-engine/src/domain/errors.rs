//! # Domain Errors

use shared_types::{BlockHeight, ChainError};
use thiserror::Error;

/// Proof oracle failures. All of them are retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// Transaction not yet included in a block.
    #[error("Transaction not yet mined")]
    NotYetMined,

    /// Including block not yet covered by an attestation.
    #[error("Block {height} not yet attested (attested up to {attested:?})")]
    NotYetAttested {
        /// Including block.
        height: BlockHeight,
        /// Highest attested block, if any.
        attested: Option<BlockHeight>,
    },

    /// Proof service failed.
    #[error("Proof generation failed: {0}")]
    ProofGenerationFailed(String),
}

impl OracleError {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            OracleError::NotYetMined => "not_mined",
            OracleError::NotYetAttested { .. } => "not_attested",
            OracleError::ProofGenerationFailed(_) => "failed",
        }
    }
}

/// Execution chain submission failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Verifier rejected or could not check the proof.
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Submission never reached the dispatcher.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Proven transaction does not carry the expected event.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Dispatcher rejected the action for a domain reason.
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl SubmitError {
    /// Whether the same fact may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmitError::VerificationFailed(_) | SubmitError::Transport(_)
        )
    }
}

/// Relay engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Chain endpoint failure.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Proof oracle failure.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Submission failure.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// Invalid engine configuration.
    #[error("Invalid relay configuration: {0}")]
    Config(String),
}

impl RelayError {
    /// Whether the failed operation is worth repeating.
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::Chain(_) | RelayError::Oracle(_) => true,
            RelayError::Submit(e) => e.is_retryable(),
            RelayError::Config(_) => false,
        }
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
