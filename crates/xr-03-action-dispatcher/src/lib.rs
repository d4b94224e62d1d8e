//! # XR-03 Action Dispatcher
//!
//! Turns a verified proof into exactly one domain mutation.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Domain + Ports/Adapters + Service)
//!
//! ## Execution Pipeline
//!
//! ```text
//! execute(proof, action)
//!   1. queryId = identity(proof)
//!   2. guard.contains(queryId)        → AlreadyProcessed
//!   3. verifier.verify(proof)         → VerificationFailed / VerifierUnavailable
//!   4. guard.try_mark(queryId)        → AlreadyProcessed (lost race)
//!   5. decode tracked contract's log  → MalformedEvent
//!   6. mint / fund / repay
//!   7. broadcast completion event
//! ```
//!
//! A failure in steps 5 or 6 releases the mark from step 4, the way a
//! reverted execution-chain transaction would. The domain mutation for a
//! given identity therefore happens at most once.
//!
//! ## Replay Protection
//!
//! `ReplayProtection::Enforced` is the default. `DevBypass` skips steps 2
//! and 4 and must be chosen explicitly; it is logged at construction.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::ManualClock;
pub use domain::{
    decode_event, DecodeError, DecodedEvent, DispatcherConfig, ReplayProtection, SourceContracts,
    TokenError, TokenLedger,
};
pub use error::{DispatchError, DispatchResult};
pub use ports::{DispatcherApi, ExecutionClock, ProofVerifier, VerifierError};
pub use service::ActionDispatcher;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
