//! # XR-04 Relay Engine
//!
//! Watches both chains and turns source-chain facts into execution-chain
//! submissions.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (Domain + Ports + Engine)
//!
//! ## Cycle
//!
//! ```text
//! ┌──────────────────────── run_cycle ────────────────────────┐
//! │ drain retry queue → spawn jobs                            │
//! │ join_all(poll_stream(s) for s in streams)                 │
//! │    current < cursor  → cursor unchanged                   │
//! │    scan [cursor, current] → handle events → current + 1   │
//! │    scan error        → backoff, cursor unchanged          │
//! │ commit every cursor together                              │
//! └───────────────────────────────────────────────────────────┘
//!        sleep(poll_interval) or shutdown
//! ```
//!
//! ## Jobs
//!
//! Each accepted source fact runs as its own task:
//! `ProofOracle → GasEstimator → ProofSubmitter`. While a job runs its
//! transaction hash sits in an in-flight set; it enters the processed cache
//! only once the outcome is final. Retryable failures go back on the retry
//! queue until `max_job_attempts`, after which the fact is abandoned and
//! reported.
//!
//! ## Limitations
//!
//! Cursors live in memory. A restarted relay derives new cursors from the
//! live chain height (or a configured start height), so events emitted while
//! it was down are not seen unless a start height is supplied.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod engine;
pub mod ports;

// Re-exports
pub use config::RelayConfig;
pub use domain::{
    AbandonedFact, GasEstimator, ObservedEvent, OracleError, PendingFact, PollCursor,
    ProcessedTxCache, RelayError, RelayResult, StreamKey, StreamSpec, SubmitError,
};
pub use engine::{RelayContext, RelayEngine};
pub use ports::{
    ChainReader, GasOracle, ProofOracle, ProofSubmitter, SubmissionOutcome, SubmissionRequest,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
