//! # Devnet Adapters
//!
//! Implementations of the relay's outbound ports over in-memory chains.

pub mod gas_oracle;
pub mod oracle;
pub mod sim_chain;
pub mod submitter;
pub mod verifier;

pub use gas_oracle::NoEstimateGasOracle;
pub use oracle::DevnetOracle;
pub use sim_chain::{run_attestor, SimBlock, SimulatedChain};
pub use submitter::{classify, DispatcherSubmitter};
pub use verifier::ContinuityVerifier;
