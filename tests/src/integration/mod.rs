//! # Integration Tests
//!
//! End-to-end flows over the devnet container: source chain events are
//! relayed through the oracle and verifier into the dispatcher, and the
//! resulting completions are read back from the execution chain.

pub mod fixtures;

mod loan_lifecycle;
mod relay_flows;
