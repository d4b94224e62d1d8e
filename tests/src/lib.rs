//! # Cross-Chain Relay Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # Devnet harness
//!     ├── relay_flows.rs     # Burn → mint, retries, replay, origin checks
//!     └── loan_lifecycle.rs  # Loan funding and repayment over the relay
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p xr-tests
//! cargo test -p xr-tests integration::loan_lifecycle::
//! ```

#![allow(dead_code)]

pub mod integration;
