//! # XR-02 Loan Ledger
//!
//! Bounded, multi-state loan lifecycle driven by proven source-chain facts.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (Domain + Ports + Service)
//!
//! ## State Machine
//!
//! ```text
//!   register ──→ Created ──fund──→ Funded ──repay──→ PartlyRepaid ──repay──→ Repaid
//!                   │                 │                    │  ↺ repay
//!                   └─────────────────┴────────────────────┴──(height ≥ deadline)──→ Expired
//! ```
//!
//! `Repaid` and `Expired` are terminal and mutually exclusive.
//!
//! ## Registration
//!
//! A loan is only created when both parties signed the same canonical
//! payload: the lender (`fund_flow.from`) and the borrower (`fund_flow.to`)
//! must both be recovered from their secp256k1 signatures.
//!
//! ## Guards
//!
//! Every operation validates completely before touching state. A failed
//! call leaves the ledger exactly as it was.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    address_of, loan_payload_hash, recover_signer, sign_payload, LedgerError, LedgerResult,
    LoanFlow, LoanOrder, LoanRequest, LoanSignature, LoanStatus, LoanTerms, BASIS_POINTS,
    LOAN_DOMAIN_TAG,
};
pub use ports::LoanLedgerApi;
pub use service::LoanLedger;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
