//! # Value Objects

use super::errors::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockHeight, U256};
use std::fmt;

/// Denominator for interest rates.
pub const BASIS_POINTS: u64 = 10_000;

/// One leg of a loan: who pays whom, in which token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanFlow {
    /// Paying party.
    pub from: Address,
    /// Receiving party.
    pub to: Address,
    /// Token contract.
    pub token: Address,
}

/// Economic terms of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Principal.
    pub loan_amount: U256,
    /// Interest rate in basis points.
    pub interest_rate_bps: u64,
    /// Total the borrower must repay.
    pub expected_repayment_amount: U256,
    /// Height at which the loan expires.
    pub deadline_height: BlockHeight,
}

impl LoanTerms {
    /// Derive terms from a rate and a duration.
    ///
    /// `expected = loan + loan * bps / 10_000`, `deadline = current + duration`.
    pub fn from_rate(
        loan_amount: U256,
        interest_rate_bps: u64,
        duration_blocks: u64,
        current_height: BlockHeight,
    ) -> LedgerResult<Self> {
        let interest = loan_amount
            .checked_mul(U256::from(interest_rate_bps))
            .map(|scaled| scaled / U256::from(BASIS_POINTS))
            .ok_or_else(|| LedgerError::InvalidTerms("interest overflows".into()))?;
        let expected_repayment_amount = loan_amount
            .checked_add(interest)
            .ok_or_else(|| LedgerError::InvalidTerms("repayment overflows".into()))?;
        let deadline_height = current_height
            .checked_add(duration_blocks)
            .ok_or_else(|| LedgerError::InvalidTerms("deadline overflows".into()))?;

        Ok(Self {
            loan_amount,
            interest_rate_bps,
            expected_repayment_amount,
            deadline_height,
        })
    }

    /// Registration-time checks.
    pub fn validate(&self, current_height: BlockHeight) -> LedgerResult<()> {
        if self.loan_amount.is_zero() {
            return Err(LedgerError::InvalidTerms("loan amount is zero".into()));
        }
        if self.deadline_height <= current_height {
            return Err(LedgerError::InvalidTerms(format!(
                "deadline {} is not after current height {}",
                self.deadline_height, current_height
            )));
        }
        if self.expected_repayment_amount < self.loan_amount {
            return Err(LedgerError::InvalidTerms(format!(
                "repayment {} below loan amount {}",
                self.expected_repayment_amount, self.loan_amount
            )));
        }
        Ok(())
    }
}

/// Recoverable secp256k1 signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSignature {
    /// R component.
    pub r: [u8; 32],
    /// S component.
    pub s: [u8; 32],
    /// Recovery id (0, 1, 27 or 28).
    pub v: u8,
}

/// Loan lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// Registered, awaiting funding.
    #[default]
    Created,
    /// Principal delivered to the borrower.
    Funded,
    /// Some repayment received.
    PartlyRepaid,
    /// Repayment target met.
    Repaid,
    /// Deadline passed before full repayment.
    Expired,
}

impl LoanStatus {
    /// `Repaid` and `Expired` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Repaid | LoanStatus::Expired)
    }

    /// Whether repayments may be recorded.
    pub fn accepts_repayment(&self) -> bool {
        matches!(self, LoanStatus::Funded | LoanStatus::PartlyRepaid)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
