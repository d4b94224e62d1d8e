//! # Domain Entities
//!
//! `LoanOrder` is the aggregate root. Each transition method checks every
//! guard first and mutates only when all of them pass.

use super::errors::{LedgerError, LedgerResult};
use super::value_objects::{LoanFlow, LoanSignature, LoanStatus, LoanTerms};
use serde::{Deserialize, Serialize};
use shared_types::{BlockHeight, U256};

/// Parameters for registering a loan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRequest {
    /// Lender → borrower leg.
    pub fund_flow: LoanFlow,
    /// Borrower → lender leg.
    pub repay_flow: LoanFlow,
    /// Economic terms.
    pub terms: LoanTerms,
    /// Lender's signature over the loan payload.
    pub lender_signature: LoanSignature,
    /// Borrower's signature over the loan payload.
    pub borrower_signature: LoanSignature,
}

/// A registered loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOrder {
    /// Sequential id, starting at 1.
    pub id: u64,
    /// Lender → borrower leg.
    pub fund_flow: LoanFlow,
    /// Borrower → lender leg.
    pub repay_flow: LoanFlow,
    /// Economic terms.
    pub terms: LoanTerms,
    /// Lender's signature.
    pub lender_signature: LoanSignature,
    /// Borrower's signature.
    pub borrower_signature: LoanSignature,
    /// Execution height at registration.
    pub created_at_height: BlockHeight,
    /// Lifecycle status.
    pub status: LoanStatus,
    /// Cumulative funding observed while `Created`.
    pub funded_amount: U256,
    /// Cumulative repayment.
    pub repaid_amount: U256,
}

impl LoanOrder {
    /// Create a loan in `Created` status.
    pub fn new(id: u64, request: LoanRequest, created_at_height: BlockHeight) -> Self {
        Self {
            id,
            fund_flow: request.fund_flow,
            repay_flow: request.repay_flow,
            terms: request.terms,
            lender_signature: request.lender_signature,
            borrower_signature: request.borrower_signature,
            created_at_height,
            status: LoanStatus::Created,
            funded_amount: U256::zero(),
            repaid_amount: U256::zero(),
        }
    }

    /// Whether the deadline has been reached at `current`.
    pub fn is_past_deadline(&self, current: BlockHeight) -> bool {
        current >= self.terms.deadline_height
    }

    /// Amount still owed.
    pub fn outstanding(&self) -> U256 {
        self.terms
            .expected_repayment_amount
            .saturating_sub(self.repaid_amount)
    }

    /// Move straight to `Funded`.
    pub fn mark_funded(&mut self, current: BlockHeight) -> LedgerResult<()> {
        self.ensure_status(LoanStatus::Created, "fund")?;
        self.ensure_before_deadline(current)?;

        self.funded_amount = self.funded_amount.max(self.terms.loan_amount);
        self.status = LoanStatus::Funded;
        Ok(())
    }

    /// Accumulate funding; returns `true` on the call that completes it.
    pub fn record_funding(&mut self, amount: U256, current: BlockHeight) -> LedgerResult<bool> {
        self.ensure_nonzero(amount)?;
        self.ensure_status(LoanStatus::Created, "fund")?;
        self.ensure_before_deadline(current)?;
        let funded = self
            .funded_amount
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount {
                id: self.id,
                reason: "funding overflows",
            })?;

        self.funded_amount = funded;
        if funded >= self.terms.loan_amount {
            self.status = LoanStatus::Funded;
            return Ok(true);
        }
        Ok(false)
    }

    /// Record a repayment and move to `PartlyRepaid` or `Repaid`.
    pub fn note_repayment(&mut self, amount: U256, current: BlockHeight) -> LedgerResult<()> {
        self.ensure_nonzero(amount)?;
        if !self.status.accepts_repayment() {
            return Err(LedgerError::InvalidState {
                id: self.id,
                status: self.status,
                operation: "repay",
            });
        }
        self.ensure_before_deadline(current)?;
        let repaid = self
            .repaid_amount
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount {
                id: self.id,
                reason: "repayment overflows",
            })?;

        self.repaid_amount = repaid;
        self.status = if repaid >= self.terms.expected_repayment_amount {
            LoanStatus::Repaid
        } else {
            LoanStatus::PartlyRepaid
        };
        Ok(())
    }

    /// Expire a non-terminal loan whose deadline has been reached.
    pub fn mark_expired(&mut self, current: BlockHeight) -> LedgerResult<()> {
        if self.status.is_terminal() {
            return Err(LedgerError::AlreadyFinalized {
                id: self.id,
                status: self.status,
            });
        }
        if !self.is_past_deadline(current) {
            return Err(LedgerError::DeadlineNotReached {
                id: self.id,
                deadline: self.terms.deadline_height,
                current,
            });
        }

        self.status = LoanStatus::Expired;
        Ok(())
    }

    fn ensure_status(&self, expected: LoanStatus, operation: &'static str) -> LedgerResult<()> {
        if self.status != expected {
            return Err(LedgerError::InvalidState {
                id: self.id,
                status: self.status,
                operation,
            });
        }
        Ok(())
    }

    fn ensure_before_deadline(&self, current: BlockHeight) -> LedgerResult<()> {
        if self.is_past_deadline(current) {
            return Err(LedgerError::Expired {
                id: self.id,
                deadline: self.terms.deadline_height,
                current,
            });
        }
        Ok(())
    }

    fn ensure_nonzero(&self, amount: U256) -> LedgerResult<()> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount {
                id: self.id,
                reason: "amount is zero",
            });
        }
        Ok(())
    }
}
