//! # Loan Ledger Service
//!
//! Owns every `LoanOrder`. Ids are handed out sequentially starting at 1.

use crate::domain::{
    loan_payload_hash, signing::verify_party, LedgerError, LedgerResult, LoanOrder, LoanRequest,
    LoanStatus,
};
use crate::ports::LoanLedgerApi;
use parking_lot::RwLock;
use shared_types::{BlockHeight, ChainKey, U256};
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug)]
struct LedgerState {
    next_id: u64,
    orders: BTreeMap<u64, LoanOrder>,
}

/// In-memory loan ledger.
#[derive(Debug)]
pub struct LoanLedger {
    ledger_key: ChainKey,
    state: RwLock<LedgerState>,
}

impl LoanLedger {
    /// Create an empty ledger bound to `ledger_key`.
    pub fn new(ledger_key: ChainKey) -> Self {
        Self {
            ledger_key,
            state: RwLock::new(LedgerState {
                next_id: 1,
                orders: BTreeMap::new(),
            }),
        }
    }

    /// Key mixed into every signing payload.
    pub fn ledger_key(&self) -> ChainKey {
        self.ledger_key
    }

    /// Number of registered loans.
    pub fn len(&self) -> usize {
        self.state.read().orders.len()
    }

    /// Whether no loan has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of loans in `status`.
    pub fn ids_with_status(&self, status: LoanStatus) -> Vec<u64> {
        self.state
            .read()
            .orders
            .values()
            .filter(|order| order.status == status)
            .map(|order| order.id)
            .collect()
    }

    fn validate_request(&self, request: &LoanRequest, current: BlockHeight) -> LedgerResult<()> {
        request.terms.validate(current)?;

        let fund = &request.fund_flow;
        let repay = &request.repay_flow;
        if repay.from != fund.to || repay.to != fund.from {
            return Err(LedgerError::InvalidTerms(
                "repay flow must run from borrower back to lender".into(),
            ));
        }

        let hash = loan_payload_hash(self.ledger_key, fund, repay, &request.terms);
        verify_party("lender", &hash, &request.lender_signature, &fund.from)?;
        verify_party("borrower", &hash, &request.borrower_signature, &fund.to)?;
        Ok(())
    }

    fn with_order<T>(
        &self,
        id: u64,
        apply: impl FnOnce(&mut LoanOrder) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut state = self.state.write();
        let order = state.orders.get_mut(&id).ok_or(LedgerError::NotFound(id))?;
        apply(order)
    }
}

impl LoanLedgerApi for LoanLedger {
    fn register(&self, request: LoanRequest, current: BlockHeight) -> LedgerResult<u64> {
        if let Err(e) = self.validate_request(&request, current) {
            warn!(error = %e, "[xr-02] Loan registration rejected");
            return Err(e);
        }

        let mut state = self.state.write();
        let id = state.next_id;
        state.next_id += 1;
        state.orders.insert(id, LoanOrder::new(id, request, current));

        info!(loan_id = id, height = current, "[xr-02] Loan registered");
        Ok(id)
    }

    fn mark_funded(&self, id: u64, current: BlockHeight) -> LedgerResult<()> {
        self.with_order(id, |order| order.mark_funded(current))?;
        info!(loan_id = id, height = current, "[xr-02] Loan funded");
        Ok(())
    }

    fn record_funding(&self, id: u64, amount: U256, current: BlockHeight) -> LedgerResult<bool> {
        let completed = self.with_order(id, |order| order.record_funding(amount, current))?;
        if completed {
            info!(loan_id = id, %amount, height = current, "[xr-02] Loan funded");
        } else {
            info!(loan_id = id, %amount, height = current, "[xr-02] Partial funding recorded");
        }
        Ok(completed)
    }

    fn note_repayment(&self, id: u64, amount: U256, current: BlockHeight) -> LedgerResult<()> {
        let status = self.with_order(id, |order| {
            order.note_repayment(amount, current)?;
            Ok(order.status)
        })?;
        info!(loan_id = id, %amount, %status, height = current, "[xr-02] Repayment noted");
        Ok(())
    }

    fn mark_expired(&self, id: u64, current: BlockHeight) -> LedgerResult<()> {
        self.with_order(id, |order| order.mark_expired(current))?;
        info!(loan_id = id, height = current, "[xr-02] Loan expired");
        Ok(())
    }

    fn expire_overdue(&self, current: BlockHeight) -> Vec<u64> {
        let mut state = self.state.write();
        let expired: Vec<u64> = state
            .orders
            .values_mut()
            .filter(|order| !order.status.is_terminal() && order.is_past_deadline(current))
            .filter_map(|order| order.mark_expired(current).ok().map(|()| order.id))
            .collect();
        for id in &expired {
            info!(loan_id = *id, height = current, "[xr-02] Loan expired");
        }
        expired
    }

    fn get(&self, id: u64) -> LedgerResult<LoanOrder> {
        self.state
            .read()
            .orders
            .get(&id)
            .cloned()
            .ok_or(LedgerError::NotFound(id))
    }
}
