//! Loan expiry sweep.
//!
//! Loans only expire when something drives them there. The sweeper asks the
//! dispatcher to expire overdue loans at the execution chain's current
//! height once per interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};
use xr_03_action_dispatcher::DispatcherApi;

/// Expire overdue loans every `interval` until shutdown.
pub async fn run_expiry_sweeper(
    dispatcher: Arc<dyn DispatcherApi>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        interval_ms = interval.as_millis() as u64,
        "Loan expiry sweeper started"
    );
    loop {
        if *shutdown.borrow() {
            break;
        }
        let expired = dispatcher.expire_overdue_loans();
        if !expired.is_empty() {
            debug!(loans = ?expired, "Expiry sweep");
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    info!("Loan expiry sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{RelayContainer, RuntimeConfig};
    use k256::ecdsa::SigningKey;
    use shared_types::{ChainKey, U256};
    use xr_02_loan_ledger::{
        address_of, loan_payload_hash, sign_payload, LoanFlow, LoanLedgerApi, LoanRequest,
        LoanStatus, LoanTerms,
    };

    fn register_short_loan(container: &RelayContainer, ledger: ChainKey, blocks: u64) -> u64 {
        let lender = SigningKey::from_slice(&[0x11; 32]).unwrap();
        let borrower = SigningKey::from_slice(&[0x22; 32]).unwrap();
        let fund_flow = LoanFlow {
            from: address_of(lender.verifying_key()),
            to: address_of(borrower.verifying_key()),
            token: [0x70; 20],
        };
        let repay_flow = LoanFlow {
            from: fund_flow.to,
            to: fund_flow.from,
            token: [0x70; 20],
        };
        let current = container.execution.height();
        let terms = LoanTerms::from_rate(U256::from(100u64), 0, blocks, current).unwrap();
        let hash = loan_payload_hash(ledger, &fund_flow, &repay_flow, &terms);
        let request = LoanRequest {
            fund_flow,
            repay_flow,
            terms,
            lender_signature: sign_payload(&lender, &hash).unwrap(),
            borrower_signature: sign_payload(&borrower, &hash).unwrap(),
        };
        container.loans.register(request, current).unwrap()
    }

    #[tokio::test]
    async fn test_sweeper_expires_overdue_loan() {
        let config = RuntimeConfig {
            relayer_key: [0x42; 32],
            ..RuntimeConfig::default()
        };
        let container = RelayContainer::new(&config).unwrap();
        let id = register_short_loan(&container, config.execution_chain_key, 3);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = tokio::spawn(run_expiry_sweeper(
            Arc::clone(&container.dispatcher) as Arc<dyn DispatcherApi>,
            Duration::from_millis(5),
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(container.loans.get(id).unwrap().status, LoanStatus::Created);

        for _ in 0..3 {
            container.execution.mine();
        }
        let expired = tokio::time::timeout(Duration::from_secs(2), async {
            while container.loans.get(id).unwrap().status != LoanStatus::Expired {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(expired.is_ok());

        shutdown_tx.send(true).unwrap();
        sweeper.await.unwrap();
    }
}
