//! # Loan Lifecycle Over the Relay
//!
//! A loan registered on the execution chain is funded and repaid on the
//! source chain; each source event reaches the loan ledger only through a
//! verified proof.
//!
//! Scenario: 1000 lent at 500 bps over 1000 blocks (1050 expected back),
//! funded 500 + 500, repaid 1000 then 50.

#[cfg(test)]
mod tests {
    use k256::ecdsa::SigningKey;
    use shared_types::{ChainKey, EventKind, U256};
    use xr_02_loan_ledger::{
        address_of, loan_payload_hash, sign_payload, LoanFlow, LoanLedgerApi, LoanRequest,
        LoanStatus, LoanTerms,
    };
    use xr_03_action_dispatcher::DispatcherApi;

    use crate::integration::fixtures::{devnet_config, loan_subject, Devnet};

    struct Parties {
        lender: SigningKey,
        borrower: SigningKey,
    }

    impl Parties {
        fn new() -> Self {
            Self {
                lender: SigningKey::from_slice(&[0x11; 32]).unwrap(),
                borrower: SigningKey::from_slice(&[0x22; 32]).unwrap(),
            }
        }

        fn lender(&self) -> [u8; 20] {
            address_of(self.lender.verifying_key())
        }

        fn borrower(&self) -> [u8; 20] {
            address_of(self.borrower.verifying_key())
        }

        fn request(&self, ledger: ChainKey, current: u64) -> LoanRequest {
            self.request_for(ledger, current, 1000)
        }

        fn request_for(&self, ledger: ChainKey, current: u64, duration: u64) -> LoanRequest {
            let token = [0x70; 20];
            let fund_flow = LoanFlow {
                from: self.lender(),
                to: self.borrower(),
                token,
            };
            let repay_flow = LoanFlow {
                from: self.borrower(),
                to: self.lender(),
                token,
            };
            let terms =
                LoanTerms::from_rate(U256::from(1000u64), 500, duration, current).unwrap();
            let hash = loan_payload_hash(ledger, &fund_flow, &repay_flow, &terms);
            LoanRequest {
                fund_flow,
                repay_flow,
                terms,
                lender_signature: sign_payload(&self.lender, &hash).unwrap(),
                borrower_signature: sign_payload(&self.borrower, &hash).unwrap(),
            }
        }
    }

    async fn devnet_with_loan() -> (Devnet, Parties, u64) {
        let devnet = Devnet::start(devnet_config()).await;
        let parties = Parties::new();
        let current = devnet.container.execution.height();
        let id = devnet
            .container
            .loans
            .register(
                parties.request(devnet.config.execution_chain_key, current),
                current,
            )
            .unwrap();
        (devnet, parties, id)
    }

    fn status(devnet: &Devnet, id: u64) -> LoanStatus {
        devnet.container.dispatcher.get_loan_order(id).unwrap().status
    }

    #[tokio::test]
    async fn test_loan_funded_and_repaid_through_relay() {
        let (devnet, parties, id) = devnet_with_loan().await;
        let loan_contract = devnet.config.loan_contract;
        let fund = |amount| {
            devnet.emit(
                parties.lender(),
                loan_contract,
                EventKind::LoanFunded,
                loan_subject(id),
                amount,
            )
        };

        let mut completions = devnet.container.dispatcher.subscribe();

        fund(500);
        devnet.relay().await;
        assert_eq!(status(&devnet, id), LoanStatus::Created);
        assert_eq!(
            completions.recv().await.unwrap().kind(),
            EventKind::FactRecorded
        );

        fund(500);
        devnet.relay().await;
        assert_eq!(
            completions.recv().await.unwrap().kind(),
            EventKind::LoanFundingConfirmed
        );
        let order = devnet.container.dispatcher.get_loan_order(id).unwrap();
        assert_eq!(order.status, LoanStatus::Funded);
        assert_eq!(order.funded_amount, U256::from(1000u64));

        let repay = |amount| {
            devnet.emit(
                parties.borrower(),
                loan_contract,
                EventKind::LoanRepaid,
                loan_subject(id),
                amount,
            )
        };

        repay(1000);
        devnet.relay().await;
        let order = devnet.container.dispatcher.get_loan_order(id).unwrap();
        assert_eq!(order.status, LoanStatus::PartlyRepaid);
        assert_eq!(order.repaid_amount, U256::from(1000u64));

        repay(50);
        devnet.relay().await;
        let order = devnet.container.dispatcher.get_loan_order(id).unwrap();
        assert_eq!(order.status, LoanStatus::Repaid);
        assert_eq!(order.outstanding(), U256::zero());
        assert!(devnet.container.engine.abandoned().is_empty());

        // The partial funding record, the confirmation and both repayment
        // notes show up as completions.
        devnet.relay().await;
        assert_eq!(devnet.container.engine.completions_observed(), 4);
    }

    #[tokio::test]
    async fn test_repayment_before_funding_abandoned() {
        let (devnet, parties, id) = devnet_with_loan().await;
        let tx = devnet.emit(
            parties.borrower(),
            devnet.config.loan_contract,
            EventKind::LoanRepaid,
            loan_subject(id),
            100,
        );

        devnet.relay().await;

        let abandoned = devnet.container.engine.abandoned();
        assert_eq!(abandoned.len(), 1);
        assert_eq!(abandoned[0].tx_hash, tx);
        assert_eq!(abandoned[0].attempts, 1);
        assert_eq!(status(&devnet, id), LoanStatus::Created);
    }

    #[tokio::test]
    async fn test_funding_unknown_loan_abandoned() {
        let (devnet, parties, _) = devnet_with_loan().await;
        devnet.emit(
            parties.lender(),
            devnet.config.loan_contract,
            EventKind::LoanFunded,
            loan_subject(99),
            1000,
        );

        devnet.relay().await;
        assert_eq!(devnet.container.engine.abandoned().len(), 1);
    }

    #[tokio::test]
    async fn test_overdue_loan_expires_and_rejects_funding() {
        let devnet = Devnet::start(devnet_config()).await;
        let parties = Parties::new();
        let execution = &devnet.container.execution;
        let current = execution.height();
        let id = devnet
            .container
            .loans
            .register(
                parties.request_for(devnet.config.execution_chain_key, current, 5),
                current,
            )
            .unwrap();

        assert!(devnet.container.dispatcher.expire_overdue_loans().is_empty());
        while execution.height() < current + 5 {
            execution.mine();
        }
        assert_eq!(devnet.container.dispatcher.expire_overdue_loans(), vec![id]);
        assert_eq!(status(&devnet, id), LoanStatus::Expired);

        devnet.emit(
            parties.lender(),
            devnet.config.loan_contract,
            EventKind::LoanFunded,
            loan_subject(id),
            1000,
        );
        devnet.relay().await;
        assert_eq!(devnet.container.engine.abandoned().len(), 1);
        assert_eq!(status(&devnet, id), LoanStatus::Expired);
    }

    #[tokio::test]
    async fn test_runtime_sweeps_overdue_loans() {
        let config = relay_runtime::RuntimeConfig {
            poll_interval: std::time::Duration::from_millis(5),
            ..devnet_config()
        };
        let runtime = relay_runtime::RelayRuntime::new(config).unwrap();
        let container = runtime.container();
        let parties = Parties::new();
        let current = container.execution.height();
        let id = container
            .loans
            .register(
                parties.request_for(runtime.config().execution_chain_key, current, 2),
                current,
            )
            .unwrap();

        runtime.start();
        container.execution.mine();
        container.execution.mine();

        let expired = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while container.dispatcher.get_loan_order(id).unwrap().status != LoanStatus::Expired
            {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await;
        runtime.shutdown().await;
        assert!(expired.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_fact_can_be_proven_again_later() {
        let (devnet, parties, id) = devnet_with_loan().await;
        let repay_tx = devnet.emit(
            parties.borrower(),
            devnet.config.loan_contract,
            EventKind::LoanRepaid,
            loan_subject(id),
            100,
        );
        devnet.relay().await;
        assert_eq!(devnet.container.engine.abandoned().len(), 1);

        // The ledger revert released the identity, so the same repayment
        // can still be applied once the loan is funded.
        let proof = relay_runtime::adapters::DevnetOracle::new(
            std::sync::Arc::clone(&devnet.container.source),
            std::time::Duration::ZERO,
        )
        .try_build(&repay_tx)
        .unwrap();
        let query_id = xr_01_query_identity::identity_for_proof(&proof).unwrap();
        assert!(!devnet.container.dispatcher.is_processed(&query_id));
    }
}
