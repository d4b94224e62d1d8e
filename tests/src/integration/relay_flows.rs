//! # Relay Flows
//!
//! Burn on the source chain → proof → mint on the execution chain, plus the
//! failure paths around it: unattested blocks, replayed proofs, spoofed
//! emitters and foreign senders.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use relay_runtime::adapters::{classify, DevnetOracle};
    use relay_runtime::{RelayRuntime, RuntimeConfig};
    use shared_types::{address_to_word, EventKind, U256};
    use xr_03_action_dispatcher::{DispatchError, DispatcherApi};
    use xr_04_relay_engine::SubmissionOutcome;

    use crate::integration::fixtures::{devnet_config, Devnet, USER};

    const BENEFICIARY: [u8; 20] = [0xBE; 20];

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[tokio::test]
    async fn test_burn_relayed_to_mint() {
        let devnet = Devnet::start(devnet_config()).await;
        let tx = devnet.burn(BENEFICIARY, 250);

        devnet.relay().await;

        let container = &devnet.container;
        assert_eq!(container.dispatcher.balance_of(&BENEFICIARY), U256::from(250u64));
        assert_eq!(container.dispatcher.total_supply(), U256::from(250u64));
        assert!(container.engine.is_processed(&tx));
        assert!(container.engine.abandoned().is_empty());
    }

    #[tokio::test]
    async fn test_completion_observed_on_execution_chain() {
        let devnet = Devnet::start(devnet_config()).await;
        devnet.burn(BENEFICIARY, 10);
        devnet.relay().await;

        // Next cycle scans the block holding the completion.
        devnet.relay().await;
        assert_eq!(devnet.container.engine.completions_observed(), 1);
    }

    #[tokio::test]
    async fn test_completion_broadcast_to_subscribers() {
        let devnet = Devnet::start(devnet_config()).await;
        let mut completions = devnet.container.dispatcher.subscribe();
        devnet.burn(BENEFICIARY, 10);
        devnet.relay().await;

        let event = completions.try_recv().unwrap();
        assert_eq!(event.kind(), EventKind::TokensMinted);
    }

    // =============================================================================
    // RETRIES
    // =============================================================================

    #[tokio::test]
    async fn test_unattested_fact_retried_until_attested() {
        let devnet = Devnet::start(devnet_config()).await;
        let tx = devnet.burn(BENEFICIARY, 5);

        devnet.relay_unattested().await;
        let engine = &devnet.container.engine;
        assert_eq!(engine.retry_queue_len(), 1);
        assert!(!engine.is_processed(&tx));
        assert_eq!(devnet.container.dispatcher.balance_of(&BENEFICIARY), U256::zero());

        devnet.relay().await;
        assert_eq!(engine.retry_queue_len(), 0);
        assert!(engine.is_processed(&tx));
        assert_eq!(devnet.container.dispatcher.balance_of(&BENEFICIARY), U256::from(5u64));
    }

    #[tokio::test]
    async fn test_never_attested_fact_abandoned() {
        let devnet = Devnet::start(devnet_config()).await;
        let tx = devnet.burn(BENEFICIARY, 5);

        for _ in 0..devnet.config.max_job_attempts {
            devnet.relay_unattested().await;
        }

        let abandoned = devnet.container.engine.abandoned();
        assert_eq!(abandoned.len(), 1);
        assert_eq!(abandoned[0].tx_hash, tx);
        assert_eq!(abandoned[0].attempts, devnet.config.max_job_attempts);
    }

    // =============================================================================
    // EXACTLY ONCE
    // =============================================================================

    #[tokio::test]
    async fn test_replayed_proof_not_applied_twice() {
        let devnet = Devnet::start(devnet_config()).await;
        let tx = devnet.burn(BENEFICIARY, 100);
        devnet.relay().await;

        let container = &devnet.container;
        let proof = DevnetOracle::new(Arc::clone(&container.source), Duration::ZERO)
            .try_build(&tx)
            .unwrap();
        let replay = container
            .dispatcher
            .execute(&proof, Some(shared_types::Action::Mint))
            .await;

        assert!(matches!(replay, Err(DispatchError::AlreadyProcessed(_))));
        assert_eq!(
            classify(replay.unwrap_err()),
            Ok(SubmissionOutcome::AlreadyProcessed)
        );
        assert_eq!(container.dispatcher.balance_of(&BENEFICIARY), U256::from(100u64));
    }

    #[tokio::test]
    async fn test_dev_bypass_allows_replay() {
        let config = RuntimeConfig {
            dev_bypass_replay: true,
            ..devnet_config()
        };
        let devnet = Devnet::start(config).await;
        let tx = devnet.burn(BENEFICIARY, 100);
        devnet.relay().await;

        let container = &devnet.container;
        let proof = DevnetOracle::new(Arc::clone(&container.source), Duration::ZERO)
            .try_build(&tx)
            .unwrap();
        container
            .dispatcher
            .execute(&proof, Some(shared_types::Action::Mint))
            .await
            .unwrap();
        assert_eq!(container.dispatcher.balance_of(&BENEFICIARY), U256::from(200u64));
    }

    #[tokio::test]
    async fn test_two_burns_in_one_block_both_minted() {
        let devnet = Devnet::start(devnet_config()).await;
        let bridge = devnet.config.bridge_contract;
        let log = |amount: u64| shared_types::Log {
            address: bridge,
            topics: vec![
                EventKind::BurnForBridge.signature(),
                address_to_word(&BENEFICIARY),
            ],
            data: shared_types::u256_to_word(U256::from(amount)).to_vec(),
        };
        let source = &devnet.container.source;
        for (nonce, amount) in [(0u64, 3u64), (1, 4)] {
            let raw = shared_types::TransactionEnvelope::new(
                shared_types::TxType::Legacy,
                shared_types::TransactionBody {
                    from: USER,
                    to: bridge,
                    nonce,
                    input: vec![],
                    receipt: shared_types::Receipt {
                        status: shared_types::ReceiptStatus::Success,
                        logs: vec![log(amount)],
                    },
                },
            )
            .encode()
            .unwrap();
            source.include(raw);
        }
        source.mine();

        devnet.relay().await;
        assert_eq!(devnet.container.dispatcher.balance_of(&BENEFICIARY), U256::from(7u64));
    }

    // =============================================================================
    // ORIGIN CHECKS
    // =============================================================================

    #[tokio::test]
    async fn test_burn_from_foreign_contract_ignored() {
        let devnet = Devnet::start(devnet_config()).await;
        let spoof = [0x66; 20];
        devnet.emit(
            USER,
            spoof,
            EventKind::BurnForBridge,
            address_to_word(&BENEFICIARY),
            1_000_000,
        );

        devnet.relay().await;
        assert_eq!(devnet.container.dispatcher.balance_of(&BENEFICIARY), U256::zero());
        assert_eq!(devnet.container.engine.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_monitored_actor_filter() {
        let config = RuntimeConfig {
            monitored_actor: Some(USER),
            ..devnet_config()
        };
        let devnet = Devnet::start(config).await;
        let bridge = devnet.config.bridge_contract;
        devnet.emit(
            [0x99; 20],
            bridge,
            EventKind::BurnForBridge,
            address_to_word(&BENEFICIARY),
            40,
        );
        devnet.burn(BENEFICIARY, 2);

        devnet.relay().await;
        assert_eq!(devnet.container.dispatcher.balance_of(&BENEFICIARY), U256::from(2u64));
    }

    // =============================================================================
    // RUNTIME
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runtime_relays_until_shutdown() {
        let config = RuntimeConfig {
            proof_max_wait: Duration::from_secs(1),
            max_job_attempts: 10,
            ..devnet_config()
        };
        let runtime = RelayRuntime::new(config).unwrap();
        runtime.start();
        let container = runtime.container();

        // Let the engine initialise its cursors before the burn lands.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let log = shared_types::Log {
            address: runtime.config().bridge_contract,
            topics: vec![
                EventKind::BurnForBridge.signature(),
                address_to_word(&BENEFICIARY),
            ],
            data: shared_types::u256_to_word(U256::from(9u64)).to_vec(),
        };
        container
            .source
            .submit_call(USER, runtime.config().bridge_contract, vec![log])
            .unwrap();

        let minted = tokio::time::timeout(Duration::from_secs(5), async {
            while container.dispatcher.balance_of(&BENEFICIARY).is_zero() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        runtime.shutdown().await;

        assert!(minted.is_ok(), "burn was not relayed in time");
        assert_eq!(container.engine.in_flight_count(), 0);
    }
}
