//! Devnet harness shared by the integration flows.

use relay_runtime::{RelayContainer, RuntimeConfig};
use shared_types::{
    address_to_word, u256_to_word, Address, EventKind, Hash, Log, TxHash, U256,
};
use std::time::Duration;

/// Account that burns and borrows in the flows.
pub const USER: Address = [0xAC; 20];

/// Configuration with short intervals and no oracle wait.
pub fn devnet_config() -> RuntimeConfig {
    RuntimeConfig {
        relayer_key: [0x42; 32],
        poll_interval: Duration::from_millis(10),
        error_backoff: Duration::from_millis(5),
        proof_max_wait: Duration::ZERO,
        attestation_interval: Duration::from_millis(10),
        max_job_attempts: 3,
        ..RuntimeConfig::default()
    }
}

/// Devnet container driven cycle by cycle.
pub struct Devnet {
    /// Services.
    pub container: RelayContainer,
    /// Configuration the container was built from.
    pub config: RuntimeConfig,
}

impl Devnet {
    /// Build the container and run one cycle so every cursor is initialised.
    pub async fn start(config: RuntimeConfig) -> Self {
        let container = RelayContainer::new(&config).expect("devnet container");
        container.engine.run_cycle().await;
        Self { container, config }
    }

    /// Submit a source transaction from `sender` whose receipt carries one
    /// `event` log emitted by `contract`.
    pub fn emit(
        &self,
        sender: Address,
        contract: Address,
        event: EventKind,
        subject: Hash,
        amount: u64,
    ) -> TxHash {
        let log = Log {
            address: contract,
            topics: vec![event.signature(), subject],
            data: u256_to_word(U256::from(amount)).to_vec(),
        };
        self.container
            .source
            .submit_call(sender, contract, vec![log])
            .expect("source submission")
            .0
    }

    /// Burn `amount` on the bridge for `beneficiary`.
    pub fn burn(&self, beneficiary: Address, amount: u64) -> TxHash {
        self.emit(
            USER,
            self.config.bridge_contract,
            EventKind::BurnForBridge,
            address_to_word(&beneficiary),
            amount,
        )
    }

    /// Attest the source head, run one cycle and wait for its jobs.
    pub async fn relay(&self) {
        self.container.source.attest_head();
        self.container.engine.run_cycle().await;
        self.container.engine.drain_jobs().await;
    }

    /// Run one cycle without attesting anything new.
    pub async fn relay_unattested(&self) {
        self.container.engine.run_cycle().await;
        self.container.engine.drain_jobs().await;
    }
}

/// Subject word for a loan id.
pub fn loan_subject(id: u64) -> Hash {
    u256_to_word(U256::from(id))
}
