//! Container construction.

use std::sync::Arc;

use k256::ecdsa::SigningKey;
use shared_types::{short_hex, Address, ChainSide};
use tracing::{info, instrument, warn};
use xr_01_query_identity::InMemoryReplayGuard;
use xr_02_loan_ledger::{address_of, LoanLedger};
use xr_03_action_dispatcher::{
    ActionDispatcher, DispatcherApi, DispatcherConfig, SourceContracts,
};
use xr_04_relay_engine::{RelayContext, RelayEngine};

use crate::adapters::{
    ContinuityVerifier, DevnetOracle, DispatcherSubmitter, NoEstimateGasOracle, SimulatedChain,
};
use crate::container::config::{ConfigError, RuntimeConfig};

/// Dispatcher over the devnet verifier and execution chain clock.
pub type DevnetDispatcher = ActionDispatcher<ContinuityVerifier, SimulatedChain>;

/// Every service the relay runs with.
pub struct RelayContainer {
    /// Source chain.
    pub source: Arc<SimulatedChain>,
    /// Execution chain.
    pub execution: Arc<SimulatedChain>,
    /// Loan ledger on the execution chain.
    pub loans: Arc<LoanLedger>,
    /// Proof-gated dispatcher.
    pub dispatcher: Arc<DevnetDispatcher>,
    /// Relay engine.
    pub engine: Arc<RelayEngine>,
    /// Relayer account derived from the configured key.
    pub relayer: Address,
}

impl RelayContainer {
    /// Build every service from `config`.
    #[instrument(skip_all, name = "container_init")]
    pub fn new(config: &RuntimeConfig) -> Result<Self, ConfigError> {
        let key = SigningKey::from_slice(&config.relayer_key).map_err(|e| ConfigError::Invalid {
            var: "XR_RELAYER_KEY",
            reason: e.to_string(),
        })?;
        let relayer = address_of(key.verifying_key());
        info!(relayer = %short_hex(&relayer), "Relayer account");

        let source = Arc::new(SimulatedChain::new(config.source_chain_key, ChainSide::Source));
        let execution = Arc::new(SimulatedChain::new(
            config.execution_chain_key,
            ChainSide::Execution,
        ));

        let sources = SourceContracts {
            bridge: config.bridge_contract,
            loans: config.loan_contract,
        };
        let dispatcher_config = if config.dev_bypass_replay {
            warn!("XR_DEV_BYPASS_REPLAY set - dispatcher replay protection disabled");
            DispatcherConfig::dev_bypass(sources)
        } else {
            DispatcherConfig::new(sources)
        };
        let loans = Arc::new(LoanLedger::new(config.execution_chain_key));
        let dispatcher = Arc::new(ActionDispatcher::new(
            dispatcher_config,
            Arc::new(ContinuityVerifier::new(Arc::clone(&source))),
            Arc::clone(&execution),
            Arc::new(InMemoryReplayGuard::new()),
            Arc::clone(&loans),
        ));

        let submitter = DispatcherSubmitter::new(
            Arc::clone(&dispatcher) as Arc<dyn DispatcherApi>,
            Arc::clone(&execution),
            relayer,
            config.dispatcher_contract,
        );
        let ctx = RelayContext::new(
            config.relay_config(),
            Arc::clone(&source) as _,
            Arc::clone(&execution) as _,
            Arc::new(DevnetOracle::new(Arc::clone(&source), config.proof_max_wait)),
            Arc::new(submitter),
            Arc::new(NoEstimateGasOracle),
        )
        .map_err(|e| ConfigError::Validation(e.to_string()))?;

        info!(
            streams = ctx.config().streams.len(),
            dev_bypass = config.dev_bypass_replay,
            "Relay container ready"
        );

        Ok(Self {
            source,
            execution,
            loans,
            dispatcher,
            engine: Arc::new(RelayEngine::new(ctx)),
            relayer,
        })
    }
}
