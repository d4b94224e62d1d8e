//! # Outbound Ports
//!
//! Chain endpoints, the proof oracle, the execution-chain submitter and the
//! gas oracle. Concrete network clients live outside this crate.

use crate::domain::{ObservedEvent, OracleError, StreamKey, SubmitError};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{
    Action, BlockHeight, ChainError, ChainKey, ExecutionEvent, Proof, TxHash,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

/// Read access to one chain.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current head height.
    async fn current_height(&self) -> Result<BlockHeight, ChainError>;

    /// Events of `stream.event` in the inclusive range `[from, to]`, in
    /// emission order.
    async fn scan_events(
        &self,
        stream: &StreamKey,
        from: BlockHeight,
        to: BlockHeight,
    ) -> Result<Vec<ObservedEvent>, ChainError>;
}

/// Attestation-backed proof service.
///
/// Implementations wait (bounded) for the including block to be attested.
#[async_trait]
pub trait ProofOracle: Send + Sync {
    /// Inclusion and continuity proof for a source transaction.
    async fn generate_proof(&self, tx_hash: TxHash, chain_key: ChainKey)
        -> Result<Proof, OracleError>;
}

/// A proof on its way to the execution chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// Correlation id for logs.
    pub correlation_id: Uuid,
    /// Proof to verify.
    pub proof: Proof,
    /// Action to apply.
    pub action: Option<Action>,
    /// Gas budget.
    pub gas_budget: u64,
}

/// Successful submission result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Action applied; carries the completion event.
    Completed(ExecutionEvent),
    /// Identity had already been executed.
    AlreadyProcessed,
}

/// Execution chain submission.
#[async_trait]
pub trait ProofSubmitter: Send + Sync {
    /// Submit a proof to the dispatcher.
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionOutcome, SubmitError>;
}

/// Execution chain gas estimation.
#[async_trait]
pub trait GasOracle: Send + Sync {
    /// Gas needed to execute `proof` with `action`.
    async fn estimate_gas(&self, proof: &Proof, action: Option<Action>) -> Result<u64, ChainError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Debug, Default)]
struct MockChainState {
    height: BlockHeight,
    events: Vec<ObservedEvent>,
    failing_scans: u32,
    height_unavailable: bool,
    scans: Vec<(BlockHeight, BlockHeight)>,
}

/// Mock chain reader.
///
/// Filters by event kind only, so events from foreign emitters reach the
/// engine the way a loose log subscription would deliver them.
#[derive(Debug, Default)]
pub struct MockChainReader {
    state: Mutex<MockChainState>,
}

impl MockChainReader {
    /// Chain at `height` with no events.
    pub fn new(height: BlockHeight) -> Self {
        let reader = Self::default();
        reader.state.lock().height = height;
        reader
    }

    /// Set the head height.
    pub fn set_height(&self, height: BlockHeight) {
        self.state.lock().height = height;
    }

    /// Add an event.
    pub fn push_event(&self, event: ObservedEvent) {
        self.state.lock().events.push(event);
    }

    /// Make the next `count` scans fail.
    pub fn fail_next_scans(&self, count: u32) {
        self.state.lock().failing_scans = count;
    }

    /// Make height queries fail until cleared.
    pub fn set_height_unavailable(&self, unavailable: bool) {
        self.state.lock().height_unavailable = unavailable;
    }

    /// Ranges scanned so far.
    pub fn scans(&self) -> Vec<(BlockHeight, BlockHeight)> {
        self.state.lock().scans.clone()
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn current_height(&self) -> Result<BlockHeight, ChainError> {
        let state = self.state.lock();
        if state.height_unavailable {
            return Err(ChainError::Rpc("Mock height failure".to_string()));
        }
        Ok(state.height)
    }

    async fn scan_events(
        &self,
        stream: &StreamKey,
        from: BlockHeight,
        to: BlockHeight,
    ) -> Result<Vec<ObservedEvent>, ChainError> {
        let mut state = self.state.lock();
        if state.failing_scans > 0 {
            state.failing_scans -= 1;
            return Err(ChainError::RangeUnavailable { from, to });
        }
        state.scans.push((from, to));
        let mut events: Vec<_> = state
            .events
            .iter()
            .filter(|e| e.kind == stream.event && (from..=to).contains(&e.block_height))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.block_height, e.log_index));
        Ok(events)
    }
}

/// Mock proof oracle.
///
/// Proofs carry the transaction hash as their raw bytes. Failures can be
/// scripted per transaction.
#[derive(Debug, Default)]
pub struct MockProofOracle {
    scripted: Mutex<HashMap<TxHash, VecDeque<OracleError>>>,
    calls: AtomicUsize,
}

impl MockProofOracle {
    /// Oracle that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure for the next request about `tx_hash`.
    pub fn fail_next(&self, tx_hash: TxHash, error: OracleError) {
        self.scripted
            .lock()
            .entry(tx_hash)
            .or_default()
            .push_back(error);
    }

    /// Number of requests served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProofOracle for MockProofOracle {
    async fn generate_proof(
        &self,
        tx_hash: TxHash,
        chain_key: ChainKey,
    ) -> Result<Proof, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self
            .scripted
            .lock()
            .get_mut(&tx_hash)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        Ok(Proof {
            chain_key,
            block_height: 1,
            raw_transaction: tx_hash.to_vec(),
            merkle_root: tx_hash,
            sibling_path: vec![],
            continuity_lower_digest: [0u8; 32],
            continuity_roots: vec![[0u8; 32]; 2],
        })
    }
}

/// Mock submitter.
///
/// Results are scripted in call order; once the script runs out every
/// submission completes with `FactRecorded`.
#[derive(Debug, Default)]
pub struct MockSubmitter {
    script: Mutex<VecDeque<Result<SubmissionOutcome, SubmitError>>>,
    requests: Mutex<Vec<SubmissionRequest>>,
    delay: Option<Duration>,
}

impl MockSubmitter {
    /// Submitter that always completes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submitter that takes `delay` per submission.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Queue the result of the next submission.
    pub fn push_result(&self, result: Result<SubmissionOutcome, SubmitError>) {
        self.script.lock().push_back(result);
    }

    /// Submissions received so far.
    pub fn requests(&self) -> Vec<SubmissionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ProofSubmitter for MockSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionOutcome, SubmitError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut query_id = [0u8; 32];
        let len = request.proof.raw_transaction.len().min(32);
        query_id[..len].copy_from_slice(&request.proof.raw_transaction[..len]);
        self.requests.lock().push(request);

        self.script
            .lock()
            .pop_front()
            .unwrap_or(Ok(SubmissionOutcome::Completed(
                ExecutionEvent::FactRecorded { query_id },
            )))
    }
}

/// Mock gas oracle.
#[derive(Debug, Clone)]
pub struct MockGasOracle {
    gas: Option<u64>,
}

impl MockGasOracle {
    /// Oracle returning `gas`.
    pub fn fixed(gas: u64) -> Self {
        Self { gas: Some(gas) }
    }

    /// Oracle that always fails.
    pub fn failing() -> Self {
        Self { gas: None }
    }
}

#[async_trait]
impl GasOracle for MockGasOracle {
    async fn estimate_gas(&self, _proof: &Proof, _action: Option<Action>) -> Result<u64, ChainError> {
        self.gas
            .ok_or_else(|| ChainError::EstimationUnavailable("Mock estimation failure".to_string()))
    }
}
