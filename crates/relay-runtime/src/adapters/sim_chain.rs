//! # Simulated Chain
//!
//! In-memory ledger used by the devnet container for both sides of the
//! relay. Every block carries an inclusion tree over its transaction hashes
//! and a digest chained over the block roots:
//!
//! ```text
//! digest(h) = keccak(digest(h - 1) ‖ root(h))      digest(-1) = 0x00…
//! ```
//!
//! An attestation marker records the highest block the oracle may prove.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    keccak256_concat, transaction_hash, Address, BlockHeight, ChainError, ChainKey, ChainSide,
    ExecutionEvent, Hash, Log, Receipt, ReceiptStatus, TransactionBody, TransactionEnvelope,
    TxHash, TxType,
};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};
use xr_01_query_identity::InclusionTree;
use xr_03_action_dispatcher::ExecutionClock;
use xr_04_relay_engine::{ChainReader, ObservedEvent, StreamKey};

/// A sealed block.
#[derive(Debug, Clone)]
pub struct SimBlock {
    /// Block height.
    pub height: BlockHeight,
    /// Raw transactions in block order.
    pub transactions: Vec<Vec<u8>>,
    /// Inclusion tree root over the transaction hashes.
    pub root: Hash,
    /// Digest of the previous block.
    pub parent_digest: Hash,
    /// Chained digest of this block.
    pub digest: Hash,
}

impl SimBlock {
    /// Inclusion tree over this block's transactions.
    pub fn tree(&self) -> InclusionTree {
        InclusionTree::build(self.transactions.iter().map(|raw| transaction_hash(raw)).collect())
    }
}

#[derive(Debug, Default)]
struct ChainState {
    blocks: Vec<SimBlock>,
    pending: Vec<Vec<u8>>,
    attested: Option<BlockHeight>,
}

impl ChainState {
    fn seal(&mut self) -> BlockHeight {
        let height = self.blocks.len() as BlockHeight;
        let parent_digest = self.blocks.last().map(|b| b.digest).unwrap_or([0u8; 32]);
        let transactions = std::mem::take(&mut self.pending);
        let leaves = transactions.iter().map(|raw| transaction_hash(raw)).collect();
        let root = InclusionTree::build(leaves).root();
        let digest = keccak256_concat(&[parent_digest.as_slice(), root.as_slice()]);
        self.blocks.push(SimBlock {
            height,
            transactions,
            root,
            parent_digest,
            digest,
        });
        height
    }
}

/// Simulated chain.
#[derive(Debug)]
pub struct SimulatedChain {
    key: ChainKey,
    side: ChainSide,
    state: RwLock<ChainState>,
}

impl SimulatedChain {
    /// Chain holding only an empty genesis block.
    pub fn new(key: ChainKey, side: ChainSide) -> Self {
        let mut state = ChainState::default();
        state.seal();
        Self {
            key,
            side,
            state: RwLock::new(state),
        }
    }

    /// Chain key.
    pub fn key(&self) -> ChainKey {
        self.key
    }

    /// Which side of the relay this chain plays.
    pub fn side(&self) -> ChainSide {
        self.side
    }

    /// Head height.
    pub fn height(&self) -> BlockHeight {
        self.state.read().blocks.len() as BlockHeight - 1
    }

    /// Queue a raw transaction for the next block.
    pub fn include(&self, raw: Vec<u8>) -> TxHash {
        let tx_hash = transaction_hash(&raw);
        self.state.write().pending.push(raw);
        tx_hash
    }

    /// Seal pending transactions into a new block.
    pub fn mine(&self) -> BlockHeight {
        let height = self.state.write().seal();
        debug!(chain = %self.key, height, "[devnet] Block sealed");
        height
    }

    /// Include a transaction and seal it into its own block.
    pub fn submit(&self, raw: Vec<u8>) -> (TxHash, BlockHeight) {
        let mut state = self.state.write();
        let tx_hash = transaction_hash(&raw);
        state.pending.push(raw);
        (tx_hash, state.seal())
    }

    /// Encode and submit a successful transaction from `from` to `to`
    /// emitting `logs`.
    pub fn submit_call(
        &self,
        from: Address,
        to: Address,
        logs: Vec<Log>,
    ) -> Result<(TxHash, BlockHeight), ChainError> {
        let nonce = {
            let state = self.state.read();
            let mined: usize = state.blocks.iter().map(|b| b.transactions.len()).sum();
            (mined + state.pending.len()) as u64
        };
        let raw = TransactionEnvelope::new(
            TxType::DynamicFee,
            TransactionBody {
                from,
                to,
                nonce,
                input: Vec::new(),
                receipt: Receipt {
                    status: ReceiptStatus::Success,
                    logs,
                },
            },
        )
        .encode()
        .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(self.submit(raw))
    }

    /// Write a completion event emitted by `emitter` into a new block.
    pub fn record_completion(
        &self,
        event: &ExecutionEvent,
        sender: Address,
        emitter: Address,
    ) -> Result<(TxHash, BlockHeight), ChainError> {
        self.submit_call(sender, emitter, vec![event.to_log(emitter)])
    }

    /// Block at `height`.
    pub fn block(&self, height: BlockHeight) -> Option<SimBlock> {
        usize::try_from(height)
            .ok()
            .and_then(|h| self.state.read().blocks.get(h).cloned())
    }

    /// Height and position of a mined transaction.
    pub fn locate(&self, tx_hash: &TxHash) -> Option<(BlockHeight, usize)> {
        self.state.read().blocks.iter().find_map(|block| {
            block
                .transactions
                .iter()
                .position(|raw| transaction_hash(raw) == *tx_hash)
                .map(|index| (block.height, index))
        })
    }

    /// Highest attested block.
    pub fn attested_height(&self) -> Option<BlockHeight> {
        self.state.read().attested
    }

    /// Attest every block up to the current head.
    pub fn attest_head(&self) -> BlockHeight {
        let mut state = self.state.write();
        let head = state.blocks.len() as BlockHeight - 1;
        if state.attested != Some(head) {
            state.attested = Some(head);
            debug!(chain = %self.key, height = head, "[devnet] Attested");
        }
        head
    }

    /// Digest of an attested block. `None` above the attestation marker.
    pub fn attested_digest(&self, height: BlockHeight) -> Option<Hash> {
        let state = self.state.read();
        match state.attested {
            Some(attested) if height <= attested => state
                .blocks
                .get(usize::try_from(height).ok()?)
                .map(|b| b.digest),
            _ => None,
        }
    }
}

/// Attest the head of `chain` every `interval` until shutdown.
pub async fn run_attestor(
    chain: std::sync::Arc<SimulatedChain>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        chain = %chain.key(),
        interval_ms = interval.as_millis() as u64,
        "[devnet] Attestor started"
    );
    loop {
        if *shutdown.borrow() {
            break;
        }
        chain.attest_head();
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    info!(chain = %chain.key(), "[devnet] Attestor stopped");
}

impl ExecutionClock for SimulatedChain {
    fn current_height(&self) -> BlockHeight {
        self.height()
    }
}

#[async_trait]
impl ChainReader for SimulatedChain {
    async fn current_height(&self) -> Result<BlockHeight, ChainError> {
        Ok(self.height())
    }

    async fn scan_events(
        &self,
        stream: &StreamKey,
        from: BlockHeight,
        to: BlockHeight,
    ) -> Result<Vec<ObservedEvent>, ChainError> {
        if stream.side != self.side {
            return Err(ChainError::Rpc(format!(
                "stream {stream} does not belong to the {} chain",
                self.side
            )));
        }
        let state = self.state.read();
        let head = state.blocks.len() as BlockHeight - 1;
        if from > to || to > head {
            return Err(ChainError::RangeUnavailable { from, to });
        }

        let signature = stream.event.signature();
        let mut events = Vec::new();
        for block in &state.blocks[from as usize..=to as usize] {
            let mut log_index = 0u32;
            for raw in &block.transactions {
                let Ok(envelope) = TransactionEnvelope::decode(raw) else {
                    continue;
                };
                if !envelope.succeeded() {
                    continue;
                }
                let tx_hash = transaction_hash(raw);
                for log in &envelope.body.receipt.logs {
                    let index = log_index;
                    log_index += 1;
                    if log.topics.first() != Some(&signature) {
                        continue;
                    }
                    let query_id = match stream.event.side() {
                        ChainSide::Execution => log.topics.get(1).copied(),
                        ChainSide::Source => None,
                    };
                    events.push(ObservedEvent {
                        kind: stream.event,
                        tx_hash,
                        block_height: block.height,
                        log_index: index,
                        emitter: log.address,
                        actor: envelope.body.from,
                        query_id,
                    });
                }
            }
        }
        debug!(
            chain = %self.key,
            stream = %stream,
            from,
            to,
            events = events.len(),
            "[devnet] Scan"
        );
        Ok(events)
    }
}
