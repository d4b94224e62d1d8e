//! # Relay Engine
//!
//! The polling loop, per-event handlers and proof jobs.
//!
//! All mutable state lives in [`RelayContext`], shared by the loop and the
//! spawned jobs. Lock order is `in_flight` before `processed`.

use crate::config::RelayConfig;
use crate::domain::{
    AbandonedFact, GasEstimator, ObservedEvent, PendingFact, PollCursor, ProcessedTxCache,
    RelayError, RelayResult, StreamKey, StreamSpec,
};
use crate::ports::{
    ChainReader, GasOracle, ProofOracle, ProofSubmitter, SubmissionOutcome, SubmissionRequest,
};
use futures::future::join_all;
use parking_lot::Mutex;
use relay_telemetry::{
    metric_inc, COMPLETIONS_OBSERVED, CURSOR_HEIGHT, EVENTS_OBSERVED, EVENTS_REJECTED,
    IN_FLIGHT_JOBS, JOB_OUTCOMES, PROOF_LATENCY, PROOF_REQUESTS, RETRY_QUEUE_DEPTH, SCAN_ERRORS,
};
use shared_types::{short_hex, ChainSide, TxHash};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Shared relay state and collaborators.
pub struct RelayContext {
    config: RelayConfig,
    source: Arc<dyn ChainReader>,
    execution: Arc<dyn ChainReader>,
    oracle: Arc<dyn ProofOracle>,
    submitter: Arc<dyn ProofSubmitter>,
    gas: GasEstimator,
    cursors: Mutex<HashMap<StreamKey, PollCursor>>,
    processed: Mutex<ProcessedTxCache>,
    in_flight: Mutex<HashSet<TxHash>>,
    retry_queue: Mutex<VecDeque<PendingFact>>,
    abandoned: Mutex<VecDeque<AbandonedFact>>,
    jobs: Mutex<Vec<JoinHandle<()>>>,
    completions: AtomicU64,
}

impl RelayContext {
    /// Build a context. Fails if the configuration is invalid.
    pub fn new(
        config: RelayConfig,
        source: Arc<dyn ChainReader>,
        execution: Arc<dyn ChainReader>,
        oracle: Arc<dyn ProofOracle>,
        submitter: Arc<dyn ProofSubmitter>,
        gas_oracle: Arc<dyn GasOracle>,
    ) -> RelayResult<Self> {
        config.validate()?;
        let processed = ProcessedTxCache::new(config.cache_capacity);
        Ok(Self {
            config,
            source,
            execution,
            oracle,
            submitter,
            gas: GasEstimator::new(gas_oracle),
            cursors: Mutex::new(HashMap::new()),
            processed: Mutex::new(processed),
            in_flight: Mutex::new(HashSet::new()),
            retry_queue: Mutex::new(VecDeque::new()),
            abandoned: Mutex::new(VecDeque::new()),
            jobs: Mutex::new(Vec::new()),
            completions: AtomicU64::new(0),
        })
    }

    /// Engine configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    fn reader(&self, side: ChainSide) -> &Arc<dyn ChainReader> {
        match side {
            ChainSide::Source => &self.source,
            ChainSide::Execution => &self.execution,
        }
    }

    /// Claim a fact for processing. `false` if it is running or done.
    fn claim(&self, tx_hash: TxHash) -> bool {
        let mut in_flight = self.in_flight.lock();
        if in_flight.contains(&tx_hash) || self.processed.lock().contains(&tx_hash) {
            return false;
        }
        in_flight.insert(tx_hash);
        true
    }

    /// Move a fact from in flight to processed.
    fn finalize(&self, tx_hash: TxHash) {
        let mut in_flight = self.in_flight.lock();
        self.processed.lock().insert(tx_hash);
        in_flight.remove(&tx_hash);
    }

    fn requeue(&self, fact: PendingFact) {
        let mut queue = self.retry_queue.lock();
        queue.push_back(fact);
        RETRY_QUEUE_DEPTH.set(queue.len() as f64);
    }

    fn abandon(&self, fact: &PendingFact, reason: String) {
        error!(
            stream = %fact.stream,
            tx_hash = %short_hex(&fact.tx_hash()),
            attempts = fact.attempts,
            reason = %reason,
            "[xr-04] Abandoning fact, operator attention required"
        );
        {
            let mut abandoned = self.abandoned.lock();
            if abandoned.len() >= self.config.abandoned_capacity {
                abandoned.pop_front();
            }
            abandoned.push_back(AbandonedFact {
                stream: fact.stream,
                tx_hash: fact.tx_hash(),
                attempts: fact.attempts,
                reason,
            });
        }
        metric_inc!(JOB_OUTCOMES, &["abandoned"]);
        self.finalize(fact.tx_hash());
    }

    /// Record the result of one job attempt.
    fn settle(&self, mut fact: PendingFact, result: RelayResult<SubmissionOutcome>) {
        fact.attempts += 1;
        match result {
            Ok(SubmissionOutcome::Completed(event)) => {
                info!(
                    stream = %fact.stream,
                    tx_hash = %short_hex(&fact.tx_hash()),
                    query_id = %short_hex(&event.query_id()),
                    completion = %event.kind(),
                    "[xr-04] Fact relayed"
                );
                metric_inc!(JOB_OUTCOMES, &["completed"]);
                self.finalize(fact.tx_hash());
            }
            Ok(SubmissionOutcome::AlreadyProcessed) => {
                info!(
                    stream = %fact.stream,
                    tx_hash = %short_hex(&fact.tx_hash()),
                    "[xr-04] Fact already executed"
                );
                metric_inc!(JOB_OUTCOMES, &["already_processed"]);
                self.finalize(fact.tx_hash());
            }
            Err(e) if e.is_retryable() && fact.attempts < self.config.max_job_attempts => {
                warn!(
                    stream = %fact.stream,
                    tx_hash = %short_hex(&fact.tx_hash()),
                    attempts = fact.attempts,
                    error = %e,
                    "[xr-04] Job failed, will retry"
                );
                metric_inc!(JOB_OUTCOMES, &["retry"]);
                self.requeue(fact);
            }
            Err(e) => self.abandon(&fact, e.to_string()),
        }
    }
}

/// One proof-and-submit attempt for a fact.
async fn run_job(ctx: &RelayContext, fact: &PendingFact) -> RelayResult<SubmissionOutcome> {
    let correlation_id = Uuid::new_v4();
    debug!(
        %correlation_id,
        tx_hash = %short_hex(&fact.tx_hash()),
        action = %fact.action,
        attempt = fact.attempts + 1,
        "[xr-04] Requesting proof"
    );

    let started = Instant::now();
    let proof = ctx
        .oracle
        .generate_proof(fact.tx_hash(), ctx.config.source_chain_key)
        .await;
    PROOF_LATENCY.observe(started.elapsed().as_secs_f64());
    let proof = match proof {
        Ok(proof) => {
            metric_inc!(PROOF_REQUESTS, &["ok"]);
            proof
        }
        Err(e) => {
            metric_inc!(PROOF_REQUESTS, &[e.label()]);
            return Err(RelayError::Oracle(e));
        }
    };

    let gas_budget = ctx.gas.estimate(&proof, Some(fact.action)).await;
    let outcome = ctx
        .submitter
        .submit(SubmissionRequest {
            correlation_id,
            proof,
            action: Some(fact.action),
            gas_budget,
        })
        .await?;
    Ok(outcome)
}

/// Relay engine.
pub struct RelayEngine {
    ctx: Arc<RelayContext>,
}

impl RelayEngine {
    /// Engine over `ctx`.
    pub fn new(ctx: RelayContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Shared context.
    pub fn context(&self) -> &Arc<RelayContext> {
        &self.ctx
    }

    /// Current cursor of a stream.
    pub fn cursor(&self, stream: &StreamKey) -> Option<PollCursor> {
        self.ctx.cursors.lock().get(stream).copied()
    }

    /// Override a stream cursor.
    pub fn set_cursor(&self, cursor: PollCursor) {
        self.ctx.cursors.lock().insert(cursor.stream, cursor);
    }

    /// Whether a fact reached a final outcome.
    pub fn is_processed(&self, tx_hash: &TxHash) -> bool {
        self.ctx.processed.lock().contains(tx_hash)
    }

    /// Facts currently claimed by a job or the retry queue.
    pub fn in_flight_count(&self) -> usize {
        self.ctx.in_flight.lock().len()
    }

    /// Facts waiting for another attempt.
    pub fn retry_queue_len(&self) -> usize {
        self.ctx.retry_queue.lock().len()
    }

    /// Facts given up on.
    pub fn abandoned(&self) -> Vec<AbandonedFact> {
        self.ctx.abandoned.lock().iter().cloned().collect()
    }

    /// Completion events seen on the execution chain.
    pub fn completions_observed(&self) -> u64 {
        self.ctx.completions.load(Ordering::SeqCst)
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Jobs still running at that point are awaited, never cancelled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            streams = self.ctx.config.streams.len(),
            poll_interval_ms = self.ctx.config.poll_interval.as_millis() as u64,
            "[xr-04] Relay engine started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.ctx.config.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("[xr-04] Shutdown signal received, waiting for in-flight jobs");
        self.drain_jobs().await;

        let pending = self.retry_queue_len();
        if pending > 0 {
            warn!(pending, "[xr-04] Stopping with facts still queued for retry");
        }
        info!("[xr-04] Relay engine stopped");
    }

    /// One cycle: retry queued facts, poll every stream, commit cursors.
    pub async fn run_cycle(&self) {
        self.drain_retry_queue();

        let snapshot: Vec<(StreamSpec, Option<PollCursor>)> = {
            let cursors = self.ctx.cursors.lock();
            self.ctx
                .config
                .streams
                .iter()
                .map(|spec| (spec.clone(), cursors.get(&spec.key).copied()))
                .collect()
        };

        let polls = snapshot.iter().map(|(spec, cursor)| async move {
            let cursor = match cursor {
                Some(cursor) => *cursor,
                None => self.cold_start(spec).await?,
            };
            Some(self.poll_stream(spec, cursor).await)
        });
        let cursors = join_all(polls).await;

        let mut committed = self.ctx.cursors.lock();
        for cursor in cursors.into_iter().flatten() {
            CURSOR_HEIGHT
                .with_label_values(&[&cursor.stream.to_string()])
                .set(cursor.next_height as f64);
            committed.insert(cursor.stream, cursor);
        }
    }

    /// Await every spawned job.
    pub async fn drain_jobs(&self) {
        loop {
            let handles = std::mem::take(&mut *self.ctx.jobs.lock());
            if handles.is_empty() {
                return;
            }
            for result in join_all(handles).await {
                if let Err(e) = result {
                    error!(error = %e, "[xr-04] Relay job panicked");
                }
            }
        }
    }

    /// Poll one stream from `cursor`. Returns the cursor to commit.
    ///
    /// Any read failure leaves the cursor where it was.
    pub async fn poll_stream(&self, spec: &StreamSpec, cursor: PollCursor) -> PollCursor {
        let reader = self.ctx.reader(spec.key.side);

        let current = match reader.current_height().await {
            Ok(height) => height,
            Err(e) => {
                self.scan_failed(spec, e.into()).await;
                return cursor;
            }
        };
        if !cursor.has_work(current) {
            debug!(
                stream = %spec.key,
                cursor = cursor.next_height,
                current,
                "[xr-04] Nothing new"
            );
            return cursor;
        }

        let events = match reader
            .scan_events(&spec.key, cursor.next_height, current)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                self.scan_failed(spec, e.into()).await;
                return cursor;
            }
        };

        debug!(
            stream = %spec.key,
            from = cursor.next_height,
            to = current,
            events = events.len(),
            "[xr-04] Scanned range"
        );
        EVENTS_OBSERVED
            .with_label_values(&[&spec.key.to_string()])
            .inc_by(events.len() as f64);

        for event in events {
            self.handle_event(spec, event);
        }
        cursor.after(current)
    }

    async fn scan_failed(&self, spec: &StreamSpec, error: RelayError) {
        warn!(
            stream = %spec.key,
            error = %error,
            backoff_ms = self.ctx.config.error_backoff.as_millis() as u64,
            "[xr-04] Scan failed, backing off"
        );
        metric_inc!(SCAN_ERRORS, &[&spec.key.to_string()]);
        tokio::time::sleep(self.ctx.config.error_backoff).await;
    }

    /// Initial cursor: the configured start height or the live height.
    async fn cold_start(&self, spec: &StreamSpec) -> Option<PollCursor> {
        if let Some(height) = spec.start_height {
            info!(stream = %spec.key, height, "[xr-04] Cursor from configured start height");
            return Some(PollCursor::new(spec.key, height));
        }
        match self.ctx.reader(spec.key.side).current_height().await {
            Ok(height) => {
                info!(stream = %spec.key, height, "[xr-04] Cursor from live height");
                Some(PollCursor::new(spec.key, height))
            }
            Err(e) => {
                self.scan_failed(spec, e.into()).await;
                None
            }
        }
    }

    fn reject(&self, spec: &StreamSpec, event: &ObservedEvent, reason: &'static str) {
        warn!(
            stream = %spec.key,
            tx_hash = %short_hex(&event.tx_hash),
            emitter = %short_hex(&event.emitter),
            actor = %short_hex(&event.actor),
            reason,
            "[xr-04] Event rejected"
        );
        let stream = spec.key.to_string();
        metric_inc!(EVENTS_REJECTED, &[stream.as_str(), reason]);
    }

    fn handle_event(&self, spec: &StreamSpec, event: ObservedEvent) {
        if event.emitter != spec.key.contract {
            return self.reject(spec, &event, "emitter");
        }
        if let Some(actor) = spec.monitored_actor {
            if event.actor != actor {
                return self.reject(spec, &event, "actor");
            }
        }
        match spec.key.side {
            ChainSide::Source => self.handle_source_fact(spec, event),
            ChainSide::Execution => self.handle_completion(spec, event),
        }
    }

    fn handle_source_fact(&self, spec: &StreamSpec, event: ObservedEvent) {
        let Some(action) = spec.key.event.action() else {
            return self.reject(spec, &event, "no_action");
        };
        if !self.ctx.claim(event.tx_hash) {
            debug!(
                stream = %spec.key,
                tx_hash = %short_hex(&event.tx_hash),
                "[xr-04] Fact already handled"
            );
            return;
        }
        info!(
            stream = %spec.key,
            tx_hash = %short_hex(&event.tx_hash),
            height = event.block_height,
            %action,
            "[xr-04] New source fact"
        );
        self.spawn_job(PendingFact::new(spec.key, event, action));
    }

    fn handle_completion(&self, spec: &StreamSpec, event: ObservedEvent) {
        let Some(query_id) = event.query_id else {
            return self.reject(spec, &event, "missing_query_id");
        };
        info!(
            stream = %spec.key,
            query_id = %short_hex(&query_id),
            tx_hash = %short_hex(&event.tx_hash),
            height = event.block_height,
            "[xr-04] Completion observed"
        );
        metric_inc!(COMPLETIONS_OBSERVED, &[&event.kind.to_string()]);
        self.ctx.completions.fetch_add(1, Ordering::SeqCst);
    }

    fn drain_retry_queue(&self) {
        let pending: Vec<PendingFact> = {
            let mut queue = self.ctx.retry_queue.lock();
            RETRY_QUEUE_DEPTH.set(0.0);
            queue.drain(..).collect()
        };
        for fact in pending {
            debug!(
                tx_hash = %short_hex(&fact.tx_hash()),
                attempts = fact.attempts,
                "[xr-04] Retrying fact"
            );
            self.spawn_job(fact);
        }
    }

    fn spawn_job(&self, fact: PendingFact) {
        let ctx = Arc::clone(&self.ctx);
        IN_FLIGHT_JOBS.inc();
        let handle = tokio::spawn(async move {
            let result = run_job(&ctx, &fact).await;
            ctx.settle(fact, result);
            IN_FLIGHT_JOBS.dec();
        });

        let mut jobs = self.ctx.jobs.lock();
        jobs.retain(|job| !job.is_finished());
        jobs.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OracleError, SubmitError};
    use crate::ports::{MockChainReader, MockGasOracle, MockProofOracle, MockSubmitter};
    use shared_types::{Address, BlockHeight, EventKind, ExecutionEvent};
    use std::time::Duration;

    const BRIDGE: Address = [0xB1; 20];
    const DISPATCHER: Address = [0xD1; 20];
    const ACTOR: Address = [0xAC; 20];

    struct Harness {
        engine: RelayEngine,
        source: Arc<MockChainReader>,
        execution: Arc<MockChainReader>,
        oracle: Arc<MockProofOracle>,
        submitter: Arc<MockSubmitter>,
    }

    fn burn_stream() -> StreamSpec {
        StreamSpec::source(BRIDGE, EventKind::BurnForBridge).with_actor(ACTOR)
    }

    fn completion_stream() -> StreamSpec {
        StreamSpec::execution(DISPATCHER, EventKind::TokensMinted)
    }

    fn harness_with(submitter: MockSubmitter, max_job_attempts: u32) -> Harness {
        harness_with_config(
            submitter,
            RelayConfig {
                max_job_attempts,
                ..RelayConfig::default()
            },
        )
    }

    fn harness_with_config(submitter: MockSubmitter, base: RelayConfig) -> Harness {
        let source = Arc::new(MockChainReader::new(10));
        let execution = Arc::new(MockChainReader::new(10));
        let oracle = Arc::new(MockProofOracle::new());
        let submitter = Arc::new(submitter);
        let config = RelayConfig {
            poll_interval: Duration::from_millis(10),
            error_backoff: Duration::from_millis(1),
            ..base
        }
        .with_stream(burn_stream())
        .with_stream(completion_stream());

        let ctx = RelayContext::new(
            config,
            source.clone(),
            execution.clone(),
            oracle.clone(),
            submitter.clone(),
            Arc::new(MockGasOracle::fixed(100_000)),
        )
        .unwrap();
        Harness {
            engine: RelayEngine::new(ctx),
            source,
            execution,
            oracle,
            submitter,
        }
    }

    fn harness() -> Harness {
        harness_with(MockSubmitter::new(), 3)
    }

    fn burn(tx: u8, height: BlockHeight) -> ObservedEvent {
        ObservedEvent {
            kind: EventKind::BurnForBridge,
            tx_hash: [tx; 32],
            block_height: height,
            log_index: 0,
            emitter: BRIDGE,
            actor: ACTOR,
            query_id: None,
        }
    }

    fn minted(tx: u8, height: BlockHeight, query_id: Option<[u8; 32]>) -> ObservedEvent {
        ObservedEvent {
            kind: EventKind::TokensMinted,
            tx_hash: [tx; 32],
            block_height: height,
            log_index: 0,
            emitter: DISPATCHER,
            actor: [0u8; 20],
            query_id,
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = RelayContext::new(
            RelayConfig::default(),
            Arc::new(MockChainReader::new(0)),
            Arc::new(MockChainReader::new(0)),
            Arc::new(MockProofOracle::new()),
            Arc::new(MockSubmitter::new()),
            Arc::new(MockGasOracle::failing()),
        );
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[tokio::test]
    async fn test_scan_failure_leaves_cursor_unchanged() {
        let h = harness();
        let spec = burn_stream();
        h.source.fail_next_scans(1);

        let cursor = h.engine.poll_stream(&spec, PollCursor::new(spec.key, 5)).await;
        assert_eq!(cursor.next_height, 5);

        let cursor = h.engine.poll_stream(&spec, cursor).await;
        assert_eq!(cursor.next_height, 11);
        assert_eq!(h.source.scans(), vec![(5, 10)]);
    }

    #[tokio::test]
    async fn test_height_failure_leaves_cursor_unchanged() {
        let h = harness();
        let spec = burn_stream();
        h.source.set_height_unavailable(true);

        let cursor = h.engine.poll_stream(&spec, PollCursor::new(spec.key, 5)).await;
        assert_eq!(cursor.next_height, 5);
        assert!(h.source.scans().is_empty());
    }

    #[tokio::test]
    async fn test_chain_behind_cursor_is_noop() {
        let h = harness();
        let spec = burn_stream();

        let cursor = h.engine.poll_stream(&spec, PollCursor::new(spec.key, 20)).await;
        assert_eq!(cursor.next_height, 20);
        assert!(h.source.scans().is_empty());
    }

    #[tokio::test]
    async fn test_cold_start_uses_live_height() {
        let h = harness();
        h.source.push_event(burn(1, 5));
        h.source.push_event(burn(2, 10));

        h.engine.run_cycle().await;
        h.engine.drain_jobs().await;

        let cursor = h.engine.cursor(&burn_stream().key).unwrap();
        assert_eq!(cursor.next_height, 11);
        assert!(!h.engine.is_processed(&[1u8; 32]));
        assert!(h.engine.is_processed(&[2u8; 32]));
        assert_eq!(h.submitter.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_cursors_committed_after_cycle() {
        let h = harness();
        h.engine.run_cycle().await;
        h.source.set_height(15);
        h.execution.set_height(12);
        h.engine.run_cycle().await;

        assert_eq!(h.engine.cursor(&burn_stream().key).unwrap().next_height, 16);
        assert_eq!(h.engine.cursor(&completion_stream().key).unwrap().next_height, 13);
    }

    #[tokio::test]
    async fn test_spoofed_events_skipped() {
        let h = harness();
        let spec = burn_stream();

        let mut foreign_emitter = burn(1, 7);
        foreign_emitter.emitter = [0xEE; 20];
        let mut foreign_actor = burn(2, 7);
        foreign_actor.actor = [0xEE; 20];
        h.source.push_event(foreign_emitter);
        h.source.push_event(foreign_actor);
        h.source.push_event(burn(3, 8));

        h.engine.poll_stream(&spec, PollCursor::new(spec.key, 0)).await;
        h.engine.drain_jobs().await;

        let requests = h.submitter.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].proof.raw_transaction, vec![3u8; 32]);
        assert_eq!(requests[0].gas_budget, 100_000);
    }

    #[tokio::test]
    async fn test_duplicate_fact_handled_once() {
        let h = harness();
        let spec = burn_stream();
        let mut second_log = burn(1, 7);
        second_log.log_index = 1;
        h.source.push_event(burn(1, 7));
        h.source.push_event(second_log);

        h.engine.poll_stream(&spec, PollCursor::new(spec.key, 0)).await;
        h.engine.drain_jobs().await;
        h.engine.poll_stream(&spec, PollCursor::new(spec.key, 0)).await;
        h.engine.drain_jobs().await;

        assert_eq!(h.submitter.requests().len(), 1);
        assert_eq!(h.oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_overlapping_scan_skips_in_flight_fact() {
        let h = harness_with(MockSubmitter::with_delay(Duration::from_millis(50)), 3);
        let spec = burn_stream();
        h.source.push_event(burn(1, 7));

        h.engine.poll_stream(&spec, PollCursor::new(spec.key, 0)).await;
        assert_eq!(h.engine.in_flight_count(), 1);
        h.engine.poll_stream(&spec, PollCursor::new(spec.key, 0)).await;
        h.engine.drain_jobs().await;

        assert_eq!(h.submitter.requests().len(), 1);
        assert_eq!(h.engine.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_retryable_failure_retried_next_cycle() {
        let h = harness();
        h.oracle.fail_next(
            [1u8; 32],
            OracleError::NotYetAttested {
                height: 10,
                attested: Some(8),
            },
        );
        h.source.push_event(burn(1, 10));

        h.engine.run_cycle().await;
        h.engine.drain_jobs().await;
        assert_eq!(h.engine.retry_queue_len(), 1);
        assert!(!h.engine.is_processed(&[1u8; 32]));
        assert_eq!(h.engine.in_flight_count(), 1);

        h.engine.run_cycle().await;
        h.engine.drain_jobs().await;
        assert_eq!(h.engine.retry_queue_len(), 0);
        assert!(h.engine.is_processed(&[1u8; 32]));
        assert_eq!(h.submitter.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_abandoned() {
        let h = harness_with(MockSubmitter::new(), 2);
        h.oracle.fail_next([1u8; 32], OracleError::NotYetMined);
        h.oracle.fail_next([1u8; 32], OracleError::NotYetMined);
        h.source.push_event(burn(1, 10));

        for _ in 0..3 {
            h.engine.run_cycle().await;
            h.engine.drain_jobs().await;
        }

        let abandoned = h.engine.abandoned();
        assert_eq!(abandoned.len(), 1);
        assert_eq!(abandoned[0].attempts, 2);
        assert!(h.engine.is_processed(&[1u8; 32]));
        assert!(h.submitter.requests().is_empty());
        assert_eq!(h.oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_fatal_submission_abandoned_immediately() {
        let h = harness();
        h.submitter
            .push_result(Err(SubmitError::MalformedEvent("no burn event".into())));
        h.source.push_event(burn(1, 10));

        h.engine.run_cycle().await;
        h.engine.drain_jobs().await;

        let abandoned = h.engine.abandoned();
        assert_eq!(abandoned.len(), 1);
        assert_eq!(abandoned[0].attempts, 1);
        assert_eq!(h.engine.retry_queue_len(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_list_keeps_newest() {
        let h = harness_with_config(
            MockSubmitter::new(),
            RelayConfig {
                max_job_attempts: 3,
                abandoned_capacity: 2,
                ..RelayConfig::default()
            },
        );
        for tx in 1..=3u8 {
            h.submitter
                .push_result(Err(SubmitError::MalformedEvent("no burn event".into())));
            let mut event = burn(tx, 10);
            event.log_index = u32::from(tx);
            h.source.push_event(event);
        }

        h.engine.run_cycle().await;
        h.engine.drain_jobs().await;

        let mut kept: Vec<TxHash> = h.engine.abandoned().iter().map(|f| f.tx_hash).collect();
        kept.sort();
        assert_eq!(kept.len(), 2);
        assert!(h.engine.is_processed(&[1u8; 32]));
        assert!(h.engine.is_processed(&[2u8; 32]));
        assert!(h.engine.is_processed(&[3u8; 32]));
    }

    #[tokio::test]
    async fn test_already_processed_is_final() {
        let h = harness();
        h.submitter.push_result(Ok(SubmissionOutcome::AlreadyProcessed));
        h.source.push_event(burn(1, 10));

        h.engine.run_cycle().await;
        h.engine.drain_jobs().await;

        assert!(h.engine.is_processed(&[1u8; 32]));
        assert!(h.engine.abandoned().is_empty());
        assert_eq!(h.engine.retry_queue_len(), 0);
    }

    #[tokio::test]
    async fn test_completions_counted() {
        let h = harness();
        let spec = completion_stream();
        h.execution.push_event(minted(9, 4, Some([7u8; 32])));
        h.execution.push_event(minted(8, 5, None));

        h.engine.poll_stream(&spec, PollCursor::new(spec.key, 0)).await;
        assert_eq!(h.engine.completions_observed(), 1);
        assert!(h.submitter.requests().is_empty());
    }

    #[tokio::test]
    async fn test_run_awaits_in_flight_jobs_on_shutdown() {
        let h = harness_with(MockSubmitter::with_delay(Duration::from_millis(50)), 3);
        h.source.push_event(burn(1, 10));
        let engine = Arc::new(h.engine);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let runner = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.run(shutdown_rx).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown_tx.send(true).unwrap();
        runner.await.unwrap();

        assert_eq!(h.submitter.requests().len(), 1);
        assert!(engine.is_processed(&[1u8; 32]));
        assert_eq!(engine.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_run_exits_when_already_shut_down() {
        let h = harness();
        let (_tx, rx) = watch::channel(true);
        h.engine.run(rx).await;
        assert!(h.source.scans().is_empty());
    }

    #[test]
    fn test_submission_outcome_carries_event() {
        let outcome = SubmissionOutcome::Completed(ExecutionEvent::FactRecorded {
            query_id: [1u8; 32],
        });
        assert_ne!(outcome, SubmissionOutcome::AlreadyProcessed);
    }
}
