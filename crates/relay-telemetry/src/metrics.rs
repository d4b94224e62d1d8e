//! Prometheus metrics for the relay.
//!
//! All metrics follow the naming convention: `xr_<component>_<metric>_<unit>`
//!
//! Stream labels use the `side:contract:event` key rendering.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, GaugeVec, Histogram, HistogramOpts,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // POLLING
    // =========================================================================

    /// Events returned by stream scans
    pub static ref EVENTS_OBSERVED: CounterVec = CounterVec::new(
        Opts::new("xr_relay_events_observed_total", "Events returned by stream scans"),
        &["stream"]
    ).expect("metric creation failed");

    /// Events dropped by origin validation
    pub static ref EVENTS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("xr_relay_events_rejected_total", "Events dropped by origin validation"),
        &["stream", "reason"]  // reason: emitter/actor/missing_query_id
    ).expect("metric creation failed");

    /// Failed scans (cursor left in place)
    pub static ref SCAN_ERRORS: CounterVec = CounterVec::new(
        Opts::new("xr_relay_scan_errors_total", "Scan failures; the cursor is not advanced"),
        &["stream"]
    ).expect("metric creation failed");

    /// Next height to scan per stream
    pub static ref CURSOR_HEIGHT: GaugeVec = GaugeVec::new(
        Opts::new("xr_relay_cursor_height", "Next block height to scan"),
        &["stream"]
    ).expect("metric creation failed");

    // =========================================================================
    // JOBS
    // =========================================================================

    /// Job outcomes
    pub static ref JOB_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new("xr_relay_job_outcomes_total", "Relay job outcomes"),
        &["outcome"]  // outcome: completed/already_processed/retry/abandoned
    ).expect("metric creation failed");

    /// Jobs currently running
    pub static ref IN_FLIGHT_JOBS: Gauge = Gauge::new(
        "xr_relay_jobs_in_flight",
        "Relay jobs currently running"
    ).expect("metric creation failed");

    /// Facts waiting for another attempt
    pub static ref RETRY_QUEUE_DEPTH: Gauge = Gauge::new(
        "xr_relay_retry_queue_depth",
        "Facts waiting for another attempt"
    ).expect("metric creation failed");

    // =========================================================================
    // PROOFS AND SUBMISSION
    // =========================================================================

    /// Proof oracle requests by result
    pub static ref PROOF_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("xr_oracle_proof_requests_total", "Proof requests by result"),
        &["result"]  // result: ok/not_mined/not_attested/failed
    ).expect("metric creation failed");

    /// Proof generation latency
    pub static ref PROOF_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "xr_oracle_proof_latency_seconds",
            "Time spent waiting for a proof"
        ).buckets(exponential_buckets(0.01, 2.0, 16).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Gas estimates that used the size-based fallback
    pub static ref GAS_FALLBACKS: Counter = Counter::new(
        "xr_gas_fallback_estimates_total",
        "Gas estimates computed from the continuity proof size"
    ).expect("metric creation failed");

    /// Completion events seen on the execution chain
    pub static ref COMPLETIONS_OBSERVED: CounterVec = CounterVec::new(
        Opts::new("xr_relay_completions_total", "Completion events observed"),
        &["event"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Polling
        Box::new(EVENTS_OBSERVED.clone()),
        Box::new(EVENTS_REJECTED.clone()),
        Box::new(SCAN_ERRORS.clone()),
        Box::new(CURSOR_HEIGHT.clone()),
        // Jobs
        Box::new(JOB_OUTCOMES.clone()),
        Box::new(IN_FLIGHT_JOBS.clone()),
        Box::new(RETRY_QUEUE_DEPTH.clone()),
        // Proofs
        Box::new(PROOF_REQUESTS.clone()),
        Box::new(PROOF_LATENCY.clone()),
        Box::new(GAS_FALLBACKS.clone()),
        Box::new(COMPLETIONS_OBSERVED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
