//! Prometheus metrics for the Proof-of-Devotion consensus engine.
//!
//! All metrics follow the naming convention: `pod_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., blocks_minted_total)
//! - **Gauge**: Value that can go up or down (e.g., mining_gate_state)
//! - **Histogram**: Distribution of values (e.g., mint_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // BLOCK PRODUCTION METRICS
    // =========================================================================

    /// Total blocks successfully minted by this node
    pub static ref BLOCKS_MINTED: Counter = Counter::new(
        "pod_producer_blocks_minted_total",
        "Total number of blocks minted by this node"
    ).expect("metric creation failed");

    /// Mint attempts that failed, labeled by reason
    pub static ref MINT_FAILURES: CounterVec = CounterVec::new(
        Opts::new("pod_producer_mint_failures_total", "Mint attempts that did not produce a block"),
        &["reason"]  // reason: not_proposer/deadline_missed/signing_error/pool_error
    ).expect("metric creation failed");

    /// Time spent assembling and sealing a block
    pub static ref MINT_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "pod_producer_mint_duration_seconds",
            "Time spent minting a block, from proposer check to broadcast"
        ).buckets(exponential_buckets(0.001, 2.0, 15).unwrap())
    ).expect("metric creation failed");

    // =========================================================================
    // FORK CHOICE / FINALITY METRICS
    // =========================================================================

    /// Reorgs applied by fork choice
    pub static ref REORGS_TOTAL: Counter = Counter::new(
        "pod_fork_choice_reorgs_total",
        "Total number of times fork choice selected a chain other than the current tip"
    ).expect("metric creation failed");

    /// Fork choice evaluation duration
    pub static ref FORK_CHOICE_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "pod_fork_choice_duration_seconds",
            "Time spent evaluating candidate tips"
        ).buckets(exponential_buckets(0.0001, 2.0, 12).unwrap())
    ).expect("metric creation failed");

    /// Total blocks finalized via the LIB scan
    pub static ref BLOCKS_FINALIZED: Counter = Counter::new(
        "pod_finality_blocks_finalized_total",
        "Total number of blocks marked as the last irreversible block"
    ).expect("metric creation failed");

    /// Height of the last irreversible block
    pub static ref LIB_HEIGHT: Gauge = Gauge::new(
        "pod_finality_lib_height",
        "Current last irreversible block height"
    ).expect("metric creation failed");

    /// Ticks elapsed since the LIB last advanced
    pub static ref TICKS_WITHOUT_FINALITY: Gauge = Gauge::new(
        "pod_finality_ticks_without_progress",
        "Number of engine ticks since the last irreversible block last advanced"
    ).expect("metric creation failed");

    // =========================================================================
    // EVIL BEHAVIOR / GOVERNANCE METRICS
    // =========================================================================

    /// Double-mint reports raised by the evil detector
    pub static ref DOUBLE_MINT_REPORTS: Counter = Counter::new(
        "pod_evil_detector_double_mint_reports_total",
        "Total double-mint violations detected and reported"
    ).expect("metric creation failed");

    /// Dynasty transitions observed
    pub static ref DYNASTY_TRANSITIONS: Counter = Counter::new(
        "pod_governance_dynasty_transitions_total",
        "Total number of dynasty roll-overs processed"
    ).expect("metric creation failed");

    /// Governance heartbeats sent
    pub static ref GOVERNANCE_HEARTBEATS: Counter = Counter::new(
        "pod_governance_heartbeats_total",
        "Total heartbeat transactions sent to the governance contract"
    ).expect("metric creation failed");

    /// Mining gate state (0=Disabled, 1=Pending, 2=Active)
    pub static ref MINING_GATE_STATE: Gauge = Gauge::new(
        "pod_mining_gate_state",
        "Current mining gate state: 0=disabled, 1=pending, 2=active"
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT BUS METRICS (IPC)
    // =========================================================================

    /// Messages published via the event bus
    pub static ref EVENT_BUS_MESSAGES_SENT: CounterVec = CounterVec::new(
        Opts::new("pod_eventbus_messages_sent_total", "Messages published via the event bus"),
        &["event_type", "source_component"]
    ).expect("metric creation failed");

    /// Messages received via the event bus
    pub static ref EVENT_BUS_MESSAGES_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("pod_eventbus_messages_received_total", "Messages received from the event bus"),
        &["event_type", "target_component"]
    ).expect("metric creation failed");

    /// Event bus delivery latency
    pub static ref EVENT_BUS_LATENCY: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "pod_eventbus_delivery_latency_seconds",
            "Time for event delivery via the bus"
        ).buckets(exponential_buckets(0.0001, 2.0, 12).unwrap())
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Component errors by type
    pub static ref COMPONENT_ERRORS: CounterVec = CounterVec::new(
        Opts::new("pod_component_errors_total", "Errors by component and type"),
        &["component", "error_type"]
    ).expect("metric creation failed");
}

/// Handle for the metrics server
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Block production
        Box::new(BLOCKS_MINTED.clone()),
        Box::new(MINT_FAILURES.clone()),
        Box::new(MINT_DURATION.clone()),
        // Fork choice / finality
        Box::new(REORGS_TOTAL.clone()),
        Box::new(FORK_CHOICE_DURATION.clone()),
        Box::new(BLOCKS_FINALIZED.clone()),
        Box::new(LIB_HEIGHT.clone()),
        Box::new(TICKS_WITHOUT_FINALITY.clone()),
        // Evil behavior / governance
        Box::new(DOUBLE_MINT_REPORTS.clone()),
        Box::new(DYNASTY_TRANSITIONS.clone()),
        Box::new(GOVERNANCE_HEARTBEATS.clone()),
        Box::new(MINING_GATE_STATE.clone()),
        // Event bus
        Box::new(EVENT_BUS_MESSAGES_SENT.clone()),
        Box::new(EVENT_BUS_MESSAGES_RECEIVED.clone()),
        Box::new(EVENT_BUS_LATENCY.clone()),
        // Errors
        Box::new(COMPONENT_ERRORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        let result = register_metrics();
        // May fail if already registered by another test, which is fine
        let _ = result;
    }

    #[test]
    fn test_counter_increment() {
        BLOCKS_MINTED.inc();
        assert!(BLOCKS_MINTED.get() >= 1.0);
    }

    #[test]
    fn test_gauge_set() {
        MINING_GATE_STATE.set(2.0);
        assert_eq!(MINING_GATE_STATE.get(), 2.0);
    }

    #[test]
    fn test_histogram_timer() {
        let _timer = HistogramTimer::new(&MINT_DURATION);
        std::thread::sleep(std::time::Duration::from_millis(1));
        // Timer observes on drop
    }
}
