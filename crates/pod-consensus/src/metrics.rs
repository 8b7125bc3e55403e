//! Thin recording helpers over `telemetry`'s pre-registered Prometheus
//! metrics: a per-subsystem `metrics.rs` that records against gauges and
//! counters without redefining the metric objects themselves —
//! `telemetry::metrics` already owns them.

use crate::domain::GateState;
use telemetry::{
    HistogramTimer, BLOCKS_FINALIZED, BLOCKS_MINTED, COMPONENT_ERRORS, DOUBLE_MINT_REPORTS,
    DYNASTY_TRANSITIONS, GOVERNANCE_HEARTBEATS, LIB_HEIGHT, MINING_GATE_STATE, MINT_DURATION,
    MINT_FAILURES, REORGS_TOTAL, TICKS_WITHOUT_FINALITY,
};

pub fn record_block_minted() {
    BLOCKS_MINTED.inc();
}

pub fn record_mint_failure(reason: &str) {
    MINT_FAILURES.with_label_values(&[reason]).inc();
}

pub fn time_mint() -> HistogramTimer {
    HistogramTimer::new(&MINT_DURATION)
}

pub fn record_reorg() {
    REORGS_TOTAL.inc();
}

pub fn record_lib_advance(height: u64) {
    BLOCKS_FINALIZED.inc();
    LIB_HEIGHT.set(height as f64);
    TICKS_WITHOUT_FINALITY.set(0.0);
}

pub fn record_tick_without_finality() {
    TICKS_WITHOUT_FINALITY.inc();
}

pub fn record_double_mint_report() {
    DOUBLE_MINT_REPORTS.inc();
}

pub fn record_dynasty_transition() {
    DYNASTY_TRANSITIONS.inc();
}

pub fn record_heartbeat() {
    GOVERNANCE_HEARTBEATS.inc();
}

pub fn record_mining_gate_state(state: GateState) {
    let v = match state {
        GateState::Disabled => 0.0,
        GateState::Pending => 1.0,
        GateState::Active => 2.0,
    };
    MINING_GATE_STATE.set(v);
}

pub fn record_component_error(component: &str, error_type: &str) {
    COMPONENT_ERRORS
        .with_label_values(&[component, error_type])
        .inc();
}
