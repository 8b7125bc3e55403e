//! Event emission adapter ("Event"). Publishes `TopicLibBlock`
//! as a structured log line and a `telemetry` counter; a networked
//! deployment would additionally publish onto a pub/sub event bus for
//! other subsystems to consume.

use async_trait::async_trait;
use pod_consensus::ports::outbound::EventBus;

pub struct TracingEventBus;

#[async_trait]
impl EventBus for TracingEventBus {
    async fn emit_lib_block(&self, lib_str: String) -> Result<(), String> {
        tracing::info!(lib = %lib_str, "TopicLibBlock");
        Ok(())
    }
}
