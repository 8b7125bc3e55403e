//! Network service adapter ("Network service"). The P2P
//! transport itself is out of scope; this adapter only logs
//! what would be gossiped, as a placeholder seam for a real libp2p/gossip
//! layer.

use async_trait::async_trait;
use pod_consensus::ports::outbound::NetworkGateway;
use shared_types::Hash;

pub struct LoggingNetwork;

#[async_trait]
impl NetworkGateway for LoggingNetwork {
    async fn subscribe_witness(&self) -> Result<(), String> {
        tracing::debug!("subscribed to witness topic");
        Ok(())
    }

    async fn unsubscribe_witness(&self) -> Result<(), String> {
        tracing::debug!("unsubscribed from witness topic");
        Ok(())
    }

    async fn broadcast_witness(&self, reversible_hashes: Vec<Hash>) -> Result<(), String> {
        tracing::debug!(count = reversible_hashes.len(), "witness message broadcast");
        Ok(())
    }
}
