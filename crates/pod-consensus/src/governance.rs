//! Governance driver: heartbeat and state-trigger
//! transactions submitted on protocol boundaries.

use crate::domain::{serial, Address, PodAction, PoDPayload, SignatureAlgorithm, Transaction};
use crate::engine::Engine;
use crate::error::GovernanceError;
use crate::metrics;
use crate::ports::outbound::{BlockPool, ChainGateway, EventBus, GovernanceContract, NetworkGateway, TransactionPool};
use std::sync::atomic::Ordering;

/// Well-known recipient of PoD governance transactions. The real deployment
/// address is a chain-specific constant outside this crate's scope: this
/// placeholder is what the bundled mock adapters target in tests.
pub const POD_CONTRACT_ADDRESS: Address = Address::from_bytes([0xFFu8; 20]);

impl<Chain, Pool, Txp, Gov, Net, Ev> Engine<Chain, Pool, Txp, Gov, Net, Ev>
where
    Chain: ChainGateway + 'static,
    Pool: BlockPool + 'static,
    Txp: TransactionPool + 'static,
    Gov: GovernanceContract + 'static,
    Net: NetworkGateway + 'static,
    Ev: EventBus + 'static,
{
    /// `heartbeat(now_s)`.
    pub async fn heartbeat(&self, now_s: u64) -> Result<(), GovernanceError> {
        if !self.mining_gate.can_mint() {
            return Err(GovernanceError::NoHeartbeatWhenDisable);
        }
        if self.chain.tail_block().height < self.config.pod_activation_height {
            return Ok(());
        }

        let now_ms = now_s * crate::domain::SECOND_MS;
        let cfg = &self.config.protocol;
        let first_call = !self.heartbeat_ever_ran.swap(true, Ordering::AcqRel);
        let at_midpoint = (now_ms + cfg.dynasty_interval_ms / 2) % cfg.dynasty_interval_ms == 0;
        if !first_call && !at_midpoint {
            return Ok(());
        }

        let participants = self.dynasty.get_participants();
        if !participants.contains(&self.config.miner) {
            return Err(GovernanceError::MinerNotSignUp);
        }

        self.send_transaction(now_s, PodAction::PoDHeartbeat, Vec::new())
            .await?;
        metrics::record_heartbeat();
        Ok(())
    }

    /// `trigger_state(now_s)`.
    pub async fn trigger_state(&self, now_s: u64) -> Result<(), GovernanceError> {
        if !self.mining_gate.can_mint() {
            return Ok(());
        }
        if self.chain.tail_block().height < self.config.pod_activation_height {
            return Ok(());
        }

        let cfg = &self.config.protocol;
        let s = serial(now_s, cfg);
        if !self.dynasty.contains(s + 1) {
            if self.dynasty.load_from_contract(s, &*self.governance).await.is_ok() {
                metrics::record_dynasty_transition();
            }
        }
        if !self.dynasty.contains(s + 1) {
            let stats = self
                .chain
                .statistical_last_blocks(s)
                .await
                .map_err(GovernanceError::SubmissionFailed)?;
            let data = serde_json::to_vec(&stats).map_err(|e| GovernanceError::SubmissionFailed(e.to_string()))?;
            self.send_transaction(now_s, PodAction::PoDState, data).await?;
        }
        Ok(())
    }

    /// `send_transaction(ts, action, data)`.
    pub async fn send_transaction(
        &self,
        ts: u64,
        action: PodAction,
        data: Vec<u8>,
    ) -> Result<(), GovernanceError> {
        let cfg = &self.config.protocol;
        let payload = PoDPayload::new(serial(ts, cfg), action, data);
        let encoded = payload.encode()?;

        let tail = self.chain.tail_block();
        // Open Question (a), resolved: nonce read from the canonical tail,
        // not the in-flight mempool (see DESIGN.md for the tradeoff).
        let nonce = tail
            .world_state
            .as_ref()
            .map(|ws| ws.account_nonce(&self.config.miner))
            .unwrap_or(0);

        let tx = Transaction {
            to: POD_CONTRACT_ADDRESS,
            value: 0,
            gas_price: u64::MAX,
            gas: u64::MAX,
            timestamp: ts,
            nonce: nonce + 1,
            payload: encoded,
        };
        let hash = tx.hash();
        let signature_bytes = self
            .signing
            .sign_hash(&self.config.miner, hash)
            .await
            .map_err(|e| GovernanceError::SubmissionFailed(e.to_string()))?;
        let signed = crate::domain::SignedTransaction::new(tx, SignatureAlgorithm::Secp256k1, signature_bytes);

        self.tx_pool
            .push_and_broadcast(signed)
            .await
            .map_err(GovernanceError::SubmissionFailed)
    }
}
