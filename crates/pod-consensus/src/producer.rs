//! Block producer: deadline check, proposer check, block
//! construction, VRF seeding, sealing, signing, push-and-broadcast.

use crate::domain::mining_gate::GateState;
use crate::domain::{check_deadline, next_slot, Block, BlockSignature, SignatureAlgorithm};
use crate::engine::Engine;
use crate::error::ProducerError;
use crate::ports::outbound::{BlockPool, ChainGateway, GovernanceContract, NetworkGateway, TransactionPool};
use crate::ports::outbound::EventBus;
use shared_types::Hash;
use std::time::Duration;

impl<Chain, Pool, Txp, Gov, Net, Ev> Engine<Chain, Pool, Txp, Gov, Net, Ev>
where
    Chain: ChainGateway + 'static,
    Pool: BlockPool + 'static,
    Txp: TransactionPool + 'static,
    Gov: GovernanceContract + 'static,
    Net: NetworkGateway + 'static,
    Ev: EventBus + 'static,
{
    /// Deadline check, proposer check, assemble, seed, seal, sign, wait, broadcast.
    pub async fn mint_block(&self, now_s: u64) -> Result<(), ProducerError> {
        // Step 1: `enabled && !pending`.
        match self.mining_gate.state() {
            GateState::Disabled => return Err(ProducerError::CannotMintWhenDisable),
            GateState::Pending => return Err(ProducerError::CannotMintWhenPending),
            GateState::Active => {}
        }

        let tail = self.chain.tail_block();
        let cfg = &self.config.protocol;

        // Step 2.
        let deadline_ms = check_deadline(tail.timestamp_ms(), now_s * crate::domain::SECOND_MS, cfg)?;

        // Step 3.
        let next = next_slot(now_s * crate::domain::SECOND_MS, cfg);
        let elapsed_s = next.saturating_sub(tail.timestamp_ms()) / crate::domain::SECOND_MS;
        let world_state = tail
            .world_state
            .as_ref()
            .ok_or_else(|| ProducerError::GenerateNextConsensusState("no world state handle on tail".into()))?;
        let cstate = world_state
            .next_consensus_state(elapsed_s)
            .map_err(ProducerError::GenerateNextConsensusState)?;
        if cstate.proposer != self.config.miner {
            return Err(ProducerError::InvalidBlockProposer);
        }

        // Step 4.
        if let Err(e) = self.trigger_state(now_s).await {
            tracing::warn!(error = %e, "trigger_state failed during mint_block");
        }

        // Step 5: assemble, seed, seal, sign.
        let mut block = Block::new(self.chain.chain_id(), self.config.coinbase, &tail);

        if block.height >= self.config.vrf_activation_height {
            let (ancestor_hash, parent_seed) = self
                .chain
                .get_vrf_input(tail.hash, block.height)
                .await
                .map_err(ProducerError::RemoteVrfFailed)?;
            let vrf = self
                .signing
                .generate_random_seed(&self.config.miner, ancestor_hash, parent_seed)
                .await?;
            block.random_seed = Some(vrf);
        }

        block.consensus_root = cstate;
        block.timestamp = cstate.timestamp;
        block.transactions = self.tx_pool.collect_for_block(deadline_ms).await;
        block.seal(self.chain.chain_id());

        let signature_bytes = self.signing.sign_hash(&self.config.miner, block.hash).await?;
        block.signature = BlockSignature {
            alg: SignatureAlgorithm::Secp256k1,
            bytes: signature_bytes,
        };

        // Step 6: wait until the slot boundary.
        let now_ms = now_s * crate::domain::SECOND_MS;
        let wait_ms = next.saturating_sub(now_ms);
        if wait_ms > 0 {
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        }

        // Step 7: broadcast, then verify it actually became the tail.
        let transactions = block.transactions.clone();
        self.block_pool
            .push_and_broadcast(block.clone())
            .await
            .map_err(|_| ProducerError::AppendNewBlockFailed)?;

        if self.chain.tail_block().hash != block.hash {
            self.tx_pool.return_transactions(transactions).await;
            return Err(ProducerError::AppendNewBlockFailed);
        }

        // This node mints and appends its own block directly (the block
        // pool adapter doesn't round-trip it through `verify_block`), so it
        // has to enter the reversible region here instead.
        self.reversible.lock().put(block.hash, ());

        Ok(())
    }

    /// Witness broadcast gating: only when mining is enabled, past
    /// activation, and this node is the tail proposer. Returns the
    /// reversible hashes to broadcast if so; called from `update_lib` on
    /// every tail advance.
    pub(crate) fn witness_broadcast_payload(&self, tail: &Block) -> Option<Vec<Hash>> {
        let is_proposer = self
            .dynasty
            .is_proposer(tail.timestamp, &self.config.miner, &self.config.protocol)
            .unwrap_or(false);
        if !(self.mining_gate.can_mint()
            && tail.height >= self.config.pod_activation_height
            && is_proposer)
        {
            return None;
        }
        // `lru::LruCache::iter` walks most-recently-used first; reversed it
        // approximates, but does not guarantee, strict accumulation order.
        Some(self.reversible.lock().iter().map(|(h, _)| *h).collect())
    }
}
