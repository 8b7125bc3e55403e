//! Genesis block construction and dynasty-0 bootstrap: a height-0 block
//! and a starting committee, with no state trie or validator-stake
//! accounting of its own. The committee is seeded directly at setup rather
//! than loaded from the governance contract, since no contract exists yet
//! at genesis.

use pod_consensus::domain::{
    Address, Block, BlockSignature, ConsensusRoot, SignatureAlgorithm, WorldStateHandle,
};
use std::sync::Arc;

/// World state handle for a single-miner reference node: the next
/// consensus state always advances the same proposer by `elapsed_s`, and
/// account nonces are not tracked (no state trie in this reference node).
struct StaticWorldState {
    proposer: Address,
}

impl WorldStateHandle for StaticWorldState {
    fn next_consensus_state(&self, elapsed_s: u64) -> Result<ConsensusRoot, String> {
        Ok(ConsensusRoot {
            proposer: self.proposer,
            timestamp: elapsed_s,
        })
    }

    fn account_nonce(&self, _addr: &Address) -> u64 {
        0
    }
}

/// Build the height-0 block for a fresh chain. `proposer` becomes both the
/// sole dynasty-0 miner and the genesis block's consensus root.
pub fn build_genesis(proposer: Address) -> Block {
    Block {
        height: 0,
        timestamp: 0,
        hash: shared_crypto::blake3_hash(proposer.as_bytes()),
        parent_hash: [0u8; 32],
        signature: BlockSignature {
            alg: SignatureAlgorithm::Secp256k1,
            bytes: Vec::new(),
        },
        consensus_root: ConsensusRoot {
            proposer,
            timestamp: 0,
        },
        random_seed: None,
        world_state: Some(Arc::new(StaticWorldState { proposer })),
        transactions: Vec::new(),
    }
}
