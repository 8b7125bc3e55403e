//! In-memory chain store ("Chain"): tail pointer, hash-keyed block map,
//! detached-candidate staging, no persistence. This reference node keeps
//! the whole chain resident and loses it on restart, which is adequate for
//! exercising the consensus engine but not for production.

use async_trait::async_trait;
use parking_lot::RwLock;
use pod_consensus::domain::{Block, LibRef};
use pod_consensus::ports::outbound::ChainGateway;
use shared_types::Hash;
use std::collections::HashMap;

pub struct InMemoryChain {
    chain_id: u64,
    blocks: RwLock<HashMap<Hash, Block>>,
    tail: RwLock<Block>,
    lib: RwLock<LibRef>,
    detached: RwLock<Vec<Block>>,
}

impl InMemoryChain {
    /// Seed the store with a genesis block. `chain_id` is the network
    /// identifier mixed into every block hash ("seal").
    pub fn new(chain_id: u64, genesis: Block) -> Self {
        let lib = LibRef {
            height: genesis.height,
            hash: genesis.hash,
        };
        let mut blocks = HashMap::new();
        blocks.insert(genesis.hash, genesis.clone());
        Self {
            chain_id,
            blocks: RwLock::new(blocks),
            tail: RwLock::new(genesis),
            lib: RwLock::new(lib),
            detached: RwLock::new(Vec::new()),
        }
    }

    /// Insert `block` without moving the tail, as a detached candidate the
    /// next `fork_choice` pass can pick up. Used by whatever ingests blocks
    /// gossiped from peers (out of scope here, so unused by `main`, but
    /// this is the seam a network adapter would call through).
    pub fn stage_detached(&self, block: Block) {
        self.blocks.write().insert(block.hash, block.clone());
        self.detached.write().push(block);
    }

    /// Record a block this node minted itself, without staging it as a
    /// competing fork candidate.
    pub fn insert_own_block(&self, block: Block) {
        self.blocks.write().insert(block.hash, block);
    }
}

#[async_trait]
impl ChainGateway for InMemoryChain {
    fn tail_block(&self) -> Block {
        self.tail.read().clone()
    }

    fn lib(&self) -> LibRef {
        *self.lib.read()
    }

    fn detached_tail_blocks(&self) -> Vec<Block> {
        std::mem::take(&mut self.detached.write())
    }

    fn set_tail_block(&self, block: Block) {
        *self.tail.write() = block;
    }

    fn get_block(&self, hash: &Hash) -> Option<Block> {
        self.blocks.read().get(hash).cloned()
    }

    async fn store_lib_hash(&self, hash: Hash) -> Result<(), String> {
        tracing::debug!(hash = %hex(&hash), "persisted LIB hash");
        Ok(())
    }

    fn set_lib(&self, lib: LibRef) {
        *self.lib.write() = lib;
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn get_vrf_input(&self, parent_hash: Hash, _height: u64) -> Result<(Hash, [u8; 32]), String> {
        let parent_seed = self
            .blocks
            .read()
            .get(&parent_hash)
            .and_then(|b| b.random_seed.as_ref())
            .map(|vrf| vrf.seed)
            .unwrap_or([0u8; 32]);
        Ok((parent_hash, parent_seed))
    }

    async fn statistical_last_blocks(&self, serial: u64) -> Result<serde_json::Value, String> {
        Ok(serde_json::json!({ "serial": serial, "blocks_seen": self.blocks.read().len() }))
    }
}

fn hex(hash: &Hash) -> String {
    let mut s = String::with_capacity(64);
    for b in hash {
        s.push_str(&format!("{b:02x}"));
    }
    s
}
