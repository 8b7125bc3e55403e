//! Driven ports (outbound capabilities the chain must supply).
//!
//! `async_trait`, `Send + Sync`, `Result<_, String>` for cross-process
//! failures a concrete adapter can render in whatever form its transport
//! needs.
//!
//! No `tonic`/gRPC stub is introduced here: this workspace has no gRPC
//! crate anywhere in its dependency graph, so `RemoteSignClient` is
//! expressed the same way every other outbound capability is — a plain
//! async-trait port an adapter can back with whatever RPC client it likes.

use crate::domain::{Address, Block, Report, SignedTransaction, Transaction, VrfOutput};
use async_trait::async_trait;
use shared_types::Hash;

/// The underlying chain store: block/tx persistence, tail pointer, parent
/// lookup.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    fn tail_block(&self) -> Block;
    fn lib(&self) -> crate::domain::LibRef;
    fn detached_tail_blocks(&self) -> Vec<Block>;
    fn set_tail_block(&self, block: Block);
    fn get_block(&self, hash: &Hash) -> Option<Block>;
    async fn store_lib_hash(&self, hash: Hash) -> Result<(), String>;
    fn set_lib(&self, lib: crate::domain::LibRef);
    fn chain_id(&self) -> u64;
    /// `get_vrf_input(parent_hash, height) -> (ancestor_hash, parent_seed)`.
    async fn get_vrf_input(&self, parent_hash: Hash, height: u64) -> Result<(Hash, [u8; 32]), String>;
    /// Per-proposer statistics for dynasty `serial`, for `PoDState` payloads.
    async fn statistical_last_blocks(&self, serial: u64) -> Result<serde_json::Value, String>;
}

/// The block pool: validates and broadcasts newly minted blocks.
#[async_trait]
pub trait BlockPool: Send + Sync {
    async fn push_and_broadcast(&self, block: Block) -> Result<(), String>;
}

/// The transaction pool: supplies candidate transactions for block building
/// and absorbs transactions orphaned by a failed append.
#[async_trait]
pub trait TransactionPool: Send + Sync {
    async fn push_and_broadcast(&self, tx: SignedTransaction) -> Result<(), String>;
    async fn collect_for_block(&self, deadline_ms: u64) -> Vec<SignedTransaction>;
    async fn return_transactions(&self, txs: Vec<SignedTransaction>);
}

/// Key storage and local signing ("Account manager").
#[async_trait]
pub trait AccountManager: Send + Sync {
    async fn unlock(&self, addr: &Address, passphrase: &str, ttl_s: u64) -> Result<(), String>;
    async fn lock(&self, addr: &Address) -> Result<(), String>;
    async fn sign_block(&self, addr: &Address, hash: &Hash) -> Result<Vec<u8>, String>;
    async fn sign_transaction(&self, addr: &Address, tx: &Transaction) -> Result<Vec<u8>, String>;
    async fn generate_random_seed(
        &self,
        addr: &Address,
        ancestor_hash: Hash,
        parent_seed: [u8; 32],
    ) -> Result<VrfOutput, String>;
}

/// Peer-to-peer network service ("Network service").
#[async_trait]
pub trait NetworkGateway: Send + Sync {
    async fn subscribe_witness(&self) -> Result<(), String>;
    async fn unsubscribe_witness(&self) -> Result<(), String>;
    async fn broadcast_witness(&self, reversible_hashes: Vec<Hash>) -> Result<(), String>;
}

/// Optional remote signing service ("Remote sign RPC").
#[async_trait]
pub trait RemoteSignClient: Send + Sync {
    async fn sign_hash(
        &self,
        addr: &Address,
        hash: Hash,
        alg: crate::domain::SignatureAlgorithm,
    ) -> Result<Vec<u8>, String>;
    async fn generate_random_seed(
        &self,
        addr: &Address,
        parent_seed: [u8; 32],
        ancestor_hash: Hash,
    ) -> Result<VrfOutput, String>;
}

/// The PoD governance contract: dynasty committees and evil-behavior
/// reporting. Heartbeat and state-trigger transactions are regular PoD
/// transactions, routed through `TransactionPool` like any other.
#[async_trait]
pub trait GovernanceContract: Send + Sync {
    /// Load the ordered miner list for `serial`.
    async fn dynasty_trie_at(&self, serial: u64) -> Result<Vec<Address>, String>;
    async fn submit_report(&self, report: Report) -> Result<(), String>;
}

/// Outbound event emission: a publish-and-forget port, no subscriber
/// fan-out or delivery guarantee beyond best-effort.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish `TopicLibBlock` with the new LIB's string form.
    async fn emit_lib_block(&self, lib_str: String) -> Result<(), String>;
}
