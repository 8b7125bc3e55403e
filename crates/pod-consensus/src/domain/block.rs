//! The external `Block` type.
//!
//! The chain store owns block persistence; this crate only needs enough of
//! the block's shape to drive consensus decisions.

use crate::domain::transaction::SignedTransaction;
use crate::domain::Address;
use shared_types::Hash;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Signature algorithm tag carried alongside a block or transaction signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Secp256k1,
    Ed25519,
}

/// A signature plus the algorithm used to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSignature {
    pub alg: SignatureAlgorithm,
    pub bytes: Vec<u8>,
}

/// The proposer identity and timestamp a block's consensus state commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusRoot {
    pub proposer: Address,
    pub timestamp: u64,
}

/// Verifiable randomness attached to a block past the VRF activation height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VrfOutput {
    pub seed: [u8; 32],
    pub proof: Vec<u8>,
}

/// Per-block view of world state the producer/verifier needs: the next
/// consensus state for a candidate slot, and account nonces for
/// transaction construction. Supplied by the (out-of-scope) state trie.
pub trait WorldStateHandle: Send + Sync {
    /// Compute the consensus state (proposer, timestamp) `elapsed_s` seconds
    /// after this state's block, per step 3.
    fn next_consensus_state(&self, elapsed_s: u64) -> Result<ConsensusRoot, String>;

    /// The account nonce to use for the next transaction from `addr`.
    fn account_nonce(&self, addr: &Address) -> u64;
}

/// A block as consumed by the consensus engine. Immutable once sealed.
#[derive(Clone)]
pub struct Block {
    pub height: u64,
    /// Seconds since epoch.
    pub timestamp: u64,
    pub hash: Hash,
    pub parent_hash: Hash,
    pub signature: BlockSignature,
    pub consensus_root: ConsensusRoot,
    pub random_seed: Option<VrfOutput>,
    /// Populated by the chain for blocks used in production/verification;
    /// `None` is only valid for test fixtures that don't exercise those paths.
    pub world_state: Option<Arc<dyn WorldStateHandle>>,
    /// Candidate transactions collected for this block;
    /// opaque to consensus beyond counting and hashing.
    pub transactions: Vec<SignedTransaction>,
}

impl Block {
    /// `timestamp` expressed in milliseconds.
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp * 1000
    }

    /// Whether this block carries a VRF seed and proof.
    pub fn has_random_seed(&self) -> bool {
        self.random_seed.is_some()
    }

    /// `create with (chain_id, coinbase, tail)`: a new,
    /// unsealed block extending `tail`, inheriting its world-state handle.
    pub fn new(_chain_id: u64, coinbase: Address, tail: &Block) -> Self {
        Self {
            height: tail.height + 1,
            timestamp: 0,
            hash: [0u8; 32],
            parent_hash: tail.hash,
            signature: BlockSignature {
                alg: SignatureAlgorithm::Secp256k1,
                bytes: Vec::new(),
            },
            consensus_root: ConsensusRoot {
                proposer: coinbase,
                timestamp: 0,
            },
            random_seed: None,
            world_state: tail.world_state.clone(),
            transactions: Vec::new(),
        }
    }

    /// Seal the block: compute and store its content hash (block assembly step
    /// 5, "seal the block (computes hash and state root)"). State-root
    /// computation is owned by the out-of-scope state trie; only the hash is
    /// this crate's concern.
    pub fn seal(&mut self, chain_id: u64) {
        self.hash = self.compute_hash(chain_id);
    }

    fn compute_hash(&self, chain_id: u64) -> Hash {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(&chain_id.to_be_bytes());
        buf.extend_from_slice(&self.height.to_be_bytes());
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&self.parent_hash);
        buf.extend_from_slice(self.consensus_root.proposer.as_bytes());
        buf.extend_from_slice(&self.consensus_root.timestamp.to_be_bytes());
        if let Some(seed) = &self.random_seed {
            buf.extend_from_slice(&seed.seed);
        }
        for tx in &self.transactions {
            buf.extend_from_slice(&tx.hash);
        }
        shared_crypto::blake3_hash(&buf)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("height", &self.height)
            .field("timestamp", &self.timestamp)
            .field("hash", &hex_prefix(&self.hash))
            .field("parent_hash", &hex_prefix(&self.parent_hash))
            .field("consensus_root", &self.consensus_root)
            .finish()
    }
}

fn hex_prefix(h: &Hash) -> String {
    let mut s = String::with_capacity(10);
    for b in &h[..4] {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

/// Total order over blocks: `(height, hash)` lexicographic.
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.height == other.height && self.hash == other.hash
    }
}
impl Eq for Block {}

impl PartialOrd for Block {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Block {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.height, self.hash).cmp(&(other.height, other.hash))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::block;
    use super::*;

    #[test]
    fn orders_by_height_then_hash() {
        let a = block(100, 0xAA, 0x00, 1500, Address::from_bytes([1; 20]));
        let b = block(100, 0xAB, 0x00, 1500, Address::from_bytes([1; 20]));
        let c = block(101, 0x01, 0x00, 1515, Address::from_bytes([1; 20]));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn equality_ignores_non_key_fields() {
        let a = block(5, 0x10, 0x00, 1000, Address::from_bytes([1; 20]));
        let mut b = block(5, 0x10, 0x00, 1000, Address::from_bytes([2; 20]));
        b.consensus_root.timestamp = 9999;
        assert_eq!(a, b);
    }

    #[test]
    fn new_extends_tail_and_inherits_world_state() {
        let tail = block(10, 0xAA, 0x00, 1500, Address::from_bytes([1; 20]));
        let child = Block::new(1, Address::from_bytes([2; 20]), &tail);
        assert_eq!(child.height, 11);
        assert_eq!(child.parent_hash, tail.hash);
    }

    #[test]
    fn seal_is_deterministic_for_identical_fields() {
        let tail = block(10, 0xAA, 0x00, 1500, Address::from_bytes([1; 20]));
        let mut a = Block::new(1, Address::from_bytes([2; 20]), &tail);
        let mut b = Block::new(1, Address::from_bytes([2; 20]), &tail);
        a.timestamp = 1515;
        a.consensus_root.timestamp = 1515;
        b.timestamp = 1515;
        b.consensus_root.timestamp = 1515;
        a.seal(1);
        b.seal(1);
        assert_eq!(a.hash, b.hash);
    }
}
