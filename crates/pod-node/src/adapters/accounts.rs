//! Local account manager backed by in-process `secp256k1` key material
//! ("Account manager"), wrapping `shared_crypto::ecdsa::Secp256k1KeyPair`;
//! this is a reference implementation with no persistence or
//! passphrase-based encryption — a production deployment would back
//! `unlock`/`lock` with an encrypted keystore on disk instead of holding
//! keys resident for the node's lifetime.

use async_trait::async_trait;
use parking_lot::RwLock;
use pod_consensus::domain::{Address, Transaction, VrfOutput};
use pod_consensus::ports::outbound::AccountManager;
use shared_crypto::Secp256k1KeyPair;
use shared_types::Hash;
use std::collections::HashMap;

struct UnlockedKey {
    keypair: Secp256k1KeyPair,
}

/// Keystore of locally-held signing keys, keyed by [`Address`].
pub struct LocalAccountManager {
    keys: RwLock<HashMap<Address, UnlockedKey>>,
}

impl LocalAccountManager {
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Generate and register a key for `addr`, already unlocked. Used at
    /// genesis to seed the local miner's identity without a passphrase
    /// round trip.
    pub fn seed_unlocked(&self, addr: Address) {
        self.keys.write().insert(
            addr,
            UnlockedKey {
                keypair: Secp256k1KeyPair::generate(),
            },
        );
    }
}

impl Default for LocalAccountManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountManager for LocalAccountManager {
    async fn unlock(&self, addr: &Address, _passphrase: &str, _ttl_s: u64) -> Result<(), String> {
        // No on-disk keystore in this reference adapter: unlocking an
        // address that hasn't been seeded generates a fresh key rather
        // than failing, since there is no encrypted key to decrypt.
        if !self.keys.read().contains_key(addr) {
            self.seed_unlocked(*addr);
        }
        Ok(())
    }

    async fn lock(&self, addr: &Address) -> Result<(), String> {
        self.keys.write().remove(addr);
        Ok(())
    }

    async fn sign_block(&self, addr: &Address, hash: &Hash) -> Result<Vec<u8>, String> {
        let keys = self.keys.read();
        let key = keys
            .get(addr)
            .ok_or_else(|| format!("no unlocked key for {}", addr.to_base58()))?;
        Ok(key.keypair.sign(hash).as_bytes().to_vec())
    }

    async fn sign_transaction(&self, addr: &Address, tx: &Transaction) -> Result<Vec<u8>, String> {
        let keys = self.keys.read();
        let key = keys
            .get(addr)
            .ok_or_else(|| format!("no unlocked key for {}", addr.to_base58()))?;
        Ok(key.keypair.sign(&tx.hash()).as_bytes().to_vec())
    }

    async fn generate_random_seed(
        &self,
        addr: &Address,
        ancestor_hash: Hash,
        parent_seed: [u8; 32],
    ) -> Result<VrfOutput, String> {
        let keys = self.keys.read();
        let key = keys
            .get(addr)
            .ok_or_else(|| format!("no unlocked key for {}", addr.to_base58()))?;
        // No real VRF here (out of scope per): the seed is
        // derived deterministically so repeated calls for the same
        // ancestor/parent pair agree, and the signature over that seed
        // stands in for a VRF proof.
        let mut preimage = Vec::with_capacity(64);
        preimage.extend_from_slice(&ancestor_hash);
        preimage.extend_from_slice(&parent_seed);
        let seed = shared_crypto::blake3_hash(&preimage);
        let proof = key.keypair.sign(&seed).as_bytes().to_vec();
        Ok(VrfOutput { seed, proof })
    }
}
