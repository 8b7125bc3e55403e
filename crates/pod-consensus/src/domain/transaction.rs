//! Transaction shape the producer and governance driver build and sign.
//!
//! The transaction pool, mempool fee market, and execution semantics are
//! external collaborators; this crate only needs enough of a
//! transaction's shape to construct PoD contract calls and to pass collected
//! mempool transactions back on a failed append.

use crate::domain::block::{BlockSignature, SignatureAlgorithm};
use crate::domain::Address;
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// A transaction as the consensus engine sees it: enough fields to build and
/// sign a PoD governance call, and to identify mempool-sourced transactions
/// returned to the pool on a failed append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub to: Address,
    pub value: u128,
    pub gas_price: u64,
    pub gas: u64,
    pub timestamp: u64,
    pub nonce: u64,
    pub payload: Vec<u8>,
}

impl Transaction {
    /// `hash`: blake3 over the bincode encoding of the unsigned fields,
    /// via `shared_crypto::blake3_hash` for content-addressed identifiers.
    pub fn hash(&self) -> Hash {
        let bytes = bincode::serialize(self).expect("transaction fields are always encodable");
        shared_crypto::blake3_hash(&bytes)
    }
}

/// A transaction plus the signature over its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub hash: Hash,
    pub signature: BlockSignature,
}

impl SignedTransaction {
    pub fn new(tx: Transaction, alg: SignatureAlgorithm, signature_bytes: Vec<u8>) -> Self {
        let hash = tx.hash();
        Self {
            tx,
            hash,
            signature: BlockSignature {
                alg,
                bytes: signature_bytes,
            },
        }
    }
}
