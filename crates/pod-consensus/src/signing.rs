//! Signing and VRF-seed capabilities: a capability with two variants
//! (local account manager, remote RPC client), selected once at setup from
//! [`crate::config::EngineConfig::enable_remote_sign_server`].

use crate::domain::{Address, SignatureAlgorithm, VrfOutput};
use crate::error::ProducerError;
use crate::ports::outbound::{AccountManager, RemoteSignClient};
use shared_types::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Per-call timeout for the remote-sign RPC, cancelable on expiry.
pub const REMOTE_SIGN_TIMEOUT: Duration = Duration::from_secs(5);

/// Block/transaction signing, local or remote.
pub enum SigningBackend {
    Local(Arc<dyn AccountManager>),
    Remote(Arc<dyn RemoteSignClient>),
}

impl SigningBackend {
    /// Sign `hash` as `miner`. Remote connections are scoped to this single
    /// call — `Arc<dyn RemoteSignClient>` is held for the `.await` only,
    /// released on all exit paths.
    pub async fn sign_hash(&self, miner: &Address, hash: Hash) -> Result<Vec<u8>, ProducerError> {
        match self {
            SigningBackend::Local(account_manager) => account_manager
                .sign_block(miner, &hash)
                .await
                .map_err(ProducerError::RemoteSignFailed),
            SigningBackend::Remote(client) => {
                tokio::time::timeout(
                    REMOTE_SIGN_TIMEOUT,
                    client.sign_hash(miner, hash, SignatureAlgorithm::Secp256k1),
                )
                .await
                .map_err(|_| ProducerError::RemoteSignFailed("timed out".into()))?
                .map_err(ProducerError::RemoteSignFailed)
            }
        }
    }

    /// Generate the VRF seed/proof pair.
    pub async fn generate_random_seed(
        &self,
        miner: &Address,
        ancestor_hash: Hash,
        parent_seed: [u8; 32],
    ) -> Result<VrfOutput, ProducerError> {
        match self {
            SigningBackend::Local(account_manager) => account_manager
                .generate_random_seed(miner, ancestor_hash, parent_seed)
                .await
                .map_err(ProducerError::RemoteVrfFailed),
            SigningBackend::Remote(client) => {
                tokio::time::timeout(
                    REMOTE_SIGN_TIMEOUT,
                    client.generate_random_seed(miner, parent_seed, ancestor_hash),
                )
                .await
                .map_err(|_| ProducerError::RemoteVrfFailed("timed out".into()))?
                .map_err(ProducerError::RemoteVrfFailed)
            }
        }
    }
}
