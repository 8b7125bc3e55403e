//! Driving ports (inbound API): the synchronous, chain-driven side of the
//! engine's interface. `async_trait`, `Send + Sync`, one method per
//! chain-invoked operation.

use crate::domain::{Advanced, Block};
use crate::error::VerifyError;
use async_trait::async_trait;
use shared_types::Hash;

/// Inbound messages the owning chain or network layer delivers to the
/// engine's message channel.
#[derive(Debug, Clone)]
pub enum EngineMessage {
    /// A peer-signed witness claim carrying reversible block hashes it has
    /// observed.
    Witness { reversible_hashes: Vec<Hash> },
    /// Request an orderly shutdown of the control loop.
    Shutdown,
}

/// The primary consensus API, invoked by the owning chain on its own
/// threads as well as by the engine's own control loop.
#[async_trait]
pub trait ConsensusEngine: Send + Sync {
    /// Run one control-loop tick: `heartbeat` then `mint_block`, in order
    /// (ordering guarantee).
    async fn tick(&self, now_s: u64);

    /// `VerifyBlock`. Reentrant-safe: invoked directly by the
    /// chain on its own threads.
    fn verify_block(&self, block: &Block) -> Result<(), VerifyError>;

    /// `CheckDoubleMint`. Returns `true` when this observation
    /// constitutes double-mint evidence.
    fn check_double_mint(&self, block: &Block) -> bool;

    /// `ForkChoice`. Returns the `(height, hash)` of the new
    /// canonical tail if the current tail is not already maximal.
    fn fork_choice(&self, detached: &[Block]) -> Option<(u64, Hash)>;

    /// `UpdateLIB`. Returns the finalization outcome if LIB
    /// advanced.
    fn update_lib(&self) -> Option<Advanced>;

    /// Dispatch an inbound message. Unknown message types are
    /// logged and dropped by the implementation, never surfaced as an error.
    async fn handle_message(&self, message: EngineMessage);
}
