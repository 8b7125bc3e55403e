//! Block verification: five ordered checks, short-circuiting
//! on first failure, inserting into the slot cache only on full success.

use crate::domain::evil_detector::SlotEntry;
use crate::domain::timing::ProtocolConfig;
use crate::domain::{Block, DynastyRegistry, SlotCache};
use crate::error::VerifyError;

/// `verify_block`. `vrf_activation_height` is the height at
/// which a VRF random seed becomes mandatory.
///
/// Step 3's "recover signer from (alg, hash, signature)" has no outbound
/// port to perform actual signature recovery (`AccountManager` only signs,
/// it does not verify) — the owning chain is expected to authenticate the
/// signature bytes itself before handing the block to this engine. What
/// this crate can and does check is that the block's claimed proposer
/// (`consensus_root.proposer`) matches the schedule, and that a signature
/// is actually attached.
pub fn verify_block(
    block: &Block,
    registry: &DynastyRegistry,
    cfg: &ProtocolConfig,
    slot_cache: &SlotCache,
    vrf_activation_height: u64,
) -> Result<(), VerifyError> {
    if block.timestamp != block.consensus_root.timestamp {
        return Err(VerifyError::InvalidBlockTimestamp);
    }

    let ts_ms = block.timestamp_ms();
    if ts_ms == 0 || ts_ms % cfg.block_interval_ms != 0 {
        return Err(VerifyError::InvalidBlockInterval);
    }

    let scheduled = registry.find_proposer(block.timestamp, cfg)?;
    if scheduled != block.consensus_root.proposer || block.signature.bytes.is_empty() {
        return Err(VerifyError::InvalidBlockProposer);
    }

    if block.height >= vrf_activation_height && !block.has_random_seed() {
        return Err(VerifyError::InvalidBlockRandom);
    }

    slot_cache.insert_if_absent(
        block.timestamp,
        SlotEntry {
            hash: block.hash,
            miner: block.consensus_root.proposer,
        },
    );
    Ok(())
}
