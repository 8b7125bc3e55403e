//! Timing primitives: pure functions mapping a millisecond
//! clock to slot boundaries, deadlines, and dynasty serials.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One second in milliseconds. Not a tunable.
pub const SECOND_MS: u64 = 1000;

/// Protocol-level timing and finality constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub block_interval_ms: u64,
    pub dynasty_interval_ms: u64,
    pub min_mint_duration_ms: u64,
    pub max_mint_duration_ms: u64,
    pub consensus_size: u32,
}

impl ProtocolConfig {
    /// Values used throughoutscenarios.
    pub const fn testnet() -> Self {
        Self {
            block_interval_ms: 15_000,
            dynasty_interval_ms: 3_600_000,
            min_mint_duration_ms: 2_200,
            max_mint_duration_ms: 5_200,
            consensus_size: 85,
        }
    }
}

/// Errors from `check_deadline`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// Tail is already in, or past, the next slot: our clock is behind.
    #[error("tail block minted in next slot")]
    BlockMintedInNextSlot,
    /// Still waiting for the previous slot's block to arrive.
    #[error("waiting for block in last slot")]
    WaitingBlockInLastSlot,
}

/// `last_slot(now_ms) = floor((now_ms - SecondMs) / BlockIntervalMs) * BlockIntervalMs`
pub fn last_slot(now_ms: u64, cfg: &ProtocolConfig) -> u64 {
    let base = now_ms.saturating_sub(SECOND_MS);
    (base / cfg.block_interval_ms) * cfg.block_interval_ms
}

/// `next_slot(now_ms) = floor((now_ms + BlockIntervalMs - SecondMs) / BlockIntervalMs) * BlockIntervalMs`
pub fn next_slot(now_ms: u64, cfg: &ProtocolConfig) -> u64 {
    let base = now_ms + cfg.block_interval_ms - SECOND_MS;
    (base / cfg.block_interval_ms) * cfg.block_interval_ms
}

/// `deadline(now_ms) = min(next_slot(now_ms), now_ms + MaxMintDurationMs)`
pub fn deadline(now_ms: u64, cfg: &ProtocolConfig) -> u64 {
    next_slot(now_ms, cfg).min(now_ms + cfg.max_mint_duration_ms)
}

/// `serial(ts_s) = (ts_s * SecondMs) / DynastyIntervalMs`
pub fn serial(ts_s: u64, cfg: &ProtocolConfig) -> u64 {
    (ts_s * SECOND_MS) / cfg.dynasty_interval_ms
}

///`check_deadline`.
pub fn check_deadline(
    tail_timestamp_ms: u64,
    now_ms: u64,
    cfg: &ProtocolConfig,
) -> Result<u64, TimingError> {
    let next = next_slot(now_ms, cfg);
    if tail_timestamp_ms >= next {
        return Err(TimingError::BlockMintedInNextSlot);
    }
    if tail_timestamp_ms == last_slot(now_ms, cfg) {
        return Ok(deadline(now_ms, cfg));
    }
    if next.saturating_sub(now_ms) <= cfg.min_mint_duration_ms {
        return Ok(deadline(now_ms, cfg));
    }
    Err(TimingError::WaitingBlockInLastSlot)
}
