//! Evil detector / slot cache: catches double-mint (two
//! distinct blocks at the same slot timestamp) and classifies it.

use crate::domain::report::{EvilKind, Report};
use crate::domain::Address;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Size of the slot cache: bounded mapping
/// `timestamp_seconds -> Block` with LRU eviction.
pub const SLOT_CACHE_CAPACITY: usize = 128;

/// The minimal facts the detector needs about an observed block; avoids a
/// dependency on the full `Block`/`WorldStateHandle` machinery so the cache
/// can be exercised without constructing a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotEntry {
    pub hash: [u8; 32],
    pub miner: Address,
}

/// Bounded LRU mapping slot timestamp to the first-seen block at that slot.
pub struct SlotCache {
    entries: Mutex<LruCache<u64, SlotEntry>>,
    total_reports: std::sync::atomic::AtomicU64,
}

impl SlotCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(SLOT_CACHE_CAPACITY).expect("capacity is nonzero"),
            )),
            total_reports: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Insert a verified block's slot entry. No-op if the slot is already
    /// occupied (verification should only insert on first success).
    pub fn insert_if_absent(&self, timestamp: u64, entry: SlotEntry) {
        let mut cache = self.entries.lock();
        if !cache.contains(&timestamp) {
            cache.put(timestamp, entry);
        }
    }

    /// `check_double_mint`: look up the slot; classify a conflicting second
    /// block against the first-seen one. Returns `Some(report)` when this
    /// constitutes double-mint evidence for a report, `None` otherwise.
    ///
    /// Mirrors `SlashingDB`'s aggregate-counter pattern: `stats()` below is
    /// purely observational and does not change report semantics.
    pub fn check_double_mint(
        &self,
        timestamp: u64,
        observed_hash: [u8; 32],
        observed_miner: Address,
    ) -> Option<Report> {
        let cache = self.entries.lock();
        let stored = cache.peek(&timestamp)?;
        if stored.hash == observed_hash {
            return None;
        }
        let evil_kind = if stored.miner == observed_miner {
            EvilKind::DoubleSpend
        } else {
            EvilKind::NotMiner
        };
        self.total_reports
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Some(Report {
            timestamp,
            miner: observed_miner,
            evil_kind,
        })
    }

    /// Total double-mint reports classified so far.
    pub fn stats(&self) -> u64 {
        self.total_reports.load(std::sync::atomic::Ordering::Relaxed)
    }
}

impl Default for SlotCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    #[test]
    fn s6_double_mint_same_miner_classifies_double_spend() {
        let cache = SlotCache::new();
        cache.insert_if_absent(
            15,
            SlotEntry {
                hash: [0x01; 32],
                miner: addr(0xAA),
            },
        );

        let report = cache
            .check_double_mint(15, [0x02; 32], addr(0xAA))
            .expect("conflict at same slot");
        assert_eq!(report.timestamp, 15);
        assert_eq!(report.evil_kind, EvilKind::DoubleSpend);
        assert_eq!(cache.stats(), 1);
    }

    #[test]
    fn s6_double_mint_different_miner_classifies_not_miner() {
        let cache = SlotCache::new();
        cache.insert_if_absent(
            15,
            SlotEntry {
                hash: [0x01; 32],
                miner: addr(0xAA),
            },
        );

        let report = cache
            .check_double_mint(15, [0x02; 32], addr(0xBB))
            .unwrap();
        assert_eq!(report.evil_kind, EvilKind::NotMiner);
    }

    #[test]
    fn same_block_observed_twice_is_not_a_conflict() {
        let cache = SlotCache::new();
        cache.insert_if_absent(
            15,
            SlotEntry {
                hash: [0x01; 32],
                miner: addr(0xAA),
            },
        );
        assert!(cache.check_double_mint(15, [0x01; 32], addr(0xAA)).is_none());
    }

    #[test]
    fn absent_slot_is_not_a_conflict() {
        let cache = SlotCache::new();
        assert!(cache.check_double_mint(99, [0x01; 32], addr(0xAA)).is_none());
    }

    #[test]
    fn insert_if_absent_keeps_first_block() {
        let cache = SlotCache::new();
        cache.insert_if_absent(
            1,
            SlotEntry {
                hash: [0xAA; 32],
                miner: addr(1),
            },
        );
        cache.insert_if_absent(
            1,
            SlotEntry {
                hash: [0xBB; 32],
                miner: addr(2),
            },
        );
        // The second insert must not have replaced the first.
        assert!(cache.check_double_mint(1, [0xAA; 32], addr(1)).is_none());
    }
}
