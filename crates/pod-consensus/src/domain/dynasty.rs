//! Dynasty registry: caches committees keyed by dynasty
//! serial, resolves the proposer for any timestamp.

use crate::domain::timing::{serial, ProtocolConfig};
use crate::domain::Address;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// An ordered list of miner addresses valid for one dynasty interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dynasty {
    miners: Vec<Address>,
}

impl Dynasty {
    pub fn new(miners: Vec<Address>) -> Self {
        Self { miners }
    }

    /// `traverse_dynasty`: the ordered list of miner addresses.
    pub fn traverse(&self) -> &[Address] {
        &self.miners
    }
}

/// Errors raised resolving a dynasty or its proposer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DynastyError {
    #[error("block timestamp not aligned to block interval")]
    InvalidBlockInterval,
    #[error("no dynasty registered for serial {0}")]
    NotLoaded(u64),
    #[error("dynasty has no miners")]
    EmptyDynasty,
    #[error("failed to load dynasty from governance contract: {0}")]
    ContractLoadFailed(String),
}

/// Caches committees keyed by dynasty serial; read-mostly, copy-on-write
/// per serial ("read-mostly lock or copy-on-write map").
pub struct DynastyRegistry {
    tries: RwLock<HashMap<u64, Arc<Dynasty>>>,
}

impl DynastyRegistry {
    pub fn new() -> Self {
        Self {
            tries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert (or replace, for test fixtures) the dynasty for `serial`.
    pub fn insert(&self, serial: u64, dynasty: Dynasty) {
        self.tries.write().insert(serial, Arc::new(dynasty));
    }

    /// Whether `serial` is already resident.
    pub fn contains(&self, serial: u64) -> bool {
        self.tries.read().contains_key(&serial)
    }

    /// `get_dynasty`: the dynasty active at `ts_s`.
    pub fn get_dynasty(
        &self,
        ts_s: u64,
        cfg: &ProtocolConfig,
    ) -> Result<Arc<Dynasty>, DynastyError> {
        let s = serial(ts_s, cfg);
        self.tries
            .read()
            .get(&s)
            .cloned()
            .ok_or(DynastyError::NotLoaded(s))
    }

    /// `find_proposer`: scheduled proposer index is deterministic from `ts_s`.
    pub fn find_proposer(
        &self,
        ts_s: u64,
        cfg: &ProtocolConfig,
    ) -> Result<Address, DynastyError> {
        let ts_ms = ts_s * 1000;
        if ts_ms % cfg.block_interval_ms != 0 {
            return Err(DynastyError::InvalidBlockInterval);
        }
        let dynasty = self.get_dynasty(ts_s, cfg)?;
        let miners = dynasty.traverse();
        if miners.is_empty() {
            return Err(DynastyError::EmptyDynasty);
        }
        let index = ((ts_ms % cfg.dynasty_interval_ms) / cfg.block_interval_ms) as usize;
        Ok(miners[index % miners.len()])
    }

    /// `is_proposer`: convenience over `find_proposer`.
    pub fn is_proposer(
        &self,
        ts_s: u64,
        candidate: &Address,
        cfg: &ProtocolConfig,
    ) -> Result<bool, DynastyError> {
        Ok(self.find_proposer(ts_s, cfg)? == *candidate)
    }

    /// `load_from_contract`: materializes the dynasty trie for `serial + 1`
    /// when absent. Idempotent: re-entrant calls for an already-resident
    /// serial are no-ops (checked before invoking the outbound call).
    pub async fn load_from_contract(
        &self,
        at_serial: u64,
        loader: &dyn crate::ports::outbound::GovernanceContract,
    ) -> Result<(), DynastyError> {
        let target = at_serial + 1;
        if self.contains(target) {
            return Ok(());
        }
        let miners = loader
            .dynasty_trie_at(target)
            .await
            .map_err(DynastyError::ContractLoadFailed)?;
        self.insert(target, Dynasty::new(miners));
        Ok(())
    }

    /// `get_participants`: the set of registered miners across all resident
    /// dynasties, for heartbeat gating.
    pub fn get_participants(&self) -> Vec<Address> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for dynasty in self.tries.read().values() {
            for miner in dynasty.traverse() {
                if seen.insert(*miner) {
                    out.push(*miner);
                }
            }
        }
        out
    }
}

impl Default for DynastyRegistry {
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

    fn cfg() -> ProtocolConfig {
        ProtocolConfig::testnet()
    }

    #[test]
    fn find_proposer_indexes_by_slot_within_dynasty() {
        let registry = DynastyRegistry::new();
        let c = cfg();
        let s = serial(0, &c);
        registry.insert(s, Dynasty::new(vec![addr(1), addr(2), addr(3)]));

        // slot 0 -> index 0, slot 15s -> index 1, slot 30s -> index 2
        assert_eq!(registry.find_proposer(0, &c).unwrap(), addr(1));
        assert_eq!(registry.find_proposer(15, &c).unwrap(), addr(2));
        assert_eq!(registry.find_proposer(30, &c).unwrap(), addr(3));
    }

    #[test]
    fn rejects_misaligned_timestamp() {
        let registry = DynastyRegistry::new();
        let c = cfg();
        assert_eq!(
            registry.find_proposer(7, &c),
            Err(DynastyError::InvalidBlockInterval)
        );
    }

    #[test]
    fn is_proposer_matches_find_proposer() {
        let registry = DynastyRegistry::new();
        let c = cfg();
        registry.insert(serial(0, &c), Dynasty::new(vec![addr(9)]));
        assert!(registry.is_proposer(0, &addr(9), &c).unwrap());
        assert!(!registry.is_proposer(0, &addr(8), &c).unwrap());
    }

    #[test]
    fn participants_deduplicate_across_dynasties() {
        let registry = DynastyRegistry::new();
        registry.insert(0, Dynasty::new(vec![addr(1), addr(2)]));
        registry.insert(1, Dynasty::new(vec![addr(2), addr(3)]));
        let mut participants = registry.get_participants();
        participants.sort();
        assert_eq!(participants, vec![addr(1), addr(2), addr(3)]);
    }
}
