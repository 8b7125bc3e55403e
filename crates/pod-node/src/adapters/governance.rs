//! Governance contract adapter ("Governance contract"). Real
//! deployments submit these as transactions to the on-chain PoD contract
//! (out of scope per the contract-VM non-goal); this reference adapter
//! keeps the dynasty roster resident and logs what would otherwise be
//! submitted.

use async_trait::async_trait;
use parking_lot::RwLock;
use pod_consensus::domain::{Address, Report};
use pod_consensus::ports::outbound::GovernanceContract;

pub struct StaticGovernance {
    roster: RwLock<Vec<Address>>,
}

impl StaticGovernance {
    pub fn new(roster: Vec<Address>) -> Self {
        Self {
            roster: RwLock::new(roster),
        }
    }
}

#[async_trait]
impl GovernanceContract for StaticGovernance {
    async fn dynasty_trie_at(&self, _serial: u64) -> Result<Vec<Address>, String> {
        // A single fixed roster rolls over into every dynasty: this
        // reference node doesn't implement stake-weighted dynasty
        // transitions, only the PoD timing/finality/production logic.
        Ok(self.roster.read().clone())
    }

    async fn submit_report(&self, report: Report) -> Result<(), String> {
        tracing::warn!(
            timestamp = report.timestamp,
            miner = %report.miner,
            kind = ?report.evil_kind,
            "double-mint report (not submitted on-chain, no contract wired)"
        );
        Ok(())
    }
}
