//! Evil-behavior reports and PoD governance transaction payloads.

use crate::domain::Address;
use serde::{Deserialize, Serialize};

/// Kind of misbehavior classified by the evil detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvilKind {
    /// Same miner double-minted at the same slot.
    DoubleSpend,
    /// A different miner minted at a slot it was not scheduled for.
    NotMiner,
}

/// An evil-behavior report, embedded as a PoD contract transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: u64,
    pub miner: Address,
    pub evil_kind: EvilKind,
}

/// The governance action a `PoDPayload` carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodAction {
    PoDReport,
    PoDHeartbeat,
    PoDState,
}

/// Payload of a transaction sent to the well-known PoD contract address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoDPayload {
    pub serial: u64,
    pub action: PodAction,
    pub data: Vec<u8>,
}

impl PoDPayload {
    pub fn new(serial: u64, action: PodAction, data: Vec<u8>) -> Self {
        Self {
            serial,
            action,
            data,
        }
    }

    /// Encode for inclusion as a transaction payload body.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trips_through_bincode() {
        let report = Report {
            timestamp: 15,
            miner: Address::from_bytes([9; 20]),
            evil_kind: EvilKind::DoubleSpend,
        };
        let bytes = bincode::serialize(&report).unwrap();
        let back: Report = bincode::deserialize(&bytes).unwrap();
        assert_eq!(report, back);
    }

    #[test]
    fn payload_encodes() {
        let payload = PoDPayload::new(3, PodAction::PoDHeartbeat, vec![]);
        assert!(payload.encode().is_ok());
    }
}
