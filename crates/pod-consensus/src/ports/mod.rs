//! Ports (hexagonal boundary): the driving API this crate exposes, and the
//! driven capabilities it consumes from the owning chain.

pub mod inbound;
pub mod outbound;

pub use inbound::ConsensusEngine;
pub use outbound::{
    AccountManager, BlockPool, ChainGateway, EventBus, GovernanceContract, NetworkGateway,
    RemoteSignClient, TransactionPool,
};
