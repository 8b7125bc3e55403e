//! # pod-node
//!
//! Bootstrap binary for a Proof-of-Devotion node: loads [`config`], builds
//! the genesis block and its starting dynasty, wires
//! [`pod_consensus::Engine`] to this crate's in-memory [`adapters`], and
//! runs its control loop to completion.
//!
//! None of the concrete adapters here are production-grade — no
//! persistence, no P2P, no on-chain governance contract — see each
//! adapter's module docs for what it stands in for.

pub mod adapters;
pub mod config;
pub mod genesis;

use adapters::accounts::LocalAccountManager;
use adapters::chain::InMemoryChain;
use adapters::events::TracingEventBus;
use adapters::governance::StaticGovernance;
use adapters::network::LoggingNetwork;
use adapters::pool::{InMemoryBlockPool, InMemoryTransactionPool};
use pod_consensus::{Engine, EngineConfig, EngineDependencies, SigningBackend};
use std::sync::Arc;

/// Convenience alias for the concrete engine this crate assembles.
pub type NodeEngine = Engine<
    InMemoryChain,
    InMemoryBlockPool,
    InMemoryTransactionPool,
    StaticGovernance,
    LoggingNetwork,
    TracingEventBus,
>;

/// Build a fully-wired [`NodeEngine`] from `config`, seeding genesis and
/// dynasty 0 around the configured miner.
pub fn bootstrap(chain_id: u64, config: EngineConfig) -> Arc<NodeEngine> {
    let genesis = genesis::build_genesis(config.miner);
    let chain = Arc::new(InMemoryChain::new(chain_id, genesis));

    let accounts = Arc::new(LocalAccountManager::new());
    accounts.seed_unlocked(config.miner);
    if config.coinbase != config.miner {
        accounts.seed_unlocked(config.coinbase);
    }

    let deps = EngineDependencies {
        chain: chain.clone(),
        block_pool: Arc::new(InMemoryBlockPool::new(chain)),
        tx_pool: Arc::new(InMemoryTransactionPool::new()),
        governance: Arc::new(StaticGovernance::new(vec![config.miner])),
        network: Arc::new(LoggingNetwork),
        events: Arc::new(TracingEventBus),
        signing: SigningBackend::Local(accounts),
    };

    let engine = Arc::new(Engine::new(deps, config));
    // Dynasty 0 is seeded directly rather than loaded from the (absent, in
    // this reference node) governance contract.
    engine.seed_dynasty(0, vec![engine.miner()]);
    engine
}
