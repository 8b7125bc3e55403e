//! # pod-consensus — Proof-of-Devotion consensus engine
//!
//! Core decision logic for a Proof-of-Devotion (PoD) blockchain: when to mint
//! a new block, which fork is canonical, when a block becomes irreversible,
//! and how double-mint misbehavior is detected and reported.
//!
//! ## Domain invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Slot cache keys equal their stored block's timestamp | [`domain::evil_detector::SlotCache`] |
//! | LIB never moves backward | [`domain::finality::advance`] |
//! | A new canonical tail is always ≥ the old tail, `(height, hash)` order | [`domain::fork_choice::choose_tail`] |
//! | Dynasty registry entries are immutable once resident | [`domain::dynasty::DynastyRegistry`] |
//! | At most one mint per slot while active | [`domain::mining_gate::MiningGate`] |
//!
//! ## Shape
//!
//! ```text
//!                 ┌──────────────┐
//!   tick (1s) ───▶│              │───▶ heartbeat, then mint_block
//!  EngineMessage ─▶│    Engine    │───▶ fork_choice / update_lib / verify_block
//!  (mpsc, cap 128) │              │     (called directly by the owning chain)
//!                 └──────┬───────┘
//!                        │ Arc<dyn Trait> / Arc<T> outbound ports
//!         ┌──────────────┼───────────────────────────────┐
//!         ▼              ▼                               ▼
//!   ChainGateway   BlockPool/TxPool   AccountManager/RemoteSignClient
//!                  NetworkGateway     GovernanceContract   EventBus
//! ```
//!
//! ## Outbound dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | [`ports::outbound::ChainGateway`] | tail/LIB pointers, parent lookup, VRF input |
//! | [`ports::outbound::BlockPool`] | push and broadcast a minted block |
//! | [`ports::outbound::TransactionPool`] | collect candidate transactions, requeue on failure |
//! | [`ports::outbound::AccountManager`] | local key custody and signing |
//! | [`ports::outbound::RemoteSignClient`] | remote signing/VRF, timeout-bounded |
//! | [`ports::outbound::GovernanceContract`] | dynasty committees, double-mint reporting |
//! | [`ports::outbound::NetworkGateway`] | witness message broadcast |
//! | [`ports::outbound::EventBus`] | `TopicLibBlock` emission |
//!
//! Out of scope, consumed only through the ports above: chain storage, the
//! transaction/block pool internals, account key storage, the P2P
//! transport, the VRF implementation, the state trie, and the PoD contract's
//! on-chain bytecode.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod governance;
pub mod metrics;
pub mod ports;
pub mod producer;
pub mod signing;
pub mod verify;

pub use config::EngineConfig;
pub use engine::{Engine, EngineDependencies};
pub use error::EngineError;
pub use signing::SigningBackend;
