//! Concrete outbound-port adapters wiring [`pod_consensus::Engine`] to a
//! single-process, in-memory reference node. None of these are production
//! adapters — persistence, networking, and the on-chain governance
//! contract are all out of this crate's scope — they exist so
//! `pod-node` is an honestly runnable node rather than a wiring stub.

pub mod accounts;
pub mod chain;
pub mod events;
pub mod governance;
pub mod network;
pub mod pool;
