//! Domain types and pure logic for the Proof-of-Devotion consensus engine.

pub mod address;
pub mod block;
pub mod dynasty;
pub mod evil_detector;
pub mod finality;
pub mod fork_choice;
pub mod mining_gate;
pub mod report;
pub mod timing;
pub mod transaction;

pub use address::{Address, AddressParseError};
pub use block::{Block, BlockSignature, ConsensusRoot, SignatureAlgorithm, VrfOutput, WorldStateHandle};
pub use dynasty::{Dynasty, DynastyError, DynastyRegistry};
pub use evil_detector::{SlotCache, SlotEntry, SLOT_CACHE_CAPACITY};
pub use finality::{advance, Advanced, LibCandidate, LibRef};
pub use fork_choice::choose_tail;
pub use mining_gate::{GateState, MiningGate, MiningGateError};
pub use report::{EvilKind, PoDPayload, PodAction, Report};
pub use timing::{check_deadline, deadline, last_slot, next_slot, serial, ProtocolConfig, TimingError, SECOND_MS};
pub use transaction::{SignedTransaction, Transaction};

/// Bounded LRU of reversible block hashes between LIB and tail.
/// Same shape and capacity as the slot cache; kept as a thin type alias so
/// call sites document intent without duplicating `lru` plumbing.
pub type ReversibleCache = lru::LruCache<shared_types::Hash, ()>;

/// Capacity of [`ReversibleCache`].
pub const REVERSIBLE_CACHE_CAPACITY: usize = 128;

/// Construct a fresh, correctly-sized reversible cache.
pub fn new_reversible_cache() -> ReversibleCache {
    lru::LruCache::new(
        std::num::NonZeroUsize::new(REVERSIBLE_CACHE_CAPACITY).expect("capacity is nonzero"),
    )
}
