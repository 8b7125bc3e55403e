//! The engine: owns all consensus state and wires the domain layer to the
//! outbound ports. Generic over the six outbound capabilities (trait-bound
//! generics over `Arc<T>` fields rather than trait objects, monomorphized
//! per concrete adapter set).

use crate::config::EngineConfig;
use crate::domain::{
    new_reversible_cache, Address, Advanced, Block, DynastyRegistry, MiningGate, ReversibleCache,
    SlotCache,
};
use crate::error::VerifyError;
use crate::metrics;
use crate::ports::inbound::{ConsensusEngine, EngineMessage};
use crate::ports::outbound::{BlockPool, ChainGateway, EventBus, GovernanceContract, NetworkGateway, TransactionPool};
use crate::signing::SigningBackend;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Bundles the outbound adapters an [`Engine`] is constructed with.
pub struct EngineDependencies<Chain, Pool, Txp, Gov, Net, Ev> {
    pub chain: Arc<Chain>,
    pub block_pool: Arc<Pool>,
    pub tx_pool: Arc<Txp>,
    pub governance: Arc<Gov>,
    pub network: Arc<Net>,
    pub events: Arc<Ev>,
    pub signing: SigningBackend,
}

/// Proof-of-Devotion consensus engine: one value per node, constructed once
/// and shared (`Arc<Engine<...>>`) between the control loop and the chain's
/// own call sites for the synchronous inbound operations.
pub struct Engine<Chain, Pool, Txp, Gov, Net, Ev> {
    pub(crate) chain: Arc<Chain>,
    pub(crate) block_pool: Arc<Pool>,
    pub(crate) tx_pool: Arc<Txp>,
    pub(crate) governance: Arc<Gov>,
    pub(crate) network: Arc<Net>,
    pub(crate) events: Arc<Ev>,
    pub(crate) signing: SigningBackend,

    pub(crate) dynasty: DynastyRegistry,
    pub(crate) slot_cache: SlotCache,
    pub(crate) reversible: Mutex<ReversibleCache>,
    pub(crate) mining_gate: MiningGate,
    pub(crate) config: EngineConfig,

    /// `heartbeat`'s "on first call, always run" rule.
    pub(crate) heartbeat_ever_ran: AtomicBool,
}

impl<Chain, Pool, Txp, Gov, Net, Ev> Engine<Chain, Pool, Txp, Gov, Net, Ev>
where
    Chain: ChainGateway + 'static,
    Pool: BlockPool + 'static,
    Txp: TransactionPool + 'static,
    Gov: GovernanceContract + 'static,
    Net: NetworkGateway + 'static,
    Ev: EventBus + 'static,
{
    /// Construct → setup → start → stop: this is
    /// "construct". `start_mine` from config decides the initial mining-gate
    /// transition; callers invoke `enable_mining`/`resume_mining` themselves
    /// otherwise.
    pub fn new(deps: EngineDependencies<Chain, Pool, Txp, Gov, Net, Ev>, config: EngineConfig) -> Self {
        let mining_gate = MiningGate::new();
        if config.start_mine {
            let _ = mining_gate.enable_mining();
            let _ = mining_gate.resume_mining();
        }
        Self {
            chain: deps.chain,
            block_pool: deps.block_pool,
            tx_pool: deps.tx_pool,
            governance: deps.governance,
            network: deps.network,
            events: deps.events,
            signing: deps.signing,
            dynasty: DynastyRegistry::new(),
            slot_cache: SlotCache::new(),
            reversible: Mutex::new(new_reversible_cache()),
            mining_gate,
            config,
            heartbeat_ever_ran: AtomicBool::new(false),
        }
    }

    pub fn miner(&self) -> Address {
        self.config.miner
    }

    /// Install the dynasty committee for `serial` directly, bypassing
    /// `GovernanceContract::dynasty_trie_at`. Used at node bootstrap to seed
    /// the genesis committee before the registry can lazily load one from
    /// the contract, and by tests to pin down dynasty state without driving
    /// a full `trigger_state` round trip.
    pub fn seed_dynasty(&self, serial: u64, miners: Vec<Address>) {
        self.dynasty.insert(serial, crate::domain::Dynasty::new(miners));
    }

    pub fn mining_gate(&self) -> &MiningGate {
        &self.mining_gate
    }

    /// Run the control loop: a 1-second tick, an inbound
    /// message channel of capacity 128, and a shutdown watch — the three
    /// event sources named by the spec, multiplexed with `tokio::select!`.
    pub async fn run(
        self: Arc<Self>,
        mut messages: tokio::sync::mpsc::Receiver<EngineMessage>,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now_s = now_unix_s();
                    self.tick(now_s).await;
                }
                Some(message) = messages.recv() => {
                    self.handle_message(message).await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("engine shutting down");
                        self.mining_gate.disable_mining();
                        break;
                    }
                }
            }
        }
    }
}

fn now_unix_s() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[async_trait]
impl<Chain, Pool, Txp, Gov, Net, Ev> ConsensusEngine for Engine<Chain, Pool, Txp, Gov, Net, Ev>
where
    Chain: ChainGateway + 'static,
    Pool: BlockPool + 'static,
    Txp: TransactionPool + 'static,
    Gov: GovernanceContract + 'static,
    Net: NetworkGateway + 'static,
    Ev: EventBus + 'static,
{
    async fn tick(&self, now_s: u64) {
        // Ordering guarantee: heartbeat strictly precedes mint,
        // sequential awaits rather than `tokio::join!`.
        if let Err(e) = self.heartbeat(now_s).await {
            if matches!(e, crate::error::GovernanceError::NoHeartbeatWhenDisable) {
                tracing::debug!("heartbeat skipped: mining disabled");
            } else {
                tracing::warn!(error = %e, "heartbeat failed");
                metrics::record_component_error("governance", "heartbeat");
            }
        }

        let timer = metrics::time_mint();
        match self.mint_block(now_s).await {
            Ok(()) => {
                metrics::record_block_minted();
            }
            Err(e) => {
                tracing::warn!(error = %e, "mint_block failed");
                metrics::record_mint_failure(mint_failure_label(&e));
            }
        }
        drop(timer);
    }

    fn verify_block(&self, block: &Block) -> Result<(), VerifyError> {
        crate::verify::verify_block(
            block,
            &self.dynasty,
            &self.config.protocol,
            &self.slot_cache,
            self.config.vrf_activation_height,
        )?;
        // Mirrors the slot-cache insert: a verified block sits somewhere
        // between LIB and tail until `update_lib` pops it on finalization.
        self.reversible.lock().put(block.hash, ());
        Ok(())
    }

    fn check_double_mint(&self, block: &Block) -> bool {
        let report = match self
            .slot_cache
            .check_double_mint(block.timestamp, block.hash, block.consensus_root.proposer)
        {
            Some(report) => report,
            None => return false,
        };

        // `report_evil`: no-op unless mining is enabled, past
        // activation height, and the local node is the slot's proposer.
        let should_report = self.mining_gate.can_mint()
            && block.height >= self.config.pod_activation_height
            && self
                .dynasty
                .is_proposer(block.timestamp, &self.config.miner, &self.config.protocol)
                .unwrap_or(false);

        if should_report {
            metrics::record_double_mint_report();
            let governance = self.governance.clone();
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(e) = governance.submit_report(report).await {
                            tracing::warn!(error = %e, "failed to submit double-mint report");
                        }
                    });
                }
                Err(_) => tracing::warn!("no tokio runtime available to submit double-mint report"),
            }
        }
        true
    }

    fn fork_choice(&self, detached: &[Block]) -> Option<(u64, Hash)> {
        let current = self.chain.tail_block();
        let winner = crate::domain::choose_tail(&current, detached)?;
        let result = (winner.height, winner.hash);
        self.chain.set_tail_block(winner.clone());
        metrics::record_reorg();
        Some(result)
    }

    // Bridges the async `ChainGateway::store_lib_hash`/`EventBus::emit_lib_block`
    // ports onto whatever tokio runtime is available via `Handle::block_on`.
    // `Handle::block_on` panics if called from within an async task on the
    // same runtime, so callers invoking this from async code must do so via
    // `spawn_blocking` — exactly the "own threads" contract
    // describes for the chain's synchronous invocation of this method.
    fn update_lib(&self) -> Option<Advanced> {
        use crate::domain::LibCandidate;

        let tail_block = self.chain.tail_block();
        let tail = LibCandidate::from(&tail_block);
        let lib = self.chain.lib();
        let parent_of = |hash: &Hash| -> Option<LibCandidate> {
            let current = self.chain.get_block(hash)?;
            let parent = self.chain.get_block(&current.parent_hash)?;
            Some(LibCandidate::from(&parent))
        };
        let is_genesis = |cand: &LibCandidate| cand.height == 0;

        // `update_lib` is invoked synchronously by the chain on its own
        // threads; the outbound persistence/event/network ports are
        // async, so the call is bridged onto whichever tokio runtime the
        // caller is already part of. If none is available, LIB is left
        // unmoved and the advance is retried on the next call.
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("no tokio runtime available to advance LIB");
                return None;
            }
        };

        // On every tail advance, independent of whether LIB itself moves:
        // broadcast a witness of the accumulated reversible hashes if this
        // node is mining, past activation, and the tail's proposer.
        if let Some(hashes) = self.witness_broadcast_payload(&tail_block) {
            let network = self.network.clone();
            handle.spawn(async move {
                if let Err(e) = network.broadcast_witness(hashes).await {
                    tracing::warn!(error = %e, "failed to broadcast witness message");
                }
            });
        }

        let advanced = crate::domain::advance(&tail, &lib, &self.config.protocol, parent_of, is_genesis)?;

        let new_lib = crate::domain::LibRef {
            height: advanced.new_lib.height,
            hash: advanced.new_lib.hash,
        };
        match handle.block_on(self.chain.store_lib_hash(new_lib.hash)) {
            Ok(()) => {
                self.chain.set_lib(new_lib);
                self.reversible.lock().pop(&new_lib.hash);
                metrics::record_lib_advance(new_lib.height);
                let lib_str = format!("{}@{}", new_lib.height, hex_prefix(&new_lib.hash));
                let events = self.events.clone();
                handle.spawn(async move {
                    if let Err(e) = events.emit_lib_block(lib_str).await {
                        tracing::warn!(error = %e, "failed to emit TopicLibBlock");
                    }
                });
                Some(advanced)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist LIB, leaving pointer unmoved");
                None
            }
        }
    }

    async fn handle_message(&self, message: EngineMessage) {
        match message {
            EngineMessage::Witness { reversible_hashes } => {
                let mut cache = self.reversible.lock();
                for hash in reversible_hashes {
                    cache.put(hash, ());
                }
            }
            EngineMessage::Shutdown => {
                self.mining_gate.disable_mining();
            }
        }
    }
}

fn hex_prefix(hash: &Hash) -> String {
    let mut s = String::with_capacity(10);
    for b in &hash[..4] {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

fn mint_failure_label(e: &crate::error::ProducerError) -> &'static str {
    use crate::error::ProducerError::*;
    match e {
        CannotMintWhenDisable => "disabled",
        CannotMintWhenPending => "pending",
        Timing(_) => "timing",
        GenerateNextConsensusState(_) => "consensus_state",
        InvalidBlockProposer => "not_proposer",
        Dynasty(_) => "dynasty",
        RemoteSignFailed(_) => "remote_sign",
        RemoteVrfFailed(_) => "remote_vrf",
        AppendNewBlockFailed => "append_failed",
    }
}
