//! Block and transaction pools ("Block pool", "Transaction
//! pool"): FIFO in-memory queues, no fee market.

use async_trait::async_trait;
use parking_lot::Mutex;
use pod_consensus::domain::{Block, SignedTransaction};
use pod_consensus::ports::outbound::{BlockPool, TransactionPool};
use std::collections::VecDeque;
use std::sync::Arc;

use super::chain::InMemoryChain;

/// Appends a minted block directly onto the chain's tail. A networked
/// deployment would validate and gossip the block to peers first; single
/// node, self-trusting.
pub struct InMemoryBlockPool {
    chain: Arc<InMemoryChain>,
}

impl InMemoryBlockPool {
    pub fn new(chain: Arc<InMemoryChain>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl BlockPool for InMemoryBlockPool {
    async fn push_and_broadcast(&self, block: Block) -> Result<(), String> {
        tracing::info!(height = block.height, "minted block appended");
        self.chain.insert_own_block(block.clone());
        self.chain.set_tail_block(block);
        Ok(())
    }
}

/// FIFO queue of pending transactions with no fee market or ordering
/// policy (Non-goals exclude mempool internals; this exists
/// only so `collect_for_block` has something to hand back).
pub struct InMemoryTransactionPool {
    queue: Mutex<VecDeque<SignedTransaction>>,
}

impl InMemoryTransactionPool {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl Default for InMemoryTransactionPool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionPool for InMemoryTransactionPool {
    async fn push_and_broadcast(&self, tx: SignedTransaction) -> Result<(), String> {
        self.queue.lock().push_back(tx);
        Ok(())
    }

    async fn collect_for_block(&self, _deadline_ms: u64) -> Vec<SignedTransaction> {
        self.queue.lock().drain(..).collect()
    }

    async fn return_transactions(&self, txs: Vec<SignedTransaction>) {
        let mut queue = self.queue.lock();
        for tx in txs.into_iter().rev() {
            queue.push_front(tx);
        }
    }
}
