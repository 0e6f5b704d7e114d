//! Nullable chain source — scripted blocks and receipts for testing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tally_chain::{ChainBlock, ChainError, ChainSource, Receipt};
use tally_types::TxHash;

/// A scripted in-memory chain source.
///
/// Tests register blocks and receipts up front; the pipeline under test
/// consumes them through the [`ChainSource`] trait exactly as it would the
/// JSON-RPC client. Individual heights can be scripted to fail, modelling
/// transport errors.
#[derive(Default)]
pub struct NullChainSource {
    tip: AtomicU64,
    blocks: Mutex<BTreeMap<u64, ChainBlock>>,
    receipts: Mutex<HashMap<TxHash, Receipt>>,
    failing_heights: Mutex<HashSet<u64>>,
}

impl NullChainSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block. The tip advances to the highest registered height.
    pub fn add_block(&self, block: ChainBlock) {
        self.tip.fetch_max(block.number, Ordering::SeqCst);
        self.blocks.lock().unwrap().insert(block.number, block);
    }

    /// Register the receipt for a transaction hash.
    pub fn add_receipt(&self, hash: TxHash, receipt: Receipt) {
        self.receipts.lock().unwrap().insert(hash, receipt);
    }

    /// Script a transport failure for fetches of `height`.
    pub fn fail_height(&self, height: u64) {
        self.failing_heights.lock().unwrap().insert(height);
    }

    /// Clear a previously scripted failure.
    pub fn heal_height(&self, height: u64) {
        self.failing_heights.lock().unwrap().remove(&height);
    }

    pub fn set_tip(&self, height: u64) {
        self.tip.store(height, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainSource for NullChainSource {
    async fn tip_height(&self) -> Result<u64, ChainError> {
        Ok(self.tip.load(Ordering::SeqCst))
    }

    async fn block_with_transactions(
        &self,
        height: u64,
    ) -> Result<Option<ChainBlock>, ChainError> {
        if self.failing_heights.lock().unwrap().contains(&height) {
            return Err(ChainError::RequestFailed(format!(
                "scripted failure at height {height}"
            )));
        }
        Ok(self.blocks.lock().unwrap().get(&height).cloned())
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Receipt, ChainError> {
        self.receipts
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| ChainError::RequestFailed(format!("no receipt scripted for {hash}")))
    }
}
