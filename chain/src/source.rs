//! The chain data source trait.

use crate::{ChainBlock, ChainError, Receipt};
use async_trait::async_trait;
use tally_types::TxHash;

/// Read access to a chain's canonical history.
///
/// The ingestion pipeline depends only on this trait; the production
/// implementation is [`crate::HttpChainSource`], tests use the nullable
/// double. Implementations must be safe to share across tasks — batch
/// fetches are issued concurrently.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Current tip height of the chain.
    async fn tip_height(&self) -> Result<u64, ChainError>;

    /// Fetch one block with its full transaction bodies.
    ///
    /// Returns `None` when `height` is past the source's current tip; the
    /// caller decides whether to wait or give up.
    async fn block_with_transactions(&self, height: u64)
        -> Result<Option<ChainBlock>, ChainError>;

    /// Resolve a transaction's receipt, waiting for confirmation if the
    /// source has not indexed it yet.
    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Receipt, ChainError>;
}
