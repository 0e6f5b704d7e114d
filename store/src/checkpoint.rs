//! Ingestion checkpoint storage.

use crate::StoreError;

/// Durable mapping from a chain identifier to the last fully-processed
/// block height.
pub trait CheckpointStore {
    /// The height to resume from, initialising the row to `start_height`
    /// on first access.
    ///
    /// Initialisation must be an atomic upsert, not read-then-write, so a
    /// concurrent first access cannot create duplicate rows.
    fn resume_height(&self, chain_id: &str, start_height: u64) -> Result<u64, StoreError>;

    /// Unconditionally set the stored height. Monotonic, single-step
    /// advancement is the orchestrator's responsibility, not the store's.
    fn advance(&self, chain_id: &str, height: u64) -> Result<(), StoreError>;
}
