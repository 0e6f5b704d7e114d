//! Tally ingestion pipeline.
//!
//! The pipeline walks the chain's canonical history in strict height order
//! and reconciles it into the account ledger:
//! - [`TransactionProcessor`] applies one transaction idempotently,
//! - [`BlockProcessor`] drives a block's transactions and its miner reward,
//! - [`Ingestor`] is the outer loop: checkpointed resume, batched fetches
//!   consumed in order, and graceful-shutdown coordination.

pub mod block_processor;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod rewards;
pub mod shutdown;
pub mod tx_processor;

pub use block_processor::{BlockOutcome, BlockProcessor};
pub use config::IngestConfig;
pub use error::IngestError;
pub use metrics::IngestMetrics;
pub use orchestrator::{IngestState, Ingestor};
pub use progress::ProgressTracker;
pub use rewards::block_reward;
pub use shutdown::{DrainSignal, ShutdownController};
pub use tx_processor::TransactionProcessor;
