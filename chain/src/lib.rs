//! Chain data source for the Tally ledger indexer.
//!
//! Defines the [`ChainSource`] trait the ingestion pipeline consumes, the
//! block/transaction/receipt wire types, and an EVM JSON-RPC implementation
//! over HTTP.

pub mod client;
pub mod error;
pub mod source;
pub mod types;

pub use client::HttpChainSource;
pub use error::ChainError;
pub use source::ChainSource;
pub use types::{ChainBlock, ChainTransaction, Receipt, ReceiptStatus};
