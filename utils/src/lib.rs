//! Shared utilities for the Tally ledger indexer.

pub mod logging;

pub use logging::{init_logging, LogFormat};
