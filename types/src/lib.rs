//! Fundamental types for the Tally ledger indexer.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, transaction hashes, monetary amounts, and the block
//! reward schedule.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod params;

pub use address::Address;
pub use amount::Amount;
pub use error::TypeError;
pub use hash::TxHash;
pub use params::{RewardEra, RewardSchedule};
