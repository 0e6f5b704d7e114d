//! LMDB storage backend for the Tally ledger indexer.
//!
//! Implements all storage traits from `tally-store` using the `heed` LMDB
//! bindings. Each logical store maps to one LMDB database within a single
//! environment; every write commits its own transaction, so each logical
//! operation is atomic at the store level.

pub mod error;
pub mod ledger;

pub use error::LmdbError;
pub use ledger::LmdbLedgerStore;
