//! Transaction journal storage.
//!
//! The journal is the append-only, uniquely-keyed record of every processed
//! transaction and the balance deltas it produced. Its tx-hash uniqueness is
//! the sole defence against double-application when a partially processed
//! block is replayed after a restart.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tally_types::{Address, Amount, TxHash};

/// Immutable record of one transaction's effect on the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JournalEntry {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub from: Option<Address>,
    pub to: Option<Address>,
    /// False when the transaction executed and reverted on-chain.
    pub success: bool,
    /// Value credited by this transaction. Zero for reverted transactions —
    /// no value moves on-chain when execution fails.
    pub amount: Amount,
    pub fees_amount: Amount,
    /// `amount + fees_amount`.
    pub total_amount: Amount,
    /// Balance snapshots around the transfer; `None` when the corresponding
    /// side has no tracked account.
    pub from_previous_balance: Option<Amount>,
    pub to_previous_balance: Option<Amount>,
    pub from_next_balance: Option<Amount>,
    pub to_next_balance: Option<Amount>,
}

/// Trait for journal storage.
pub trait JournalStore {
    /// Whether an entry already exists for this transaction hash.
    fn journal_exists(&self, hash: &TxHash) -> Result<bool, StoreError>;

    /// Insert a new entry. Returns [`StoreError::Duplicate`] if an entry
    /// with the same hash already exists; entries are never overwritten.
    fn insert_journal_entry(&self, entry: &JournalEntry) -> Result<(), StoreError>;

    fn get_journal_entry(&self, hash: &TxHash) -> Result<Option<JournalEntry>, StoreError>;

    fn journal_entry_count(&self) -> Result<u64, StoreError>;
}
