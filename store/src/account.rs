//! Account ledger storage.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tally_types::{Address, Amount};

/// Per-address running totals derived from observed transactions and rewards.
///
/// `balance` is a derived ledger value, never re-read from the chain: it
/// always equals the most recently applied next-balance for this address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountRecord {
    pub address: Address,
    /// Current derived balance. May be negative for an address first
    /// observed as a sender.
    pub balance: Amount,
    /// Total transactions touching this account (incoming + outgoing).
    pub total_tx_count: u64,
    pub incoming_tx_count: u64,
    pub outgoing_tx_count: u64,
    /// Cumulative gas fees paid as a sender.
    pub total_fees_paid: Amount,
    /// Cumulative value received.
    pub total_received: Amount,
    /// Cumulative value sent.
    pub total_sent: Amount,
    /// Cumulative block rewards credited as a miner.
    pub total_mined_amount: Amount,
    pub total_mined_blocks: u64,
}

impl AccountRecord {
    /// A fresh record with every numeric field zeroed.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balance: Amount::zero(),
            total_tx_count: 0,
            incoming_tx_count: 0,
            outgoing_tx_count: 0,
            total_fees_paid: Amount::zero(),
            total_received: Amount::zero(),
            total_sent: Amount::zero(),
            total_mined_amount: Amount::zero(),
            total_mined_blocks: 0,
        }
    }
}

/// Trait for account ledger storage.
pub trait AccountStore {
    fn get_account(&self, address: &Address) -> Result<Option<AccountRecord>, StoreError>;

    /// Look up an account, inserting a zeroed record on first reference.
    ///
    /// Implementations must perform the lookup and insert atomically so two
    /// concurrent first references to the same address cannot race into
    /// duplicate rows.
    fn get_or_create(&self, address: &Address) -> Result<AccountRecord, StoreError>;

    /// Overwrite all mutable fields for the record's address.
    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError>;

    fn account_count(&self) -> Result<u64, StoreError>;
}
