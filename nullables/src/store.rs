//! Nullable store — thread-safe in-memory storage for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use tally_store::{
    AccountRecord, AccountStore, BlockReward, CheckpointStore, JournalEntry, JournalStore,
    RewardStore, StoreError,
};
use tally_types::{Address, TxHash};

/// An in-memory implementation of every `tally-store` trait.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullLedgerStore {
    accounts: Mutex<HashMap<String, AccountRecord>>,
    journal: Mutex<HashMap<[u8; 32], JournalEntry>>,
    rewards: Mutex<HashMap<u64, BlockReward>>,
    checkpoints: Mutex<HashMap<String, u64>>,
}

impl NullLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored checkpoint height, if one has been created.
    pub fn checkpoint(&self, chain_id: &str) -> Option<u64> {
        self.checkpoints.lock().unwrap().get(chain_id).copied()
    }
}

impl AccountStore for NullLedgerStore {
    fn get_account(&self, address: &Address) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(address.as_str())
            .cloned())
    }

    fn get_or_create(&self, address: &Address) -> Result<AccountRecord, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .entry(address.as_str().to_string())
            .or_insert_with(|| AccountRecord::new(address.clone()))
            .clone())
    }

    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(record.address.as_str().to_string(), record.clone());
        Ok(())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.lock().unwrap().len() as u64)
    }
}

impl JournalStore for NullLedgerStore {
    fn journal_exists(&self, hash: &TxHash) -> Result<bool, StoreError> {
        Ok(self.journal.lock().unwrap().contains_key(hash.as_bytes()))
    }

    fn insert_journal_entry(&self, entry: &JournalEntry) -> Result<(), StoreError> {
        let mut journal = self.journal.lock().unwrap();
        if journal.contains_key(entry.tx_hash.as_bytes()) {
            return Err(StoreError::Duplicate(entry.tx_hash.to_string()));
        }
        journal.insert(*entry.tx_hash.as_bytes(), entry.clone());
        Ok(())
    }

    fn get_journal_entry(&self, hash: &TxHash) -> Result<Option<JournalEntry>, StoreError> {
        Ok(self.journal.lock().unwrap().get(hash.as_bytes()).cloned())
    }

    fn journal_entry_count(&self) -> Result<u64, StoreError> {
        Ok(self.journal.lock().unwrap().len() as u64)
    }
}

impl RewardStore for NullLedgerStore {
    fn reward_exists(&self, block_number: u64) -> Result<bool, StoreError> {
        Ok(self.rewards.lock().unwrap().contains_key(&block_number))
    }

    fn insert_reward(&self, reward: &BlockReward) -> Result<(), StoreError> {
        let mut rewards = self.rewards.lock().unwrap();
        if rewards.contains_key(&reward.block_number) {
            return Err(StoreError::Duplicate(format!(
                "reward for block {}",
                reward.block_number
            )));
        }
        rewards.insert(reward.block_number, reward.clone());
        Ok(())
    }

    fn get_reward(&self, block_number: u64) -> Result<Option<BlockReward>, StoreError> {
        Ok(self.rewards.lock().unwrap().get(&block_number).cloned())
    }
}

impl CheckpointStore for NullLedgerStore {
    fn resume_height(&self, chain_id: &str, start_height: u64) -> Result<u64, StoreError> {
        Ok(*self
            .checkpoints
            .lock()
            .unwrap()
            .entry(chain_id.to_string())
            .or_insert(start_height))
    }

    fn advance(&self, chain_id: &str, height: u64) -> Result<(), StoreError> {
        self.checkpoints
            .lock()
            .unwrap()
            .insert(chain_id.to_string(), height);
        Ok(())
    }
}
