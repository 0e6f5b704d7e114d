//! The combined LMDB ledger store.
//!
//! One environment, one database per record family:
//! - `accounts`    address string → bincode [`AccountRecord`]
//! - `journal`     32-byte tx hash → bincode [`JournalEntry`]
//! - `rewards`     big-endian block height → bincode [`BlockReward`]
//! - `checkpoints` chain id string → little-endian u64 height

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use tally_store::{
    AccountRecord, AccountStore, BlockReward, CheckpointStore, JournalEntry, JournalStore,
    RewardStore, StoreError,
};
use tally_types::{Address, TxHash};

use crate::LmdbError;

/// Default LMDB map size: 64 GiB of address space (pages are allocated
/// lazily; this is an upper bound, not a reservation).
const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024 * 1024;

const MAX_DBS: u32 = 8;

pub struct LmdbLedgerStore {
    env: Arc<Env>,
    accounts_db: Database<Bytes, Bytes>,
    journal_db: Database<Bytes, Bytes>,
    rewards_db: Database<Bytes, Bytes>,
    checkpoints_db: Database<Bytes, Bytes>,
}

impl LmdbLedgerStore {
    /// Open or create the store under `path` (a directory).
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(path: &Path, map_size: usize) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)
            .map_err(|e| StoreError::Backend(format!("create data dir: {e}")))?;
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)
                .map_err(LmdbError::from)?
        };

        let mut wtxn = env.write_txn().map_err(LmdbError::from)?;
        let accounts_db = env
            .create_database(&mut wtxn, Some("accounts"))
            .map_err(LmdbError::from)?;
        let journal_db = env
            .create_database(&mut wtxn, Some("journal"))
            .map_err(LmdbError::from)?;
        let rewards_db = env
            .create_database(&mut wtxn, Some("rewards"))
            .map_err(LmdbError::from)?;
        let checkpoints_db = env
            .create_database(&mut wtxn, Some("checkpoints"))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(path = %path.display(), "opened LMDB ledger store");

        Ok(Self {
            env: Arc::new(env),
            accounts_db,
            journal_db,
            rewards_db,
            checkpoints_db,
        })
    }
}

impl AccountStore for LmdbLedgerStore {
    fn get_account(&self, address: &Address) -> Result<Option<AccountRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .accounts_db
            .get(&rtxn, address.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes).map_err(LmdbError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn get_or_create(&self, address: &Address) -> Result<AccountRecord, StoreError> {
        // Lookup and insert share one write transaction, so a concurrent
        // first reference cannot race into a duplicate row.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if let Some(bytes) = self
            .accounts_db
            .get(&wtxn, address.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            let record = bincode::deserialize(bytes).map_err(LmdbError::from)?;
            return Ok(record);
        }
        let record = AccountRecord::new(address.clone());
        let bytes = bincode::serialize(&record).map_err(LmdbError::from)?;
        self.accounts_db
            .put(&mut wtxn, address.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(record)
    }

    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.accounts_db
            .put(&mut wtxn, record.address.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.accounts_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

impl JournalStore for LmdbLedgerStore {
    fn journal_exists(&self, hash: &TxHash) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self
            .journal_db
            .get(&rtxn, hash.as_bytes().as_slice())
            .map_err(LmdbError::from)?
            .is_some())
    }

    fn insert_journal_entry(&self, entry: &JournalEntry) -> Result<(), StoreError> {
        let bytes = bincode::serialize(entry).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .journal_db
            .get(&wtxn, entry.tx_hash.as_bytes().as_slice())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(entry.tx_hash.to_string()));
        }
        self.journal_db
            .put(&mut wtxn, entry.tx_hash.as_bytes().as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_journal_entry(&self, hash: &TxHash) -> Result<Option<JournalEntry>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .journal_db
            .get(&rtxn, hash.as_bytes().as_slice())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes).map_err(LmdbError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn journal_entry_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.journal_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

impl RewardStore for LmdbLedgerStore {
    fn reward_exists(&self, block_number: u64) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self
            .rewards_db
            .get(&rtxn, &block_number.to_be_bytes())
            .map_err(LmdbError::from)?
            .is_some())
    }

    fn insert_reward(&self, reward: &BlockReward) -> Result<(), StoreError> {
        let bytes = bincode::serialize(reward).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .rewards_db
            .get(&wtxn, &reward.block_number.to_be_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "reward for block {}",
                reward.block_number
            )));
        }
        self.rewards_db
            .put(&mut wtxn, &reward.block_number.to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_reward(&self, block_number: u64) -> Result<Option<BlockReward>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .rewards_db
            .get(&rtxn, &block_number.to_be_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes).map_err(LmdbError::from)?,
            )),
            None => Ok(None),
        }
    }
}

impl CheckpointStore for LmdbLedgerStore {
    fn resume_height(&self, chain_id: &str, start_height: u64) -> Result<u64, StoreError> {
        // Upsert in a single write transaction: the read and the
        // init-if-absent cannot interleave with another first access.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if let Some(bytes) = self
            .checkpoints_db
            .get(&wtxn, chain_id.as_bytes())
            .map_err(LmdbError::from)?
        {
            let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                LmdbError::Serialization("checkpoint has unexpected byte length".to_string())
            })?;
            return Ok(u64::from_le_bytes(arr));
        }
        self.checkpoints_db
            .put(&mut wtxn, chain_id.as_bytes(), &start_height.to_le_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(start_height)
    }

    fn advance(&self, chain_id: &str, height: u64) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.checkpoints_db
            .put(&mut wtxn, chain_id.as_bytes(), &height.to_le_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
