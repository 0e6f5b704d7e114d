//! Block reward storage.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tally_types::{Address, Amount};

/// The computed reward attributed to one block's miner.
///
/// Keyed uniquely by block height, so replaying a block after a crash that
/// landed between the reward commit and the checkpoint advance cannot
/// double-count the reward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockReward {
    pub block_number: u64,
    pub account: Address,
    pub amount: Amount,
}

/// Trait for block reward storage.
pub trait RewardStore {
    fn reward_exists(&self, block_number: u64) -> Result<bool, StoreError>;

    /// Insert a reward row. Returns [`StoreError::Duplicate`] if one already
    /// exists for this height.
    fn insert_reward(&self, reward: &BlockReward) -> Result<(), StoreError>;

    fn get_reward(&self, block_number: u64) -> Result<Option<BlockReward>, StoreError>;
}
