//! Block reward schedule — the protocol's era table.
//!
//! The base reward paid to a block's miner is constant within an era and
//! drops at fixed activation heights. The schedule is an ordered list of
//! eras; a block selects the last era whose start height it has reached.

use crate::Amount;
use serde::{Deserialize, Serialize};

/// One contiguous height range with a constant base reward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardEra {
    /// First block height at which this era's reward applies.
    pub start_height: u64,
    /// Base miner reward in the chain's smallest unit.
    pub base_reward: Amount,
}

/// Ordered table of reward eras.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardSchedule {
    eras: Vec<RewardEra>,
}

impl RewardSchedule {
    /// Build a schedule from a list of eras. The list is sorted by start
    /// height; the first era must start at genesis so every height resolves.
    pub fn new(mut eras: Vec<RewardEra>) -> Self {
        eras.sort_by_key(|e| e.start_height);
        Self { eras }
    }

    /// The reference chain's mainnet schedule: 5 coins up to the first
    /// activation, 3 coins through the second, 2 coins afterwards.
    pub fn mainnet() -> Self {
        Self::new(vec![
            RewardEra {
                start_height: 0,
                base_reward: Amount::from_units(5),
            },
            RewardEra {
                start_height: 4_370_000,
                base_reward: Amount::from_units(3),
            },
            RewardEra {
                start_height: 7_280_000,
                base_reward: Amount::from_units(2),
            },
        ])
    }

    /// Base reward for a block at `height`.
    pub fn base_reward_at(&self, height: u64) -> Amount {
        self.eras
            .iter()
            .rev()
            .find(|era| era.start_height <= height)
            .map(|era| era.base_reward.clone())
            .unwrap_or_else(Amount::zero)
    }
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self::mainnet()
    }
}
