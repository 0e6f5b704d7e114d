//! Per-block ledger application.
//!
//! Drives the transaction processor over a block's transactions in their
//! original order, accumulates the fees actually applied, then settles the
//! miner: reward row plus ledger credit. Any transaction failure aborts the
//! block before the reward step, so a block is never rewarded unless all of
//! its transactions are applied.

use std::sync::Arc;

use tally_chain::{ChainBlock, ChainSource};
use tally_store::{AccountStore, BlockReward, LedgerStore, RewardStore};
use tally_types::{Amount, RewardSchedule};

use crate::rewards::block_reward;
use crate::{IngestError, TransactionProcessor};

/// What one block application did to the ledger.
#[derive(Clone, Debug)]
pub struct BlockOutcome {
    pub block_number: u64,
    pub transactions_applied: u64,
    pub duplicates_skipped: u64,
    pub fees: Amount,
    /// The reward credited to the miner; `None` when a replayed block's
    /// reward was already committed.
    pub reward: Option<Amount>,
}

pub struct BlockProcessor {
    transactions: TransactionProcessor,
    store: Arc<dyn LedgerStore>,
    schedule: RewardSchedule,
}

impl BlockProcessor {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        chain: Arc<dyn ChainSource>,
        schedule: RewardSchedule,
    ) -> Self {
        Self {
            transactions: TransactionProcessor::new(Arc::clone(&store), chain),
            store,
            schedule,
        }
    }

    /// Apply one block: every transaction in order, then the miner reward.
    pub async fn process(&self, block: &ChainBlock) -> Result<BlockOutcome, IngestError> {
        let mut fees = Amount::zero();
        let mut applied = 0u64;
        let mut skipped = 0u64;

        // In-block order matters: it fixes the successive balance snapshots
        // of any address appearing more than once in the same block.
        for tx in &block.transactions {
            match self.transactions.process(tx).await? {
                Some(entry) => {
                    fees += &entry.fees_amount;
                    applied += 1;
                }
                None => skipped += 1,
            }
        }

        // Reward rows are keyed by height: a replay of a block whose reward
        // was already committed (crash before the checkpoint advanced) must
        // not credit the miner twice.
        if self.store.reward_exists(block.number)? {
            tracing::debug!(block = block.number, "reward already recorded, skipping");
            return Ok(BlockOutcome {
                block_number: block.number,
                transactions_applied: applied,
                duplicates_skipped: skipped,
                fees,
                reward: None,
            });
        }

        let reward = block_reward(
            &self.schedule,
            block.number,
            block.gas_used,
            block.base_fee_per_gas.as_ref(),
            &fees,
        );
        self.store.insert_reward(&BlockReward {
            block_number: block.number,
            account: block.miner.clone(),
            amount: reward.clone(),
        })?;

        let mut miner = self.store.get_or_create(&block.miner)?;
        miner.total_mined_amount += &reward;
        miner.total_mined_blocks += 1;
        miner.balance += &reward;
        self.store.put_account(&miner)?;

        tracing::debug!(
            block = block.number,
            txs = applied,
            skipped,
            fees = %fees,
            reward = %reward,
            miner = %block.miner,
            "block applied"
        );

        Ok(BlockOutcome {
            block_number: block.number,
            transactions_applied: applied,
            duplicates_skipped: skipped,
            fees,
            reward: Some(reward),
        })
    }
}
