//! Block, transaction, and receipt shapes as consumed from the chain source.

use serde::{Deserialize, Serialize};
use tally_types::{Address, Amount, TxHash};

/// A canonical block with its transactions, as fetched from the chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainBlock {
    pub number: u64,
    pub timestamp: u64,
    /// The account credited with this block's reward.
    pub miner: Address,
    /// Total gas consumed by all transactions in the block.
    pub gas_used: u64,
    /// Base fee per gas unit; absent on blocks predating the fee-burn era.
    pub base_fee_per_gas: Option<Amount>,
    /// Transactions in their original in-block order. Order matters: it
    /// determines the successive balance snapshots of any address that
    /// appears more than once in the same block.
    pub transactions: Vec<ChainTransaction>,
}

/// One transaction as observed in a block body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainTransaction {
    pub hash: TxHash,
    pub block_number: u64,
    /// Sender; absent in degenerate chain data.
    pub from: Option<Address>,
    /// Recipient; absent for contract creation.
    pub to: Option<Address>,
    /// Value transferred, in the smallest unit.
    pub value: Amount,
}

/// Outcome of a transaction's on-chain execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Succeeded,
    /// The transaction executed and reverted — gas was still charged.
    Reverted,
}

/// A transaction receipt. Resolving one may suspend until the transaction is
/// confirmed; transport failures surface as [`crate::ChainError`], never as
/// a receipt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Receipt {
    pub gas_used: u64,
    pub effective_gas_price: Amount,
    pub status: ReceiptStatus,
}

impl Receipt {
    /// Gas fee charged for this transaction, successful or reverted.
    pub fn fees(&self) -> Amount {
        &self.effective_gas_price * self.gas_used
    }

    pub fn succeeded(&self) -> bool {
        self.status == ReceiptStatus::Succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_fees_are_gas_times_price() {
        let receipt = Receipt {
            gas_used: 21_000,
            effective_gas_price: "1000000000".parse().unwrap(),
            status: ReceiptStatus::Succeeded,
        };
        assert_eq!(receipt.fees(), "21000000000000".parse().unwrap());
    }

    #[test]
    fn reverted_receipt_still_carries_fees() {
        let receipt = Receipt {
            gas_used: 50_000,
            effective_gas_price: "2".parse().unwrap(),
            status: ReceiptStatus::Reverted,
        };
        assert!(!receipt.succeeded());
        assert_eq!(receipt.fees(), "100000".parse().unwrap());
    }
}
