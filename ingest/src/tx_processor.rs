//! Per-transaction ledger application.
//!
//! Applies one chain transaction to the account ledger: idempotency check
//! against the journal, receipt resolution, balance-delta projection, and
//! persistence. The journal entry is written before the account rows, so a
//! crash mid-transaction is healed by the replay skipping the journaled
//! hash.

use std::sync::Arc;

use tally_chain::{ChainSource, ChainTransaction};
use tally_store::{AccountStore, JournalEntry, JournalStore, LedgerStore};
use tally_types::Amount;

use crate::IngestError;

pub struct TransactionProcessor {
    store: Arc<dyn LedgerStore>,
    chain: Arc<dyn ChainSource>,
}

impl TransactionProcessor {
    pub fn new(store: Arc<dyn LedgerStore>, chain: Arc<dyn ChainSource>) -> Self {
        Self { store, chain }
    }

    /// Apply one transaction to the ledger.
    ///
    /// Returns the persisted journal entry, or `None` when the hash was
    /// already journaled (replay of a partially processed block). A reverted
    /// transaction is not an error: it is recorded with `success = false`,
    /// fees charged as normal, and a transfer amount of zero — no value
    /// moves on-chain when execution fails. Transport and storage failures
    /// propagate and abort the enclosing block.
    pub async fn process(
        &self,
        tx: &ChainTransaction,
    ) -> Result<Option<JournalEntry>, IngestError> {
        if self.store.journal_exists(&tx.hash)? {
            tracing::debug!(tx = %tx.hash, "transaction already journaled, skipping");
            return Ok(None);
        }

        // Resolve both parties before any mutation so the deltas below are
        // computed against pre-transaction snapshots.
        let sender = match &tx.from {
            Some(address) => Some(self.store.get_or_create(address)?),
            None => None,
        };
        let receiver = match &tx.to {
            Some(address) => Some(self.store.get_or_create(address)?),
            None => None,
        };

        let receipt = self.chain.transaction_receipt(&tx.hash).await?;
        let fees = receipt.fees();
        let amount = if receipt.succeeded() {
            tx.value.clone()
        } else {
            Amount::zero()
        };
        let total = &fees + &amount;

        let from_previous = sender.as_ref().map(|a| a.balance.clone());
        let to_previous = receiver.as_ref().map(|a| a.balance.clone());
        let from_next = from_previous.as_ref().map(|b| &(b - &amount) - &fees);
        let to_next = to_previous.as_ref().map(|b| b + &amount);

        let entry = JournalEntry {
            tx_hash: tx.hash,
            block_number: tx.block_number,
            from: tx.from.clone(),
            to: tx.to.clone(),
            success: receipt.succeeded(),
            amount: amount.clone(),
            fees_amount: fees.clone(),
            total_amount: total,
            from_previous_balance: from_previous,
            to_previous_balance: to_previous,
            from_next_balance: from_next.clone(),
            to_next_balance: to_next.clone(),
        };
        self.store.insert_journal_entry(&entry)?;

        if let (Some(mut record), Some(next)) = (receiver, to_next) {
            record.incoming_tx_count += 1;
            record.total_tx_count += 1;
            record.total_received += &amount;
            record.balance = next;
            self.store.put_account(&record)?;
        }
        if let (Some(mut record), Some(next)) = (sender, from_next) {
            record.outgoing_tx_count += 1;
            record.total_tx_count += 1;
            record.total_sent += &amount;
            record.total_fees_paid += &fees;
            record.balance = next;
            self.store.put_account(&record)?;
        }

        tracing::trace!(
            tx = %entry.tx_hash,
            block = entry.block_number,
            success = entry.success,
            amount = %entry.amount,
            fees = %entry.fees_amount,
            "transaction applied"
        );
        Ok(Some(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_chain::{Receipt, ReceiptStatus};
    use tally_nullables::{NullChainSource, NullLedgerStore};
    use tally_store::{AccountStore, JournalStore};
    use tally_types::{Address, TxHash};

    fn addr(n: u8) -> Address {
        Address::parse(&format!("0x{}", format!("{n:02x}").repeat(20))).unwrap()
    }

    fn amt(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn transfer(hash: u8, from: u8, to: u8, value: &str) -> ChainTransaction {
        ChainTransaction {
            hash: TxHash::new([hash; 32]),
            block_number: 1,
            from: Some(addr(from)),
            to: Some(addr(to)),
            value: amt(value),
        }
    }

    fn receipt(gas_used: u64, price: &str, status: ReceiptStatus) -> Receipt {
        Receipt {
            gas_used,
            effective_gas_price: price.parse().unwrap(),
            status,
        }
    }

    fn setup() -> (Arc<NullLedgerStore>, Arc<NullChainSource>, TransactionProcessor) {
        let store = Arc::new(NullLedgerStore::new());
        let chain = Arc::new(NullChainSource::new());
        let processor = TransactionProcessor::new(
            Arc::clone(&store) as Arc<dyn LedgerStore>,
            Arc::clone(&chain) as Arc<dyn ChainSource>,
        );
        (store, chain, processor)
    }

    // ── Successful transfer ─────────────────────────────────────────────

    #[tokio::test]
    async fn successful_transfer_projects_both_balances() {
        let (store, chain, processor) = setup();
        let tx = transfer(1, 0xaa, 0xbb, "100");
        chain.add_receipt(tx.hash, receipt(2, "1", ReceiptStatus::Succeeded));

        let entry = processor.process(&tx).await.unwrap().unwrap();
        assert!(entry.success);
        assert_eq!(entry.amount, amt("100"));
        assert_eq!(entry.fees_amount, amt("2"));
        assert_eq!(entry.total_amount, amt("102"));
        assert_eq!(entry.from_previous_balance, Some(amt("0")));
        assert_eq!(entry.from_next_balance, Some(amt("-102")));
        assert_eq!(entry.to_next_balance, Some(amt("100")));

        let sender = store.get_account(&addr(0xaa)).unwrap().unwrap();
        assert_eq!(sender.balance, amt("-102"));
        assert_eq!(sender.outgoing_tx_count, 1);
        assert_eq!(sender.total_tx_count, 1);
        assert_eq!(sender.total_sent, amt("100"));
        assert_eq!(sender.total_fees_paid, amt("2"));

        let recv = store.get_account(&addr(0xbb)).unwrap().unwrap();
        assert_eq!(recv.balance, amt("100"));
        assert_eq!(recv.incoming_tx_count, 1);
        assert_eq!(recv.total_tx_count, 1);
        assert_eq!(recv.total_received, amt("100"));
    }

    // ── Reverted transaction ────────────────────────────────────────────

    #[tokio::test]
    async fn reverted_transfer_charges_fees_only() {
        let (store, chain, processor) = setup();
        let tx = transfer(2, 0xaa, 0xbb, "50");
        chain.add_receipt(tx.hash, receipt(3, "1", ReceiptStatus::Reverted));

        let entry = processor.process(&tx).await.unwrap().unwrap();
        assert!(!entry.success);
        assert_eq!(entry.amount, amt("0"));
        assert_eq!(entry.fees_amount, amt("3"));
        assert_eq!(entry.total_amount, amt("3"));

        // The formulas still hold over the recorded amount.
        assert_eq!(entry.from_next_balance, Some(amt("-3")));
        assert_eq!(entry.to_next_balance, Some(amt("0")));

        let sender = store.get_account(&addr(0xaa)).unwrap().unwrap();
        assert_eq!(sender.balance, amt("-3"));
        let recv = store.get_account(&addr(0xbb)).unwrap().unwrap();
        assert_eq!(recv.balance, amt("0"));
        assert_eq!(recv.total_received, amt("0"));
    }

    // ── Idempotence ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn replaying_a_hash_is_a_no_op() {
        let (store, chain, processor) = setup();
        let tx = transfer(3, 0xaa, 0xbb, "100");
        chain.add_receipt(tx.hash, receipt(2, "1", ReceiptStatus::Succeeded));

        assert!(processor.process(&tx).await.unwrap().is_some());
        assert!(processor.process(&tx).await.unwrap().is_none());

        assert_eq!(store.journal_entry_count().unwrap(), 1);
        let sender = store.get_account(&addr(0xaa)).unwrap().unwrap();
        assert_eq!(sender.balance, amt("-102"));
        assert_eq!(sender.total_tx_count, 1);
    }

    // ── Missing counterparties ──────────────────────────────────────────

    #[tokio::test]
    async fn contract_creation_has_no_receiver_side() {
        let (store, chain, processor) = setup();
        let tx = ChainTransaction {
            hash: TxHash::new([4; 32]),
            block_number: 1,
            from: Some(addr(0xaa)),
            to: None,
            value: amt("10"),
        };
        chain.add_receipt(tx.hash, receipt(5, "1", ReceiptStatus::Succeeded));

        let entry = processor.process(&tx).await.unwrap().unwrap();
        assert!(entry.to.is_none());
        assert!(entry.to_previous_balance.is_none());
        assert!(entry.to_next_balance.is_none());
        assert_eq!(entry.from_next_balance, Some(amt("-15")));
        assert_eq!(store.account_count().unwrap(), 1);
    }

    // ── Transport failure ───────────────────────────────────────────────

    #[tokio::test]
    async fn unresolvable_receipt_is_fatal() {
        let (store, _chain, processor) = setup();
        let tx = transfer(5, 0xaa, 0xbb, "1");
        // No receipt scripted: resolution fails.
        let err = processor.process(&tx).await.unwrap_err();
        assert!(matches!(err, IngestError::Chain(_)));
        // The journal must not contain a half-applied entry.
        assert_eq!(store.journal_entry_count().unwrap(), 0);
    }

    // ── Count additivity ────────────────────────────────────────────────

    #[tokio::test]
    async fn total_tx_count_is_incoming_plus_outgoing() {
        let (store, chain, processor) = setup();
        for (i, (from, to)) in [(0xaa, 0xbb), (0xbb, 0xaa), (0xaa, 0xcc)].iter().enumerate() {
            let tx = transfer(10 + i as u8, *from, *to, "5");
            chain.add_receipt(tx.hash, receipt(1, "1", ReceiptStatus::Succeeded));
            processor.process(&tx).await.unwrap();
        }
        for n in [0xaa, 0xbb, 0xcc] {
            let account = store.get_account(&addr(n)).unwrap().unwrap();
            assert_eq!(
                account.total_tx_count,
                account.incoming_tx_count + account.outgoing_tx_count
            );
        }
    }
}
