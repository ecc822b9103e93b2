//! # Transaction Committer
//!
//! Finishes a cart: snapshot, persist, then move the cash.
//!
//! ## Commit Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. cart empty?            ──yes──► EmptyCart (no store touched)        │
//! │  2. Transaction::from_cart (total = compute_total())                    │
//! │  3. TransactionLog::append ──err──► Persistence  (cart unchanged)       │
//! │  4. CashLedger::increment  ──err──► PartialCommit (tx recorded,         │
//! │                                     cash not moved, never retried)      │
//! │  5. Ok(CommitReceipt { transaction, balance })                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The committer never mutates the cart. Clearing it on success (and on
//! `PartialCommit`) is the session's job.

use tracing::{error, info};

use crate::cart::Cart;
use crate::error::{CommitError, StoreError};
use crate::money::Money;
use crate::store::{CashLedger, TransactionLog};
use crate::transaction::Transaction;

/// What a successful commit reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub transaction: Transaction,
    /// Cash balance after the increment.
    pub balance: Money,
}

/// Runs the commit sequence against a transaction log and a cash ledger.
pub struct Committer<L, C> {
    log: L,
    ledger: C,
}

impl<L, C> Committer<L, C>
where
    L: TransactionLog,
    C: CashLedger,
{
    pub fn new(log: L, ledger: C) -> Self {
        Committer { log, ledger }
    }

    /// Commits `cart`. See the module docs for the failure modes.
    pub async fn commit(&self, cart: &Cart) -> Result<CommitReceipt, CommitError> {
        if cart.is_empty() {
            return Err(CommitError::EmptyCart);
        }

        let transaction = Transaction::from_cart(cart);
        let total = transaction.total();

        if let Err(e) = self.log.append(&transaction).await {
            error!(
                transaction_id = %transaction.id(),
                total = %total,
                error = %e,
                "Transaction append failed, cart kept"
            );
            return Err(CommitError::Persistence(e));
        }

        match self.ledger.increment_balance(total).await {
            Ok(balance) => {
                info!(
                    transaction_id = %transaction.id(),
                    total = %total,
                    lines = transaction.lines().len(),
                    balance = %balance,
                    "Transaction committed"
                );
                Ok(CommitReceipt {
                    transaction,
                    balance,
                })
            }
            Err(e) => {
                error!(
                    transaction_id = %transaction.id(),
                    total = %total,
                    error = %e,
                    "Transaction recorded but cash balance not updated"
                );
                Err(CommitError::PartialCommit {
                    transaction_id: transaction.id().to_string(),
                    total,
                    source: e,
                })
            }
        }
    }

    /// Current cash balance, for display.
    pub async fn balance(&self) -> Result<Money, StoreError> {
        self.ledger.read_balance().await
    }

    pub fn ledger(&self) -> &C {
        &self.ledger
    }

    pub fn log(&self) -> &L {
        &self.log
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeLog {
        fail: AtomicBool,
        records: Mutex<Vec<Transaction>>,
    }

    #[async_trait]
    impl TransactionLog for FakeLog {
        async fn append(&self, transaction: &Transaction) -> Result<(), StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::new("disk full"));
            }
            self.records.lock().unwrap().push(transaction.clone());
            Ok(())
        }
    }

    struct FakeLedger {
        fail: AtomicBool,
        balance: Mutex<Money>,
    }

    impl FakeLedger {
        fn with_balance(amount: Money) -> Self {
            FakeLedger {
                fail: AtomicBool::new(false),
                balance: Mutex::new(amount),
            }
        }
    }

    #[async_trait]
    impl CashLedger for FakeLedger {
        async fn read_balance(&self) -> Result<Money, StoreError> {
            Ok(*self.balance.lock().unwrap())
        }

        async fn increment_balance(&self, delta: Money) -> Result<Money, StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::new("ledger locked"));
            }
            let mut balance = self.balance.lock().unwrap();
            *balance += delta;
            Ok(*balance)
        }
    }

    fn committer() -> Committer<FakeLog, FakeLedger> {
        Committer::new(
            FakeLog::default(),
            FakeLedger::with_balance(Money::new(dec!(100.00))),
        )
    }

    fn cola_cart(qty: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add_or_merge(
            "Cola Crate",
            Money::new(dec!(12.00)),
            Money::new(dec!(5.00)),
            Money::new(dec!(17.00)),
            qty,
        )
        .unwrap();
        cart
    }

    #[tokio::test]
    async fn test_commit_success() {
        let committer = committer();
        let cart = cola_cart(3);
        let before = committer.balance().await.unwrap();

        let receipt = committer.commit(&cart).await.unwrap();

        assert_eq!(receipt.transaction.total(), cart.compute_total());
        assert_eq!(receipt.transaction.total().to_string(), "51.00");
        assert_eq!(receipt.balance, before + receipt.transaction.total());
        assert_eq!(receipt.balance.to_string(), "151.00");
        assert_eq!(committer.log().records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_credit_reduces_cash() {
        let committer = committer();
        let mut cart = Cart::new();
        cart.add_or_merge(
            "Empty Crate",
            Money::new(dec!(5.00)),
            Money::ZERO,
            Money::new(dec!(-5.00)),
            2,
        )
        .unwrap();

        let receipt = committer.commit(&cart).await.unwrap();
        assert_eq!(receipt.balance.to_string(), "90.00");
    }

    #[tokio::test]
    async fn test_empty_cart_touches_nothing() {
        let committer = committer();
        let err = committer.commit(&Cart::new()).await.unwrap_err();

        assert!(matches!(err, CommitError::EmptyCart));
        assert!(committer.log().records.lock().unwrap().is_empty());
        assert_eq!(committer.balance().await.unwrap().to_string(), "100.00");
    }

    #[tokio::test]
    async fn test_append_failure_moves_no_cash() {
        let committer = committer();
        committer.log().fail.store(true, Ordering::SeqCst);

        let err = committer.commit(&cola_cart(1)).await.unwrap_err();

        assert!(matches!(err, CommitError::Persistence(_)));
        assert_eq!(committer.balance().await.unwrap().to_string(), "100.00");
    }

    #[tokio::test]
    async fn test_ledger_failure_is_partial_commit() {
        let committer = committer();
        committer.ledger().fail.store(true, Ordering::SeqCst);

        let err = committer.commit(&cola_cart(2)).await.unwrap_err();

        let recorded = committer.log().records.lock().unwrap().clone();
        assert_eq!(recorded.len(), 1);
        match err {
            CommitError::PartialCommit {
                transaction_id,
                total,
                ..
            } => {
                assert_eq!(transaction_id, recorded[0].id());
                assert_eq!(total.to_string(), "34.00");
            }
            other => panic!("expected PartialCommit, got {other:?}"),
        }
        assert_eq!(committer.balance().await.unwrap().to_string(), "100.00");
    }
}
