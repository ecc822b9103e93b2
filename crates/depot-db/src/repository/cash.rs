//! # Cash Ledger Repository
//!
//! The running cash-on-hand balance.
//!
//! ## Storage
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ cash_ledger                                                  │
//! │   label         'cash_on_hand'   (single well-known row)     │
//! │   balance_cents INTEGER          (exact, no float drift)     │
//! │   updated_at    TEXT                                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Increments are a single `INSERT .. ON CONFLICT DO UPDATE` followed by a
//! read of the new balance inside the same database transaction. Concurrent
//! terminals sharing the file never lose an increment.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use depot_core::{CashLedger, Money, StoreError};

/// Label of the cash-on-hand row.
pub const CASH_ON_HAND: &str = "cash_on_hand";

/// Repository for the cash ledger.
#[derive(Debug, Clone)]
pub struct CashLedgerRepository {
    pool: SqlitePool,
}

impl CashLedgerRepository {
    /// Creates a new CashLedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashLedgerRepository { pool }
    }

    /// Creates the cash-on-hand row with `opening` if it does not exist yet.
    ///
    /// An existing balance is left untouched. Returns the current balance.
    pub async fn ensure_initialized(&self, opening: Money) -> DbResult<Money> {
        let cents = to_cents("opening_balance", opening)?;

        let result = sqlx::query(
            r#"
            INSERT INTO cash_ledger (label, balance_cents, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(label) DO NOTHING
            "#,
        )
        .bind(CASH_ON_HAND)
        .bind(cents)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(opening = %opening, "Cash ledger initialized");
        }

        self.balance().await
    }

    /// Overwrites the balance. Used by the seed binary's `--reset`.
    pub async fn set_balance(&self, balance: Money) -> DbResult<()> {
        let cents = to_cents("balance", balance)?;

        sqlx::query(
            r#"
            INSERT INTO cash_ledger (label, balance_cents, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(label) DO UPDATE SET
                balance_cents = excluded.balance_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(CASH_ON_HAND)
        .bind(cents)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(balance = %balance, "Cash balance set");
        Ok(())
    }

    /// Reads the current balance.
    ///
    /// A missing row reads as zero.
    pub async fn balance(&self) -> DbResult<Money> {
        let cents: Option<i64> =
            sqlx::query_scalar("SELECT balance_cents FROM cash_ledger WHERE label = ?1")
                .bind(CASH_ON_HAND)
                .fetch_optional(&self.pool)
                .await?;

        match cents {
            Some(cents) => Ok(Money::from_minor_units(cents)),
            None => {
                warn!("Cash ledger row missing, reading balance as zero");
                Ok(Money::ZERO)
            }
        }
    }

    /// Atomically adds `delta` to the balance and returns the new balance.
    ///
    /// A missing row is created with `delta` as its balance.
    pub async fn increment(&self, delta: Money) -> DbResult<Money> {
        let cents = to_cents("delta", delta)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::transaction_failed("begin", e))?;

        sqlx::query(
            r#"
            INSERT INTO cash_ledger (label, balance_cents, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(label) DO UPDATE SET
                balance_cents = balance_cents + excluded.balance_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(CASH_ON_HAND)
        .bind(cents)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let new_cents: i64 =
            sqlx::query_scalar("SELECT balance_cents FROM cash_ledger WHERE label = ?1")
                .bind(CASH_ON_HAND)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("Cash ledger", CASH_ON_HAND))?;

        tx.commit()
            .await
            .map_err(|e| DbError::transaction_failed("commit", e))?;

        let balance = Money::from_minor_units(new_cents);
        debug!(delta = %delta, balance = %balance, "Cash balance incremented");
        Ok(balance)
    }
}

fn to_cents(field: &str, amount: Money) -> DbResult<i64> {
    amount
        .to_minor_units()
        .ok_or_else(|| DbError::invalid_amount(field, amount))
}

#[async_trait]
impl CashLedger for CashLedgerRepository {
    async fn read_balance(&self) -> Result<Money, StoreError> {
        Ok(self.balance().await?)
    }

    async fn increment_balance(&self, delta: Money) -> Result<Money, StoreError> {
        Ok(self.increment(delta).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_missing_row_reads_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.cash().balance().await.unwrap(), Money::ZERO);
    }

    #[tokio::test]
    async fn test_ensure_initialized_keeps_existing_balance() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cash = db.cash();

        let first = cash.ensure_initialized(Money::new(dec!(100.00))).await.unwrap();
        assert_eq!(first, Money::new(dec!(100.00)));

        cash.increment(Money::new(dec!(17.00))).await.unwrap();
        let second = cash.ensure_initialized(Money::new(dec!(100.00))).await.unwrap();
        assert_eq!(second, Money::new(dec!(117.00)));
    }

    #[tokio::test]
    async fn test_increment_accumulates_exactly() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cash = db.cash();
        cash.ensure_initialized(Money::ZERO).await.unwrap();

        for _ in 0..10 {
            cash.increment(Money::new(dec!(0.10))).await.unwrap();
        }
        assert_eq!(cash.balance().await.unwrap().to_string(), "1.00");
    }

    #[tokio::test]
    async fn test_negative_increment() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cash = db.cash();
        cash.ensure_initialized(Money::new(dec!(10.00))).await.unwrap();

        let balance = cash.increment(Money::new(dec!(-12.50))).await.unwrap();
        assert_eq!(balance.to_string(), "-2.50");
    }

    #[tokio::test]
    async fn test_increment_creates_missing_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let balance = db.cash().increment(Money::new(dec!(5.15))).await.unwrap();
        assert_eq!(balance.to_string(), "5.15");
    }

    #[tokio::test]
    async fn test_sub_cent_delta_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.cash().increment(Money::new(dec!(0.005))).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidAmount { .. }));
    }

    #[tokio::test]
    async fn test_increment_on_closed_pool_fails_transaction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.cash().ensure_initialized(Money::new(dec!(10.00))).await.unwrap();
        db.close().await;

        let err = db.cash().increment(Money::new(dec!(1.00))).await.unwrap_err();
        assert!(matches!(err, DbError::TransactionFailed(ref msg) if msg.starts_with("begin")));
    }

    #[tokio::test]
    async fn test_set_balance_overwrites() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cash = db.cash();
        cash.ensure_initialized(Money::new(dec!(40.00))).await.unwrap();

        cash.set_balance(Money::new(dec!(100.00))).await.unwrap();
        assert_eq!(cash.read_balance().await.unwrap().to_string(), "100.00");
    }
}
