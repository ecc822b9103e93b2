//! # Transaction Log Repository
//!
//! Append-only storage for finished sales.
//!
//! ## Write Path
//! ```text
//! Committer::commit
//!      │
//!      ▼
//! TransactionRepository::append ── BEGIN
//!      │                            INSERT transactions (header)
//!      │                            INSERT transaction_lines × N
//!      ▼                            COMMIT
//! either every row is stored or none is
//! ```
//!
//! Amounts are stored as exact decimal text, never rounded on the way in.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use depot_core::{Money, StoreError, Transaction, TransactionLine, TransactionLog};

// =============================================================================
// Row Types
// =============================================================================

/// Header row of a stored transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSummary {
    pub id: String,
    /// RFC 3339 timestamp as stored.
    pub created_at: String,
    pub total: Money,
    pub line_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: String,
    created_at: String,
    total: String,
    line_count: i64,
}

impl TryFrom<SummaryRow> for TransactionSummary {
    type Error = DbError;

    fn try_from(row: SummaryRow) -> DbResult<Self> {
        Ok(TransactionSummary {
            total: parse_amount("total", &row.total)?,
            id: row.id,
            created_at: row.created_at,
            line_count: row.line_count,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    position: i64,
    name: String,
    quantity: i64,
    unit_base_price: String,
    unit_deposit: String,
    unit_total_price: String,
    line_total: String,
}

impl TryFrom<LineRow> for TransactionLine {
    type Error = DbError;

    fn try_from(row: LineRow) -> DbResult<Self> {
        let position = u32::try_from(row.position)
            .map_err(|_| DbError::invalid_amount("position", row.position))?;

        Ok(TransactionLine {
            position,
            name: row.name,
            quantity: row.quantity,
            unit_base_price: parse_amount("unit_base_price", &row.unit_base_price)?,
            unit_deposit: parse_amount("unit_deposit", &row.unit_deposit)?,
            unit_total_price: parse_amount("unit_total_price", &row.unit_total_price)?,
            line_total: parse_amount("line_total", &row.line_total)?,
        })
    }
}

fn parse_amount(field: &str, value: &str) -> DbResult<Money> {
    Money::parse(value).map_err(|_| DbError::invalid_amount(field, value))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the transaction log.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Stores a transaction with all of its lines in one database transaction.
    pub async fn insert(&self, transaction: &Transaction) -> DbResult<()> {
        debug!(
            id = %transaction.id(),
            lines = transaction.lines().len(),
            "Appending transaction"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::transaction_failed("begin", e))?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, created_at, total, line_count)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(transaction.id())
        .bind(transaction.created_at().to_rfc3339())
        .bind(transaction.total().amount().to_string())
        .bind(transaction.lines().len() as i64)
        .execute(&mut *tx)
        .await?;

        for line in transaction.lines() {
            sqlx::query(
                r#"
                INSERT INTO transaction_lines (
                    id, transaction_id, position, name, quantity,
                    unit_base_price, unit_deposit, unit_total_price, line_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(transaction.id())
            .bind(i64::from(line.position))
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_base_price.amount().to_string())
            .bind(line.unit_deposit.amount().to_string())
            .bind(line.unit_total_price.amount().to_string())
            .bind(line.line_total.amount().to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::transaction_failed("commit", e))?;

        info!(id = %transaction.id(), total = %transaction.total(), "Transaction stored");
        Ok(())
    }

    /// Gets a transaction header by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<TransactionSummary>> {
        let row: Option<SummaryRow> = sqlx::query_as(
            "SELECT id, created_at, total, line_count FROM transactions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TransactionSummary::try_from).transpose()
    }

    /// Most recent transactions first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<TransactionSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT id, created_at, total, line_count
            FROM transactions
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionSummary::try_from).collect()
    }

    /// Lines of a transaction in display order.
    pub async fn lines(&self, transaction_id: &str) -> DbResult<Vec<TransactionLine>> {
        let rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT position, name, quantity,
                   unit_base_price, unit_deposit, unit_total_price, line_total
            FROM transaction_lines
            WHERE transaction_id = ?1
            ORDER BY position
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionLine::try_from).collect()
    }

    /// Counts stored transactions.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl TransactionLog for TransactionRepository {
    async fn append(&self, transaction: &Transaction) -> Result<(), StoreError> {
        Ok(self.insert(transaction).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use depot_core::{Cart, Committer, CommitError};
    use rust_decimal_macros::dec;

    fn m(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount)
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_or_merge("Cola Crate", m(dec!(12.00)), m(dec!(5.00)), m(dec!(17.00)), 2)
            .unwrap();
        cart.add_or_merge("Empty Crate", m(dec!(5.00)), Money::ZERO, m(dec!(-5.00)), 1)
            .unwrap();
        cart
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.transactions();
        let transaction = Transaction::from_cart(&sample_cart());

        repo.insert(&transaction).await.unwrap();

        let summary = repo.get(transaction.id()).await.unwrap().unwrap();
        assert_eq!(summary.total.to_string(), "29.00");
        assert_eq!(summary.line_count, 2);

        let lines = repo.lines(transaction.id()).await.unwrap();
        assert_eq!(lines, transaction.lines());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sub_cent_line_amounts_stored_exactly() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.transactions();
        let mut cart = Cart::new();
        cart.add_or_merge("Straw Bottle", m(dec!(0.333)), Money::ZERO, m(dec!(0.333)), 3)
            .unwrap();
        let transaction = Transaction::from_cart(&cart);

        repo.insert(&transaction).await.unwrap();

        let lines = repo.lines(transaction.id()).await.unwrap();
        assert_eq!(lines, transaction.lines());
        assert_eq!(lines[0].unit_total_price.amount(), dec!(0.333));
        assert_eq!(lines[0].line_total.amount(), dec!(0.999));

        let summary = repo.get(transaction.id()).await.unwrap().unwrap();
        assert_eq!(summary.total.to_string(), "1.00");
    }

    #[tokio::test]
    async fn test_insert_on_closed_pool_fails_transaction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let transaction = Transaction::from_cart(&sample_cart());
        db.close().await;

        let err = db.transactions().insert(&transaction).await.unwrap_err();
        assert!(matches!(err, DbError::TransactionFailed(_)));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected_atomically() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.transactions();
        let transaction = Transaction::from_cart(&sample_cart());

        repo.insert(&transaction).await.unwrap();
        let err = repo.insert(&transaction).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.lines(transaction.id()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.transactions().get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_against_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.cash().ensure_initialized(m(dec!(100.00))).await.unwrap();
        let committer = Committer::new(db.transactions(), db.cash());

        let receipt = committer.commit(&sample_cart()).await.unwrap();

        assert_eq!(receipt.balance.to_string(), "129.00");
        assert_eq!(db.transactions().count().await.unwrap(), 1);
        let recent = db.transactions().recent(5).await.unwrap();
        assert_eq!(recent[0].id, receipt.transaction.id());
    }

    #[tokio::test]
    async fn test_commit_empty_cart_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let committer = Committer::new(db.transactions(), db.cash());

        let err = committer.commit(&Cart::new()).await.unwrap_err();

        assert!(matches!(err, CommitError::EmptyCart));
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }
}
