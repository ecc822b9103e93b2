//! # Catalog Repository
//!
//! Products and returnable empties.
//!
//! Amount columns are returned as raw text; validation and the
//! missing/malformed policy belong to `depot_core::Catalog`.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use depot_core::{CatalogSource, EmptyDefinition, ProductDefinition, StoreError};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    name: String,
    crate_price: Option<String>,
    crate_deposit: Option<String>,
    bottle_price: Option<String>,
    bottle_deposit: Option<String>,
}

impl From<ProductRow> for ProductDefinition {
    fn from(row: ProductRow) -> Self {
        ProductDefinition {
            name: row.name,
            crate_price: row.crate_price,
            crate_deposit: row.crate_deposit,
            bottle_price: row.bottle_price,
            bottle_deposit: row.bottle_deposit,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EmptyRow {
    name: String,
    deposit_value: Option<String>,
}

impl From<EmptyRow> for EmptyDefinition {
    fn from(row: EmptyRow) -> Self {
        EmptyDefinition {
            name: row.name,
            deposit_value: row.deposit_value,
        }
    }
}

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// All products, ordered by name.
    pub async fn list_products(&self) -> DbResult<Vec<ProductDefinition>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT name, crate_price, crate_deposit, bottle_price, bottle_deposit
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Fetched products");
        Ok(rows.into_iter().map(ProductDefinition::from).collect())
    }

    /// All empties, ordered by name.
    pub async fn list_empties(&self) -> DbResult<Vec<EmptyDefinition>> {
        let rows: Vec<EmptyRow> = sqlx::query_as(
            r#"
            SELECT name, deposit_value
            FROM empties
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Fetched empties");
        Ok(rows.into_iter().map(EmptyDefinition::from).collect())
    }

    /// Inserts a product. Returns the generated id.
    pub async fn insert_product(&self, product: &ProductDefinition) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        debug!(id = %id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, crate_price, crate_deposit, bottle_price, bottle_deposit
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(&product.name)
        .bind(&product.crate_price)
        .bind(&product.crate_deposit)
        .bind(&product.bottle_price)
        .bind(&product.bottle_deposit)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Inserts an empty. Returns the generated id.
    pub async fn insert_empty(&self, empty: &EmptyDefinition) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        debug!(id = %id, name = %empty.name, "Inserting empty");

        sqlx::query("INSERT INTO empties (id, name, deposit_value) VALUES (?1, ?2, ?3)")
            .bind(&id)
            .bind(&empty.name)
            .bind(&empty.deposit_value)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    /// Counts products.
    pub async fn count_products(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Counts empties.
    pub async fn count_empties(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM empties")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes every product and empty in one transaction.
    pub async fn clear(&self) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::transaction_failed("begin", e))?;
        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM empties").execute(&mut *tx).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::transaction_failed("commit", e))?;

        debug!("Catalog cleared");
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for CatalogRepository {
    async fn product_definitions(&self) -> Result<Vec<ProductDefinition>, StoreError> {
        Ok(self.list_products().await?)
    }

    async fn empty_definitions(&self) -> Result<Vec<EmptyDefinition>, StoreError> {
        Ok(self.list_empties().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use depot_core::{Catalog, CatalogError, EmptyDefinition, FieldPolicy, ProductDefinition};

    fn cola() -> ProductDefinition {
        ProductDefinition {
            name: "Cola".to_string(),
            crate_price: Some("12.00".to_string()),
            crate_deposit: Some("5.00".to_string()),
            bottle_price: Some("1.00".to_string()),
            bottle_deposit: Some("0.15".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        repo.insert_product(&cola()).await.unwrap();
        repo.insert_empty(&EmptyDefinition {
            name: "Empty Crate".to_string(),
            deposit_value: Some("5.00".to_string()),
        })
        .await
        .unwrap();

        assert_eq!(repo.list_products().await.unwrap(), vec![cola()]);
        assert_eq!(repo.count_products().await.unwrap(), 1);
        assert_eq!(repo.count_empties().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_product_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        repo.insert_product(&cola()).await.unwrap();
        let err = repo.insert_product(&cola()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_catalog_loads_through_port() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();
        repo.insert_product(&cola()).await.unwrap();

        let catalog = Catalog::load(&repo, FieldPolicy::Strict).await.unwrap();
        assert_eq!(catalog.crates()[0].display_name, "Cola Crate");
        assert_eq!(catalog.crates()[0].unit_total_price.to_string(), "17.00");
    }

    #[tokio::test]
    async fn test_null_amount_is_missing_field_at_startup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();
        let mut partial = cola();
        partial.bottle_deposit = None;
        repo.insert_product(&partial).await.unwrap();

        let err = Catalog::load(&repo, FieldPolicy::Strict).await.unwrap_err();
        assert!(matches!(err, CatalogError::MissingField { field: "bottle_deposit", .. }));

        let lenient = Catalog::load(&repo, FieldPolicy::Lenient).await.unwrap();
        assert_eq!(lenient.bottles()[0].unit_total_price.to_string(), "1.00");
    }

    #[tokio::test]
    async fn test_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();
        repo.insert_product(&cola()).await.unwrap();

        repo.clear().await.unwrap();
        assert_eq!(repo.count_products().await.unwrap(), 0);
    }
}
