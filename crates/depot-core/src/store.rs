//! # Store Ports
//!
//! The persistence collaborators the core talks to. `depot-db` implements
//! them over SQLite; tests implement them in memory.
//!
//! ```text
//! ┌───────────────────────┐     ┌───────────────────────┐     ┌───────────────────────┐
//! │    CatalogSource      │     │      CashLedger       │     │    TransactionLog     │
//! │  product_definitions  │     │  read_balance         │     │  append (only)        │
//! │  empty_definitions    │     │  increment_balance    │     │                       │
//! └───────────┬───────────┘     └───────────┬───────────┘     └───────────┬───────────┘
//!             │ Catalog::load               │ Committer                   │ Committer
//! ```
//!
//! All ports report failures as [`StoreError`] so the core never sees a
//! driver type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::money::Money;
use crate::transaction::Transaction;

// =============================================================================
// Raw Catalog Records
// =============================================================================

/// A product as stored. Amounts are raw text so the loader can apply its
/// own missing/malformed policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDefinition {
    pub name: String,
    pub crate_price: Option<String>,
    pub crate_deposit: Option<String>,
    pub bottle_price: Option<String>,
    pub bottle_deposit: Option<String>,
}

/// A returnable empty container as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyDefinition {
    pub name: String,
    /// Credit paid out per returned unit.
    pub deposit_value: Option<String>,
}

// =============================================================================
// Ports
// =============================================================================

/// Read-only access to catalog definitions.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn product_definitions(&self) -> Result<Vec<ProductDefinition>, StoreError>;
    async fn empty_definitions(&self) -> Result<Vec<EmptyDefinition>, StoreError>;
}

/// The till's cash balance.
#[async_trait]
pub trait CashLedger: Send + Sync {
    async fn read_balance(&self) -> Result<Money, StoreError>;

    /// Atomically adds `delta` (which may be negative) and returns the new
    /// balance. Must not be implemented as read-modify-write.
    async fn increment_balance(&self, delta: Money) -> Result<Money, StoreError>;
}

/// Append-only transaction history.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    async fn append(&self, transaction: &Transaction) -> Result<(), StoreError>;
}
