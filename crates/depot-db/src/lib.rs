//! # depot-db: Database Layer for Depot POS
//!
//! SQLite storage for the catalog, the cash ledger and the transaction log,
//! built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Depot POS Data Flow                              │
//! │                                                                         │
//! │  Terminal event loop (Effect::Commit / Effect::ReloadCatalog)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  depot-core (Committer, Catalog::load) ── calls the store ports        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     depot-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ CatalogRepo    │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ CashLedgerRepo │    │ 001_init.sql │  │   │
//! │  │   │               │    │ TransactionRepo│    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  depot.db (platform data dir, or DEPOT_DB_PATH)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Port implementations (catalog, cash, transactions)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use depot_core::{Catalog, Committer, FieldPolicy};
//! use depot_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("depot.db")).await?;
//! let catalog = Catalog::load(&db.catalog(), FieldPolicy::Strict).await?;
//! let committer = Committer::new(db.transactions(), db.cash());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cash::{CashLedgerRepository, CASH_ON_HAND};
pub use repository::catalog::CatalogRepository;
pub use repository::transaction::{TransactionRepository, TransactionSummary};
