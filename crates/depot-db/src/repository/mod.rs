//! # Repository Module
//!
//! SQLite implementations of the depot-core store ports.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  depot-core port          repository                  tables            │
//! │  ───────────────          ──────────                  ──────            │
//! │  CatalogSource      ◄──── CatalogRepository      ──── products, empties │
//! │  CashLedger         ◄──── CashLedgerRepository   ──── cash_ledger       │
//! │  TransactionLog     ◄──── TransactionRepository  ──── transactions,     │
//! │                                                       transaction_lines │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository also exposes inherent methods returning [`DbResult`]
//! for the seed binary and for tests.
//!
//! [`DbResult`]: crate::error::DbResult

pub mod cash;
pub mod catalog;
pub mod transaction;
