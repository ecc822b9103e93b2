//! # depot-core: Pure Business Logic for Depot POS
//!
//! This crate is the **heart** of Depot POS, a point-of-sale terminal for a
//! beverage store selling crates and bottles and taking back empties.
//! Everything here is pure logic with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Depot POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/terminal (ratatui + crossterm)             │   │
//! │  │        key press ──► Key ──► Session::handle_key ──► Effect     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ depot-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  money  │ │ catalog │ │  cart   │ │ session │ │ commit  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                      store (ports: async traits)                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TERMINAL • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ implements ports                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    depot-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal `Money` type
//! - [`catalog`] - Catalog loader: crates, bottles and empties
//! - [`cart`] - Cart engine: merge by name, remove by display index, totals
//! - [`session`] - Keystroke-driven input state machine
//! - [`transaction`] - Immutable transaction records
//! - [`commit`] - Transaction committer (persist, then move cash)
//! - [`store`] - Persistence ports implemented by `depot-db`
//! - [`validation`] - Numeric entry parsing and range checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use depot_core::cart::Cart;
//! use depot_core::money::Money;
//!
//! let mut cart = Cart::new();
//! let crate_total = Money::parse("17.00").unwrap();
//! cart.add_or_merge("Cola Crate", Money::parse("12.00").unwrap(), Money::parse("5.00").unwrap(), crate_total, 3)
//!     .unwrap();
//!
//! assert_eq!(cart.compute_total().to_string(), "51.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod commit;
pub mod error;
pub mod money;
pub mod session;
pub mod store;
pub mod transaction;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, DisplayLine, DisplayOrder};
pub use catalog::{Catalog, CatalogEntry, Category, FieldPolicy};
pub use commit::{CommitReceipt, Committer};
pub use error::{CartError, CatalogError, CommitError, InputError, MoneyError, StoreError};
pub use money::Money;
pub use session::{Effect, Key, Mode, PendingSelection, Session, Severity, Status};
pub use store::{CashLedger, CatalogSource, EmptyDefinition, ProductDefinition, TransactionLog};
pub use transaction::{Transaction, TransactionLine};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of fraction digits every amount is quantized to at presentation
/// and commit boundaries.
pub const CURRENCY_SCALE: u32 = 2;
