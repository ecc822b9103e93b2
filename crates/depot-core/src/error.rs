//! # Error Types
//!
//! Domain-specific error types for depot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  depot-core errors (this file)                                         │
//! │  ├── InputError    - Operator typed something unusable (recoverable)   │
//! │  ├── CartError     - Cart engine invariant violated (logic/data bug)   │
//! │  ├── CatalogError  - Catalog could not be built (fatal at startup)     │
//! │  ├── CommitError   - Finishing a transaction failed                    │
//! │  ├── StoreError    - A persistence port reported a failure             │
//! │  └── MoneyError    - Amount text could not be parsed                   │
//! │                                                                         │
//! │  depot-db errors (separate crate)                                      │
//! │  └── DbError       - Database operation failures → StoreError          │
//! │                                                                         │
//! │  terminal errors (in app)                                              │
//! │  └── AppError      - Fatal startup failures → non-zero exit            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (name, index, amount)
//! 3. Errors are enum variants, never String
//! 4. Formatting for the status line happens in the terminal, not here

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Input Error
// =============================================================================

/// Operator entry errors.
///
/// Reported on the status line; the input mode is kept (see `session`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Confirm pressed with nothing typed. The buffer is left as is.
    #[error("nothing entered")]
    EmptyInput,

    /// The buffer is not an integer (or does not fit in one).
    #[error("invalid number: '{input}'")]
    InvalidNumber { input: String },

    /// Item number outside `[1, max]`.
    #[error("number {value} out of range (1-{max})")]
    OutOfRange { value: i64, max: usize },

    /// Quantity of zero or less.
    #[error("quantity must be positive, got {value}")]
    NonPositiveQuantity { value: i64 },
}

// =============================================================================
// Cart Error
// =============================================================================

/// Cart engine invariant violations.
///
/// These indicate a logic or catalog bug, never a retryable operator error.
/// The cart is left exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The same display name arrived with a different unit total.
    #[error("price mismatch for '{name}': cart has {existing}, catalog offered {incoming}")]
    PriceMismatch {
        name: String,
        existing: Money,
        incoming: Money,
    },

    /// Removal index outside `[1, len]`.
    #[error("item #{index} does not exist (cart has {len} lines)")]
    IndexOutOfRange { index: i64, len: usize },

    /// The display order named a line the cart no longer holds.
    #[error("cart line '{name}' vanished before it could be removed")]
    InconsistentState { name: String },

    /// A quantity of zero or less reached the engine.
    #[error("quantity must be positive, got {quantity} for '{name}'")]
    NonPositiveQuantity { name: String, quantity: i64 },

    /// Merging would overflow the line quantity.
    #[error("quantity overflow for '{name}'")]
    QuantityOverflow { name: String },
}

// =============================================================================
// Catalog Error
// =============================================================================

/// Errors building the selection lists.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required field is absent on a product or empty record.
    #[error("catalog record '{record}' is missing required field '{field}'")]
    MissingField { record: String, field: &'static str },

    /// Two entries of one category share a display name.
    #[error("duplicate catalog entry '{name}'")]
    DuplicateName { name: String },

    /// The catalog store could not be read.
    #[error("catalog store unavailable: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Commit Error
// =============================================================================

/// Errors finishing a transaction.
#[derive(Debug, Error)]
pub enum CommitError {
    /// Nothing to commit.
    #[error("cart is empty")]
    EmptyCart,

    /// The transaction record could not be appended. Nothing was written
    /// and the cart is unchanged.
    #[error("transaction could not be saved: {0}")]
    Persistence(#[source] StoreError),

    /// The transaction was recorded but the cash balance was not updated.
    /// Never retried automatically: a retry could count the cash twice.
    #[error("transaction {transaction_id} recorded (total {total}) but cash was not updated: {source}")]
    PartialCommit {
        transaction_id: String,
        total: Money,
        #[source]
        source: StoreError,
    },
}

// =============================================================================
// Store Error
// =============================================================================

/// A failure reported by a persistence port.
///
/// Storage crates convert their own error types into this one so the core
/// never depends on a database driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    /// Creates a store error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        StoreError {
            message: message.into(),
        }
    }
}

// =============================================================================
// Money Error
// =============================================================================

/// Amount parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("'{input}' is not a decimal amount")]
    InvalidFormat { input: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = CartError::PriceMismatch {
            name: "Cola Crate".to_string(),
            existing: Money::new(dec!(17.00)),
            incoming: Money::new(dec!(18.00)),
        };
        assert_eq!(
            err.to_string(),
            "price mismatch for 'Cola Crate': cart has 17.00, catalog offered 18.00"
        );

        let err = InputError::OutOfRange { value: 9, max: 3 };
        assert_eq!(err.to_string(), "number 9 out of range (1-3)");
    }

    #[test]
    fn test_partial_commit_keeps_source() {
        let err = CommitError::PartialCommit {
            transaction_id: "t-1".to_string(),
            total: Money::new(dec!(51)),
            source: StoreError::new("ledger locked"),
        };
        assert!(err.to_string().contains("51.00"));
        assert!(err.to_string().contains("ledger locked"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_store_error_converts_to_catalog_error() {
        let catalog_err: CatalogError = StoreError::new("offline").into();
        assert!(matches!(catalog_err, CatalogError::Store(_)));
        assert_eq!(catalog_err.to_string(), "catalog store unavailable: offline");
    }
}
