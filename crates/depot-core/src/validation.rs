//! # Validation Module
//!
//! Numeric entry parsing for the operator's input buffer.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Keymap (terminal)                                            │
//! │  └── Only digits and '-' ever reach the entry buffer                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── parse_entry:        empty? integer?                               │
//! │  ├── validate_selection: 1 ≤ n ≤ list length                           │
//! │  └── validate_quantity:  n > 0                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart engine                                                  │
//! │  ├── NonPositiveQuantity (second line of defence)                      │
//! │  └── QuantityOverflow on merge                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use depot_core::validation::{parse_entry, validate_quantity, validate_selection};
//!
//! let n = parse_entry("2").unwrap();
//! assert_eq!(validate_selection(n, 3).unwrap(), 1); // zero-based index
//! assert!(validate_quantity(parse_entry("0").unwrap()).is_err());
//! ```

use crate::error::InputError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, InputError>;

// =============================================================================
// Entry Parsing
// =============================================================================

/// Parses the entry buffer as a signed integer.
///
/// ## Rules
/// - Empty buffer → `EmptyInput`
/// - Anything `i64` cannot hold (letters, a lone `-`, huge numbers) →
///   `InvalidNumber`
///
/// ## Example
/// ```rust
/// use depot_core::validation::parse_entry;
/// use depot_core::InputError;
///
/// assert_eq!(parse_entry("42"), Ok(42));
/// assert_eq!(parse_entry("-3"), Ok(-3));
/// assert_eq!(parse_entry(""), Err(InputError::EmptyInput));
/// assert!(matches!(parse_entry("4-2"), Err(InputError::InvalidNumber { .. })));
/// ```
pub fn parse_entry(buffer: &str) -> ValidationResult<i64> {
    if buffer.is_empty() {
        return Err(InputError::EmptyInput);
    }

    buffer.parse::<i64>().map_err(|_| InputError::InvalidNumber {
        input: buffer.to_string(),
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a 1-based item number against a list of `len` entries.
///
/// Returns the zero-based index on success.
pub fn validate_selection(value: i64, len: usize) -> ValidationResult<usize> {
    if value < 1 || value as u64 > len as u64 {
        return Err(InputError::OutOfRange { value, max: len });
    }

    Ok((value - 1) as usize)
}

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - No upper bound here; the cart rejects a merge that would overflow
pub fn validate_quantity(value: i64) -> ValidationResult<i64> {
    if value <= 0 {
        return Err(InputError::NonPositiveQuantity { value });
    }

    Ok(value)
}

// =============================================================================
// Unit Tests
// =============================================================================
