//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Fixed-Point Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.15 + 0.15 + 0.15 = 0.44999999999999996  ❌ WRONG!                  │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    0.15 + 0.15 + 0.15 = 0.45 exactly                                    │
//! │    Full precision is kept while summing lines; amounts are only        │
//! │    quantized (2 dp, half away from zero) at presentation and commit.   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use depot_core::money::Money;
//!
//! let bottle = Money::parse("1.15").unwrap();
//! let line = bottle * 3;
//! assert_eq!(line.to_string(), "3.45");
//!
//! // Empties are credits: negative amounts
//! let credit = -Money::parse("5.00").unwrap();
//! assert!(credit.is_negative());
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::error::MoneyError;
use crate::CURRENCY_SCALE;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the store currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: Negative values model credits for returned empties
/// - **Single field tuple struct**: Zero-cost abstraction over `Decimal`
/// - **Serialized as a string**: `"51.00"`, never a JSON float
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  store text ──► Money::parse ──► CatalogEntry.unit_total_price          │
/// │                                        │                                │
/// │                                        ▼                                │
/// │                          CartLine.unit_total_price × quantity           │
/// │                                        │                                │
/// │                                        ▼                                │
/// │            Cart::compute_total (quantized) ──► Transaction.total        │
/// │                                        │                                │
/// │                                        ▼                                │
/// │                         CashLedger::increment_balance                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor_units(1050).to_string(), "10.50");
    /// assert_eq!(Money::from_minor_units(-15).to_string(), "-0.15");
    /// ```
    #[inline]
    pub fn from_minor_units(cents: i64) -> Self {
        Money(Decimal::new(cents, CURRENCY_SCALE))
    }

    /// Parses an amount as stored in the catalog (`"12.00"`, `"0.15"`).
    ///
    /// Surrounding whitespace is ignored. The parse is exact: inputs that
    /// cannot be represented without rounding are rejected.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        Decimal::from_str_exact(input.trim())
            .map(Money)
            .map_err(|_| MoneyError::InvalidFormat {
                input: input.to_string(),
            })
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Rounds to two fraction digits, exact halves away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::money::Money;
    ///
    /// assert_eq!(Money::parse("1.005").unwrap().quantize(), Money::parse("1.01").unwrap());
    /// assert_eq!(Money::parse("-1.005").unwrap().quantize(), Money::parse("-1.01").unwrap());
    /// assert_eq!(Money::parse("1.004").unwrap().quantize(), Money::parse("1.00").unwrap());
    /// ```
    pub fn quantize(&self) -> Money {
        let mut rounded = self
            .0
            .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(CURRENCY_SCALE);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        Money(rounded)
    }

    /// Returns the amount in minor units (cents).
    ///
    /// Returns `None` if the amount carries more than two fraction digits
    /// (quantize first) or does not fit in an `i64`.
    pub fn to_minor_units(&self) -> Option<i64> {
        if self.0.normalize().scale() > CURRENCY_SCALE {
            return None;
        }
        self.0.checked_mul(Decimal::ONE_HUNDRED)?.trunc().to_i64()
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    pub fn checked_times(&self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (a credit).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Money {
        Money(self.0.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Always two fraction digits, no currency symbol.
///
/// The terminal adds the currency code from its configuration.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.quantize().0, f)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
