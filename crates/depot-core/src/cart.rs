//! # Cart Engine
//!
//! Holds the in-progress transaction: one line per display name.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Cart Engine                                    │
//! │                                                                         │
//! │  add_or_merge("Cola Crate", 12.00, 5.00, 17.00, 3)                      │
//! │     │                                                                   │
//! │     ├── name absent ──► insert line {qty 3, prices copied}              │
//! │     └── name present                                                    │
//! │           ├── unit total equal ──► qty += 3 (checked)                   │
//! │           └── unit total differs ──► PriceMismatch (cart untouched)     │
//! │                                                                         │
//! │  display_order() ──► ["Cola Crate", "Empty Crate", "Water Bottle"]      │
//! │                           #1            #2             #3               │
//! │                                                                         │
//! │  remove_by_display_index(2, &order) ──► removes "Empty Crate"           │
//! │                                                                         │
//! │  compute_total() = Σ unit_total × qty, quantized once at the end        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Prices are copied into the line when it is first added and are never
//! re-resolved. Reloading the catalog mid-transaction cannot alter an open
//! cart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::money::Money;

/// Result type for cart operations.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Cart Line
// =============================================================================

/// One entry in the active cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Display name, also the cart key.
    pub name: String,

    /// Always positive.
    pub quantity: i64,

    /// Price without deposit (credit value for empties).
    pub unit_base_price: Money,

    /// Refundable deposit, zero for empties.
    pub unit_deposit: Money,

    /// What one unit adds to the total. Negative for empties.
    pub unit_total_price: Money,
}

impl CartLine {
    /// `unit_total_price × quantity`, full precision.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_total_price * self.quantity
    }
}

// =============================================================================
// Display Order
// =============================================================================

/// Snapshot of the cart's line names sorted ascending.
///
/// Item numbers shown to the operator are 1-based positions in this list.
/// Take a fresh snapshot right before resolving a removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOrder(Vec<String>);

impl DisplayOrder {
    /// Number of names in the snapshot.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name at a 1-based position.
    pub fn name_at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.0.get(i))
            .map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }
}

/// A cart row prepared for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    /// 1-based item number, as used by remove-item.
    pub index: usize,
    pub name: String,
    pub quantity: i64,
    pub unit_total_price: Money,
    pub line_total: Money,
}

// =============================================================================
// Cart
// =============================================================================

/// The active cart.
///
/// Lines are kept in a `BTreeMap` so iteration is already in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<String, CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` units of `name`, merging with an existing line.
    ///
    /// ## Errors
    /// - `NonPositiveQuantity` if `quantity <= 0`
    /// - `PriceMismatch` if the line exists with a different unit total
    /// - `QuantityOverflow` if the merged quantity, its line total or the
    ///   cart's grand total does not fit
    ///
    /// On error the cart is unchanged. Returns the line's new quantity.
    pub fn add_or_merge(
        &mut self,
        name: &str,
        unit_base_price: Money,
        unit_deposit: Money,
        unit_total_price: Money,
        quantity: i64,
    ) -> CartResult<i64> {
        if quantity <= 0 {
            return Err(CartError::NonPositiveQuantity {
                name: name.to_string(),
                quantity,
            });
        }

        let overflow = || CartError::QuantityOverflow {
            name: name.to_string(),
        };

        match self.lines.get(name) {
            Some(line) => {
                if line.unit_total_price != unit_total_price {
                    return Err(CartError::PriceMismatch {
                        name: name.to_string(),
                        existing: line.unit_total_price,
                        incoming: unit_total_price,
                    });
                }

                let merged = line.quantity.checked_add(quantity).ok_or_else(overflow)?;
                let line_total = line
                    .unit_total_price
                    .checked_times(merged)
                    .ok_or_else(overflow)?;
                self.total_with(name, line_total).ok_or_else(overflow)?;

                if let Some(line) = self.lines.get_mut(name) {
                    line.quantity = merged;
                }
                Ok(merged)
            }
            None => {
                let line_total = unit_total_price
                    .checked_times(quantity)
                    .ok_or_else(overflow)?;
                self.total_with(name, line_total).ok_or_else(overflow)?;

                self.lines.insert(
                    name.to_string(),
                    CartLine {
                        name: name.to_string(),
                        quantity,
                        unit_base_price,
                        unit_deposit,
                        unit_total_price,
                    },
                );
                Ok(quantity)
            }
        }
    }

    /// Removes the line numbered `index` (1-based) in `order`.
    ///
    /// ## Errors
    /// - `IndexOutOfRange` if `index` is outside `[1, order.len()]`
    /// - `InconsistentState` if the name at `index` is not in the cart
    pub fn remove_by_display_index(
        &mut self,
        index: i64,
        order: &DisplayOrder,
    ) -> CartResult<CartLine> {
        let name = usize::try_from(index)
            .ok()
            .and_then(|position| order.name_at(position))
            .ok_or(CartError::IndexOutOfRange {
                index,
                len: order.len(),
            })?;

        self.lines
            .remove(name)
            .ok_or_else(|| CartError::InconsistentState {
                name: name.to_string(),
            })
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Grand total, quantized to two decimals (half away from zero).
    pub fn compute_total(&self) -> Money {
        self.lines
            .values()
            .map(CartLine::line_total)
            .sum::<Money>()
            .quantize()
    }

    /// Grand total with `name`'s line replaced by `line_total`, or `None`
    /// if the sum does not fit.
    fn total_with(&self, name: &str, line_total: Money) -> Option<Money> {
        self.lines
            .values()
            .filter(|line| line.name != name)
            .try_fold(line_total, |acc, line| acc.checked_add(line.line_total()))
    }

    /// Line names in display order.
    pub fn display_order(&self) -> DisplayOrder {
        DisplayOrder(self.lines.keys().cloned().collect())
    }

    /// Rendering rows in display order.
    pub fn display_lines(&self) -> Vec<DisplayLine> {
        self.lines
            .values()
            .enumerate()
            .map(|(i, line)| DisplayLine {
                index: i + 1,
                name: line.name.clone(),
                quantity: line.quantity,
                unit_total_price: line.unit_total_price,
                line_total: line.line_total(),
            })
            .collect()
    }

    /// Lines in display order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn get(&self, name: &str) -> Option<&CartLine> {
        self.lines.get(name)
    }

    /// Sum of all line quantities (credits included).
    pub fn total_quantity(&self) -> i64 {
        self.lines
            .values()
            .fold(0i64, |acc, l| acc.saturating_add(l.quantity))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
