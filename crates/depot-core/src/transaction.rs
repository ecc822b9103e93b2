//! # Transaction Records
//!
//! The immutable snapshot written when a cart is finished.
//!
//! ## Dual-Key Identity
//! - `id`: UUID v4, generated when the snapshot is taken
//! - `created_at`: human-facing ordering key
//!
//! ## Snapshot Pattern
//! Lines copy name, quantity and unit prices out of the cart, so the record
//! reads the same no matter what the catalog looks like later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::Cart;
use crate::money::Money;

// =============================================================================
// Transaction Line
// =============================================================================

/// One line of a finished transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLine {
    /// 0-based position in display order at commit time.
    pub position: u32,
    pub name: String,
    pub quantity: i64,
    pub unit_base_price: Money,
    pub unit_deposit: Money,
    pub unit_total_price: Money,
    pub line_total: Money,
}

// =============================================================================
// Transaction
// =============================================================================

/// A finished sale.
///
/// Fields are private; a transaction is only ever built from a cart and is
/// never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: String,
    created_at: DateTime<Utc>,
    /// Quantized grand total, serialized as a string (`"51.00"`).
    total: Money,
    lines: Vec<TransactionLine>,
}

impl Transaction {
    /// Snapshots `cart` now.
    pub fn from_cart(cart: &Cart) -> Self {
        Transaction::from_cart_at(cart, Utc::now())
    }

    /// Snapshots `cart` with an explicit timestamp.
    pub fn from_cart_at(cart: &Cart, created_at: DateTime<Utc>) -> Self {
        let lines = cart
            .lines()
            .enumerate()
            .map(|(position, line)| TransactionLine {
                position: position as u32,
                name: line.name.clone(),
                quantity: line.quantity,
                unit_base_price: line.unit_base_price,
                unit_deposit: line.unit_deposit,
                unit_total_price: line.unit_total_price,
                line_total: line.line_total(),
            })
            .collect();

        Transaction {
            id: Uuid::new_v4().to_string(),
            created_at,
            total: cart.compute_total(),
            lines,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn lines(&self) -> &[TransactionLine] {
        &self.lines
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_or_merge(
            "Water Bottle",
            Money::new(dec!(0.80)),
            Money::new(dec!(0.15)),
            Money::new(dec!(0.95)),
            6,
        )
        .unwrap();
        cart.add_or_merge(
            "Cola Crate",
            Money::new(dec!(12.00)),
            Money::new(dec!(5.00)),
            Money::new(dec!(17.00)),
            3,
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_snapshot_matches_cart() {
        let cart = sample_cart();
        let tx = Transaction::from_cart(&cart);

        assert_eq!(tx.total(), cart.compute_total());
        assert_eq!(tx.total().to_string(), "56.70");
        assert_eq!(tx.lines().len(), 2);
        assert_eq!(tx.lines()[0].name, "Cola Crate");
        assert_eq!(tx.lines()[0].position, 0);
        assert_eq!(tx.lines()[1].line_total.amount(), dec!(5.70));
        assert!(Uuid::parse_str(tx.id()).is_ok());
    }

    #[test]
    fn test_snapshot_is_detached_from_cart() {
        let mut cart = sample_cart();
        let tx = Transaction::from_cart(&cart);
        cart.clear();

        assert_eq!(tx.lines().len(), 2);
        assert_eq!(tx.total().to_string(), "56.70");
    }

    #[test]
    fn test_ids_are_unique() {
        let cart = sample_cart();
        assert_ne!(
            Transaction::from_cart(&cart).id(),
            Transaction::from_cart(&cart).id()
        );
    }

    #[test]
    fn test_total_serializes_as_string() {
        let tx = Transaction::from_cart(&sample_cart());
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["total"], "56.70");
    }
}
