//! # Catalog Loader
//!
//! Turns raw product and empty definitions into the three numbered
//! selection lists the operator picks from.
//!
//! ## Derivation
//! ```text
//! ProductDefinition "Cola" {crate 12.00 + 5.00, bottle 1.00 + 0.15}
//!      │
//!      ├──► CatalogEntry "Cola Crate"   base 12.00  deposit 5.00  total 17.00
//!      └──► CatalogEntry "Cola Bottle"  base  1.00  deposit 0.15  total  1.15
//!
//! EmptyDefinition "Empty Crate" {deposit_value 5.00}
//!      │
//!      └──► CatalogEntry "Empty Crate"  base  5.00  deposit 0.00  total -5.00
//! ```
//!
//! A product whose price and deposit are both zero for a category is not
//! sold that way and gets no entry in that list.
//!
//! ## Field Policy
//! | Field is...  | `Strict` (startup)      | `Lenient` (reload)  |
//! |--------------|-------------------------|---------------------|
//! | missing      | `MissingField` (fatal)  | zero + warning      |
//! | malformed    | zero + warning          | zero + warning      |
//! | negative     | zero + warning          | zero + warning      |
//! | sub-cent     | zero + warning          | zero + warning      |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::money::Money;
use crate::store::{CatalogSource, EmptyDefinition, ProductDefinition};

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

// =============================================================================
// Category
// =============================================================================

/// Which list a catalog entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crate,
    Bottle,
    /// Returned containers, credited to the customer.
    Empty,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Crate, Category::Bottle, Category::Empty];

    /// Heading used in prompts and list titles.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Crate => "Crate",
            Category::Bottle => "Bottle",
            Category::Empty => "Empty",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How to treat missing amount fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// A missing field aborts the load.
    Strict,
    /// A missing field becomes zero.
    Lenient,
}

// =============================================================================
// Catalog Entry
// =============================================================================

/// One purchasable or returnable line type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub category: Category,
    pub display_name: String,
    pub unit_base_price: Money,
    pub unit_deposit: Money,
    /// Base plus deposit for crates and bottles, minus the credit for empties.
    pub unit_total_price: Money,
}

impl CatalogEntry {
    /// A sellable entry: total is base plus deposit.
    pub fn sellable(
        category: Category,
        display_name: impl Into<String>,
        base: Money,
        deposit: Money,
    ) -> Self {
        CatalogEntry {
            category,
            display_name: display_name.into(),
            unit_base_price: base,
            unit_deposit: deposit,
            unit_total_price: base + deposit,
        }
    }

    /// A returnable empty: total is the negated credit.
    pub fn returnable(display_name: impl Into<String>, credit: Money) -> Self {
        CatalogEntry {
            category: Category::Empty,
            display_name: display_name.into(),
            unit_base_price: credit,
            unit_deposit: Money::ZERO,
            unit_total_price: -credit,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The three selection lists, each sorted by display name.
///
/// Immutable once built. Reloading replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    crates: Vec<CatalogEntry>,
    bottles: Vec<CatalogEntry>,
    empties: Vec<CatalogEntry>,
}

impl Catalog {
    /// Reads definitions from `source` and builds the lists.
    pub async fn load<S>(source: &S, policy: FieldPolicy) -> CatalogResult<Catalog>
    where
        S: CatalogSource + ?Sized,
    {
        let products = source.product_definitions().await?;
        let empties = source.empty_definitions().await?;

        let catalog = Catalog::build(&products, &empties, policy)?;
        debug!(
            crates = catalog.crates.len(),
            bottles = catalog.bottles.len(),
            empties = catalog.empties.len(),
            ?policy,
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Builds the lists from raw definitions.
    pub fn build(
        products: &[ProductDefinition],
        empties: &[EmptyDefinition],
        policy: FieldPolicy,
    ) -> CatalogResult<Catalog> {
        let mut crates = Vec::new();
        let mut bottles = Vec::new();

        for product in products {
            let record = product.name.as_str();
            let crate_price = resolve_amount(record, "crate_price", &product.crate_price, policy)?;
            let crate_deposit =
                resolve_amount(record, "crate_deposit", &product.crate_deposit, policy)?;
            let bottle_price =
                resolve_amount(record, "bottle_price", &product.bottle_price, policy)?;
            let bottle_deposit =
                resolve_amount(record, "bottle_deposit", &product.bottle_deposit, policy)?;

            if crate_price.is_zero() && crate_deposit.is_zero() {
                debug!(
                    product = record,
                    category = %Category::Crate,
                    "Zero price and deposit, not offered"
                );
            } else {
                crates.push(CatalogEntry::sellable(
                    Category::Crate,
                    format!("{} Crate", product.name),
                    crate_price,
                    crate_deposit,
                ));
            }
            if bottle_price.is_zero() && bottle_deposit.is_zero() {
                debug!(
                    product = record,
                    category = %Category::Bottle,
                    "Zero price and deposit, not offered"
                );
            } else {
                bottles.push(CatalogEntry::sellable(
                    Category::Bottle,
                    format!("{} Bottle", product.name),
                    bottle_price,
                    bottle_deposit,
                ));
            }
        }

        let mut returnables = Vec::with_capacity(empties.len());
        for empty in empties {
            let credit =
                resolve_amount(&empty.name, "deposit_value", &empty.deposit_value, policy)?;
            returnables.push(CatalogEntry::returnable(empty.name.clone(), credit));
        }

        Ok(Catalog {
            crates: sorted_unique(crates)?,
            bottles: sorted_unique(bottles)?,
            empties: sorted_unique(returnables)?,
        })
    }

    /// The list for one category.
    pub fn entries(&self, category: Category) -> &[CatalogEntry] {
        match category {
            Category::Crate => &self.crates,
            Category::Bottle => &self.bottles,
            Category::Empty => &self.empties,
        }
    }

    /// Entry at a zero-based index.
    pub fn entry(&self, category: Category, index: usize) -> Option<&CatalogEntry> {
        self.entries(category).get(index)
    }

    pub fn crates(&self) -> &[CatalogEntry] {
        &self.crates
    }

    pub fn bottles(&self) -> &[CatalogEntry] {
        &self.bottles
    }

    pub fn empties(&self) -> &[CatalogEntry] {
        &self.empties
    }

    /// Total number of entries across all lists.
    pub fn len(&self) -> usize {
        self.crates.len() + self.bottles.len() + self.empties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn resolve_amount(
    record: &str,
    field: &'static str,
    value: &Option<String>,
    policy: FieldPolicy,
) -> CatalogResult<Money> {
    let Some(text) = value else {
        return match policy {
            FieldPolicy::Strict => Err(CatalogError::MissingField {
                record: record.to_string(),
                field,
            }),
            FieldPolicy::Lenient => {
                warn!(record, field, "Catalog field missing, using 0.00");
                Ok(Money::ZERO)
            }
        };
    };

    match Money::parse(text) {
        Ok(amount) if amount.is_negative() => {
            warn!(record, field, value = %text, "Negative catalog amount, using 0.00");
            Ok(Money::ZERO)
        }
        // Stored amounts are whole cents.
        Ok(amount) if amount.to_minor_units().is_none() => {
            warn!(record, field, value = %text, "Catalog amount is not in whole cents, using 0.00");
            Ok(Money::ZERO)
        }
        Ok(amount) => Ok(amount),
        Err(_) => {
            warn!(record, field, value = %text, "Malformed catalog amount, using 0.00");
            Ok(Money::ZERO)
        }
    }
}

fn sorted_unique(mut entries: Vec<CatalogEntry>) -> CatalogResult<Vec<CatalogEntry>> {
    entries.sort_by(|a, b| a.display_name.cmp(&b.display_name));

    if let Some(pair) = entries
        .windows(2)
        .find(|pair| pair[0].display_name == pair[1].display_name)
    {
        return Err(CatalogError::DuplicateName {
            name: pair[0].display_name.clone(),
        });
    }

    Ok(entries)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    fn product(name: &str, crate_: (&str, &str), bottle: (&str, &str)) -> ProductDefinition {
        ProductDefinition {
            name: name.to_string(),
            crate_price: Some(crate_.0.to_string()),
            crate_deposit: Some(crate_.1.to_string()),
            bottle_price: Some(bottle.0.to_string()),
            bottle_deposit: Some(bottle.1.to_string()),
        }
    }

    fn empty(name: &str, value: &str) -> EmptyDefinition {
        EmptyDefinition {
            name: name.to_string(),
            deposit_value: Some(value.to_string()),
        }
    }

    #[test]
    fn test_derives_totals() {
        let products = vec![product("Cola", ("12.00", "5.00"), ("1.00", "0.15"))];
        let empties = vec![empty("Empty Crate", "5.00")];

        let catalog = Catalog::build(&products, &empties, FieldPolicy::Strict).unwrap();

        let crate_entry = &catalog.crates()[0];
        assert_eq!(crate_entry.display_name, "Cola Crate");
        assert_eq!(crate_entry.unit_total_price.amount(), dec!(17.00));

        let bottle_entry = &catalog.bottles()[0];
        assert_eq!(bottle_entry.display_name, "Cola Bottle");
        assert_eq!(bottle_entry.unit_total_price.amount(), dec!(1.15));

        let empty_entry = &catalog.empties()[0];
        assert_eq!(empty_entry.unit_base_price.amount(), dec!(5.00));
        assert_eq!(empty_entry.unit_deposit, Money::ZERO);
        assert_eq!(empty_entry.unit_total_price.amount(), dec!(-5.00));
    }

    #[test]
    fn test_lists_sorted_by_name() {
        let products = vec![
            product("Water", ("10.00", "5.00"), ("0.80", "0.15")),
            product("Cola", ("12.00", "5.00"), ("1.00", "0.15")),
            product("Juice", ("0", "0"), ("1.50", "0.25")),
        ];
        let empties = vec![
            empty("Empty Crate", "5.00"),
            empty("Empty Bottle (Std)", "0.15"),
            empty("Empty Bottle (Juice)", "0.25"),
        ];

        let catalog = Catalog::build(&products, &empties, FieldPolicy::Strict).unwrap();

        let names = |list: &[CatalogEntry]| {
            list.iter()
                .map(|e| e.display_name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(catalog.crates()), vec!["Cola Crate", "Water Crate"]);
        assert_eq!(
            names(catalog.bottles()),
            vec!["Cola Bottle", "Juice Bottle", "Water Bottle"]
        );
        assert_eq!(
            names(catalog.empties()),
            vec!["Empty Bottle (Juice)", "Empty Bottle (Std)", "Empty Crate"]
        );
        assert_eq!(catalog.len(), 8);
    }

    #[test]
    fn test_strict_missing_field_is_fatal() {
        let mut broken = product("Cola", ("12.00", "5.00"), ("1.00", "0.15"));
        broken.bottle_deposit = None;

        let err = Catalog::build(&[broken], &[], FieldPolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingField { ref record, field: "bottle_deposit" } if record == "Cola"
        ));
    }

    #[test]
    fn test_strict_missing_empty_value_is_fatal() {
        let broken = EmptyDefinition {
            name: "Empty Crate".to_string(),
            deposit_value: None,
        };
        assert!(Catalog::build(&[], &[broken], FieldPolicy::Strict).is_err());
    }

    #[test]
    fn test_lenient_missing_field_is_zero() {
        let mut partial = product("Cola", ("12.00", "5.00"), ("1.00", "0.15"));
        partial.crate_deposit = None;

        let catalog = Catalog::build(&[partial], &[], FieldPolicy::Lenient).unwrap();
        assert_eq!(catalog.crates()[0].unit_total_price.amount(), dec!(12.00));
    }

    #[test]
    fn test_malformed_and_negative_become_zero() {
        let products = vec![product("Cola", ("twelve", "5.00"), ("-1.00", "0.15"))];
        let catalog = Catalog::build(&products, &[], FieldPolicy::Strict).unwrap();

        assert_eq!(catalog.crates()[0].unit_total_price.amount(), dec!(5.00));
        assert_eq!(catalog.bottles()[0].unit_total_price.amount(), dec!(0.15));
    }

    #[test]
    fn test_zero_priced_category_is_omitted() {
        let products = vec![product("Juice", ("0.00", "0"), ("1.50", "0.25"))];
        let catalog = Catalog::build(&products, &[], FieldPolicy::Strict).unwrap();

        assert!(catalog.crates().is_empty());
        assert_eq!(catalog.bottles().len(), 1);
    }

    #[test]
    fn test_sub_cent_amounts_become_zero() {
        let products = vec![product("Straw", ("12.00", "5.005"), ("0.333", "0.15"))];
        let empties = vec![empty("Empty Crate", "5.001")];

        for policy in [FieldPolicy::Strict, FieldPolicy::Lenient] {
            let catalog = Catalog::build(&products, &empties, policy).unwrap();

            assert_eq!(catalog.crates()[0].unit_deposit, Money::ZERO);
            assert_eq!(catalog.crates()[0].unit_total_price.amount(), dec!(12.00));
            assert_eq!(catalog.bottles()[0].unit_base_price, Money::ZERO);
            assert_eq!(catalog.bottles()[0].unit_total_price.amount(), dec!(0.15));
            assert_eq!(catalog.empties()[0].unit_total_price, Money::ZERO);
        }
    }

    #[test]
    fn test_trailing_zeros_are_whole_cents() {
        let products = vec![product("Cola", ("12.0000", "5"), ("1.10", "0.150"))];
        let catalog = Catalog::build(&products, &[], FieldPolicy::Strict).unwrap();

        assert_eq!(catalog.crates()[0].unit_total_price.amount(), dec!(17.00));
        assert_eq!(catalog.bottles()[0].unit_total_price.amount(), dec!(1.25));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let empties = vec![empty("Empty Crate", "5.00"), empty("Empty Crate", "4.00")];
        let err = Catalog::build(&[], &empties, FieldPolicy::Lenient).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName { ref name } if name == "Empty Crate"));
    }

    #[test]
    fn test_entry_lookup() {
        let products = vec![product("Cola", ("12.00", "5.00"), ("1.00", "0.15"))];
        let catalog = Catalog::build(&products, &[], FieldPolicy::Strict).unwrap();

        assert_eq!(
            catalog.entry(Category::Crate, 0).map(|e| e.display_name.as_str()),
            Some("Cola Crate")
        );
        assert!(catalog.entry(Category::Crate, 1).is_none());
        assert!(catalog.entries(Category::Empty).is_empty());
    }

    struct FixedSource {
        fail: bool,
    }

    #[async_trait]
    impl CatalogSource for FixedSource {
        async fn product_definitions(&self) -> Result<Vec<ProductDefinition>, StoreError> {
            if self.fail {
                return Err(StoreError::new("database is locked"));
            }
            Ok(vec![product("Cola", ("12.00", "5.00"), ("1.00", "0.15"))])
        }

        async fn empty_definitions(&self) -> Result<Vec<EmptyDefinition>, StoreError> {
            Ok(vec![empty("Empty Crate", "5.00")])
        }
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let catalog = Catalog::load(&FixedSource { fail: false }, FieldPolicy::Strict)
            .await
            .unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[tokio::test]
    async fn test_load_surfaces_store_failure() {
        let err = Catalog::load(&FixedSource { fail: true }, FieldPolicy::Strict)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Store(_)));
    }
}
