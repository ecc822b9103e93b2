//! # Seed Data
//!
//! Populates the database with the demo beverage catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./depot.db (default)
//! cargo run -p depot-db --bin seed
//!
//! # Specify database path
//! cargo run -p depot-db --bin seed -- --db ./data/depot.db
//!
//! # Wipe the catalog and reset cash to the opening balance first
//! cargo run -p depot-db --bin seed -- --reset
//! ```
//!
//! Products and empties are only inserted into empty tables, so running the
//! seed twice is harmless. The transaction log is never touched.

use std::env;

use depot_core::{EmptyDefinition, Money, ProductDefinition};
use depot_db::{Database, DbConfig};

/// Opening cash balance in cents.
const OPENING_BALANCE_CENTS: i64 = 10_000;

/// (name, crate price, crate deposit, bottle price, bottle deposit)
const PRODUCTS: &[(&str, &str, &str, &str, &str)] = &[
    ("Cola", "12.00", "5.00", "1.00", "0.15"),
    ("Water", "10.00", "5.00", "0.80", "0.15"),
    ("Juice", "0.00", "0.00", "1.50", "0.25"),
];

/// (name, deposit value)
const EMPTIES: &[(&str, &str)] = &[
    ("Empty Crate", "5.00"),
    ("Empty Bottle (Std)", "0.15"),
    ("Empty Bottle (Juice)", "0.25"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./depot.db");
    let mut reset = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--reset" | "-r" => reset = true,
            "--help" | "-h" => {
                println!("Depot POS Seed Data");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./depot.db)");
                println!("  -r, --reset        Delete the catalog and reset cash before seeding");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Depot POS Seed Data");
    println!("===================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let catalog = db.catalog();
    let cash = db.cash();
    let opening = Money::from_minor_units(OPENING_BALANCE_CENTS);

    if reset {
        catalog.clear().await?;
        cash.set_balance(opening).await?;
        println!("✓ Catalog cleared, cash reset to {}", opening);
    }

    // Products
    let existing = catalog.count_products().await?;
    if existing > 0 {
        println!("⚠ {} products already present, skipping", existing);
    } else {
        for (name, crate_price, crate_deposit, bottle_price, bottle_deposit) in PRODUCTS {
            let product = ProductDefinition {
                name: name.to_string(),
                crate_price: Some(crate_price.to_string()),
                crate_deposit: Some(crate_deposit.to_string()),
                bottle_price: Some(bottle_price.to_string()),
                bottle_deposit: Some(bottle_deposit.to_string()),
            };
            catalog.insert_product(&product).await?;
        }
        println!("✓ Inserted {} products", PRODUCTS.len());
    }

    // Empties
    let existing = catalog.count_empties().await?;
    if existing > 0 {
        println!("⚠ {} empties already present, skipping", existing);
    } else {
        for (name, deposit_value) in EMPTIES {
            let empty = EmptyDefinition {
                name: name.to_string(),
                deposit_value: Some(deposit_value.to_string()),
            };
            catalog.insert_empty(&empty).await?;
        }
        println!("✓ Inserted {} empties", EMPTIES.len());
    }

    let balance = cash.ensure_initialized(opening).await?;
    println!("✓ Cash on hand: {}", balance);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
