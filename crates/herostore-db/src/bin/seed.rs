//! # Seed Data Generator
//!
//! Populates the database with the demo hero-merchandise catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./herostore_dev.db
//! cargo run -p herostore-db --bin seed
//!
//! # Specify database path
//! cargo run -p herostore-db --bin seed -- --db ./data/herostore.db
//! ```
//!
//! Product 1 is always "Iron Man Cup" at 25.00 with 10 in stock. One item
//! starts sold out so `products unavailable` has something to show, and one
//! carries a three-decimal price.

use std::env;

use herostore_core::{Product, ProductId, ProductType, ProductTypeId};
use herostore_db::{Database, DbConfig};
use rust_decimal::Decimal;

/// (id, name)
const PRODUCT_TYPES: &[(i64, &str)] = &[
    (1, "Mugs & Cups"),
    (2, "Replicas"),
    (3, "Posters"),
    (4, "Costumes"),
    (5, "Figures"),
    (6, "Accessories"),
];

/// (id, name, product type id, stock, price in thousandths)
const CATALOG: &[(i64, &str, i64, i64, i64)] = &[
    (1, "Iron Man Cup", 1, 10, 25_000),
    (2, "Captain America Shield Replica", 2, 3, 99_900),
    (3, "Hulk Mug", 1, 0, 12_500),
    (4, "Black Widow Poster", 3, 25, 8_990),
    (5, "Spider-Man Mask", 4, 12, 19_990),
    (6, "Black Panther Figure", 5, 6, 34_500),
    (7, "Thor Hammer Keychain", 6, 40, 15_255),
    (8, "Doctor Strange Amulet", 6, 8, 22_750),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./herostore_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Hero Store Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./herostore_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Hero Store Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut types = Vec::with_capacity(PRODUCT_TYPES.len());
    for &(id, name) in PRODUCT_TYPES {
        let product_type = ProductType::new(ProductTypeId::new(id), name)?;
        db.product_types().insert(&product_type).await?;
        types.push(product_type);
    }
    println!("✓ Inserted {} product types", types.len());

    let mut generated = 0;
    for &(id, name, type_id, stock, price_thousandths) in CATALOG {
        let Some(product_type) = types.iter().find(|t| t.id().value() == type_id).cloned() else {
            eprintln!("Skipping {}: no product type {}", name, type_id);
            continue;
        };
        let product = Product::new(
            ProductId::new(id),
            name,
            product_type,
            stock,
            Decimal::new(price_thousandths, 3),
        )?;

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }
        generated += 1;
    }

    println!();
    println!("✓ Inserted {} products", generated);
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
