//! # Seed Data Generator
//!
//! Populates a ledger with demo data for development.
//!
//! ## Usage
//! ```bash
//! # 30 days of history (default)
//! cargo run -p stockbook-db --bin seed
//!
//! # Longer history
//! cargo run -p stockbook-db --bin seed -- --days 90
//!
//! # Specify database path
//! cargo run -p stockbook-db --bin seed -- --db ./data/stockbook.db
//! ```
//!
//! ## Generated Data
//! - Products across Rings, Watches, Glasses and Bracelets, each with
//!   opening stock, cost and sale price
//! - A restock purchase every few days per product
//! - Daily sales, sometimes beyond stock on hand (oversell)
//! - Weekly rent and occasional supplies expenses
//!
//! Values are derived from the product and day index, so two runs on the
//! same day produce the same ledger.

use chrono::{Duration, Local, NaiveDate};
use std::env;
use stockbook_core::{NewExpense, NewPurchase, NewSale, Product, ProductUpsert};
use stockbook_db::{Database, DbConfig};

/// Demo catalogue: (category, [(name, cost_cents, price_cents)])
const CATALOGUE: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "Rings",
        &[
            ("Silver Band", 1800, 4500),
            ("Gold Band", 9500, 22000),
            ("Signet Ring", 4200, 9900),
            ("Stacking Ring", 900, 2500),
        ],
    ),
    (
        "Watches",
        &[
            ("Field Watch", 6500, 14900),
            ("Dress Watch", 12000, 29900),
            ("Dive Watch", 15500, 34900),
        ],
    ),
    (
        "Glasses",
        &[
            ("Aviator Sunglasses", 2200, 5900),
            ("Round Frames", 1700, 4900),
            ("Reading Glasses", 600, 1900),
        ],
    ),
    (
        "Bracelets",
        &[
            ("Leather Cuff", 1100, 3200),
            ("Chain Bracelet", 2600, 6900),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 30;
    let mut db_path = String::from("./stockbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of history to generate (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let days = days.clamp(1, 3650);
    let today = Local::now().date_naive();
    let first_day = today - Duration::days(days - 1);

    println!("🌱 Stockbook Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("History:  {} days ({} .. {})", days, first_day, today);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Run `stockbook reset --yes` or delete the file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Products
    println!();
    println!("Creating products...");

    let mut products: Vec<Product> = Vec::new();
    for (category, items) in CATALOGUE {
        for (name, cost_cents, price_cents) in items.iter() {
            let opening = 4 + (products.len() as i64 * 3) % 9;
            let product = db
                .products()
                .upsert(
                    ProductUpsert::named(*name)
                        .category(*category)
                        .stock(opening, *cost_cents)
                        .sale_price(*price_cents),
                )
                .await?;
            products.push(product);
        }
    }
    println!("  Created {} products", products.len());

    // History
    println!();
    println!("Posting history...");

    let mut purchases = 0;
    let mut sales = 0;
    let mut expenses = 0;

    for day_idx in 0..days {
        let date = first_day + Duration::days(day_idx);
        let seed = day_idx as usize;

        for (idx, product) in products.iter().enumerate() {
            let mix = seed * 31 + idx * 17;

            if mix % 7 == 0 {
                // Restock at a cost that drifts ±10% around the opening cost
                let drift = (mix % 21) as i64 - 10;
                let unit_cost_cents = product.unit_cost_cents as i64 * (100 + drift) / 100;
                db.purchases()
                    .record(NewPurchase {
                        product_id: product.id,
                        quantity: 2 + (mix % 5) as i64,
                        unit_cost_cents,
                        date,
                    })
                    .await?;
                purchases += 1;
            }

            if mix % 3 == 0 {
                // Occasional 10% discount off list price
                let discount = if mix % 4 == 0 { 90 } else { 100 };
                db.sales()
                    .record(NewSale {
                        product_id: product.id,
                        quantity: 1 + (mix % 3) as i64,
                        unit_price_cents: product.sale_price_cents * discount / 100,
                        date,
                    })
                    .await?;
                sales += 1;
            }
        }

        if day_idx % 7 == 0 {
            db.expenses()
                .record(expense(date, "Rent", 35000, Some("Weekly stall rent")))
                .await?;
            expenses += 1;
        }
        if seed % 5 == 2 {
            db.expenses()
                .record(expense(date, "Supplies", 800 + (seed as i64 % 4) * 250, None))
                .await?;
            expenses += 1;
        }
    }

    let elapsed = start.elapsed();
    println!("  Purchases: {}", purchases);
    println!("  Sales:     {}", sales);
    println!("  Expenses:  {}", expenses);
    println!();
    println!("✓ Seeded in {:?}", elapsed);

    // Verify with a report over the generated range
    let report = db.reports().compute(first_day, today).await?;
    println!();
    println!("Report {} .. {}", report.from, report.to);
    println!("  Revenue:    {}", report.revenue());
    println!("  COGS:       {}", report.cost_of_goods_sold());
    println!("  Expenses:   {}", report.total_expenses());
    println!("  Net profit: {}", report.net_profit());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn expense(date: NaiveDate, kind: &str, amount_cents: i64, description: Option<&str>) -> NewExpense {
    NewExpense {
        kind: kind.to_string(),
        amount_cents,
        description: description.map(str::to_string),
        date,
    }
}
