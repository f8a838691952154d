//! # Seed Data Generator
//!
//! Populates the database with a small, deterministic storefront for
//! development and for trying the reports.
//!
//! ## Usage
//! ```bash
//! # 25 users (default), connection from PG* / DATABASE_URL
//! cargo run -p storefront-db --bin seed
//!
//! # Custom amount
//! cargo run -p storefront-db --bin seed -- --users 100
//! ```
//!
//! ## Generated Data
//! - 4 categories, 4 brands
//! - 5 products per category, brands cycled, a few inactive or imageless
//!   (one without category or brand, so the ROLLUP reports show
//!   `Uncategorized` / `Unbranded`)
//! - N users, alternating `example.com` / `gmail.com` addresses
//! - 0-3 orders per user with 1-3 lines each, plus a payment for paid orders
//!
//! Running it against a database that already has products does nothing.

use std::env;
use std::time::Instant;

use rust_decimal::Decimal;
use storefront_core::{
    BaseFilterOptions, Brand, Category, NewBrand, NewCategory, NewOrder, NewOrderItem, NewPayment,
    NewProduct, NewUser, Order, OrderItem, Payment, ProductFilterOptions,
};
use storefront_db::{Database, DbConfig};

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Electronics",
        &["Wireless Mouse", "USB-C Hub", "Mechanical Keyboard", "27in Monitor", "Webcam"],
    ),
    (
        "Books",
        &["Rust in Action", "SQL Cookbook", "The Pragmatic Programmer", "Refactoring", "Clean Architecture"],
    ),
    (
        "Home",
        &["Desk Lamp", "Coffee Grinder", "French Press", "Throw Blanket", "Plant Pot"],
    ),
    (
        "Toys",
        &["Puzzle 1000pc", "Building Blocks", "Chess Set", "Yo-Yo", "Kite"],
    ),
];

const BRANDS: &[&str] = &["Acme", "Globex", "Initech", "Umbrella"];

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Chiara", "Dmitri", "Esther", "Farid", "Grace", "Hiro", "Ines", "Jonas",
];

const LAST_NAMES: &[&str] = &[
    "Nguyen", "Okafor", "Rossi", "Schmidt", "Tanaka", "Silva", "Kowalski", "Haddad",
];

const STATUSES: &[&str] = &["pending", "paid", "shipped", "cancelled"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut user_count: usize = 25;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--users" | "-u" => {
                if i + 1 < args.len() {
                    user_count = args[i + 1].parse().unwrap_or(25);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -u, --users <N>    Number of users to generate (default: 25)");
                println!("  -h, --help         Show this help message");
                println!();
                println!("Connection: DATABASE_URL, or PGHOST/PGPORT/PGUSER/PGPASSWORD/PGDATABASE");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Storefront Seed Data Generator");
    println!("=================================");

    let config = DbConfig::from_env()?;
    println!("Database: {}", config.redacted_target());
    println!("Users:    {}", user_count);
    println!();

    let db = Database::new(config).await?;
    println!("✓ Connected to database");
    println!("✓ Schema ready");

    let probe = ProductFilterOptions {
        base: BaseFilterOptions {
            limit: Some(1),
            ..Default::default()
        },
        ..Default::default()
    };
    let existing = db.products().filter(&probe).await?.total;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let start = Instant::now();

    // Categories and brands
    let categories: Vec<NewCategory> = CATEGORIES
        .iter()
        .map(|(name, _)| NewCategory {
            name: name.to_string(),
            description: Some(format!("All things {}", name.to_lowercase())),
        })
        .collect();
    let category_ids = db.create_many::<Category>(&categories).await?;

    let brands: Vec<NewBrand> = BRANDS
        .iter()
        .map(|name| NewBrand {
            name: name.to_string(),
            description: None,
        })
        .collect();
    let brand_ids = db.create_many::<Brand>(&brands).await?;
    println!("✓ {} categories, {} brands", category_ids.len(), brand_ids.len());

    // Products
    let mut products = Vec::new();
    for (category_idx, (_, names)) in CATEGORIES.iter().enumerate() {
        for (product_idx, name) in names.iter().enumerate() {
            let seed = category_idx * 10 + product_idx;
            products.push(generate_product(
                name,
                seed,
                Some(category_ids[category_idx]),
                Some(brand_ids[seed % brand_ids.len()]),
            ));
        }
    }
    products.push(generate_product("Mystery Box", 99, None, None));
    let product_ids = db.products().insert_many(&products).await?;
    println!("✓ {} products", product_ids.len());

    // Users
    let users: Vec<NewUser> = (0..user_count).map(generate_user).collect();
    let user_ids = db.users().insert_many(&users).await?;
    println!("✓ {} users", user_ids.len());

    // Orders, lines, payments
    let mut order_count = 0;
    let mut line_count = 0;
    for (user_idx, user_id) in user_ids.iter().enumerate() {
        for order_idx in 0..(user_idx % 4) {
            let seed = user_idx * 7 + order_idx;
            let status = STATUSES[seed % STATUSES.len()];

            let lines: Vec<(i32, i32, Decimal)> = (0..1 + seed % 3)
                .map(|line| {
                    let product_idx = (seed * 3 + line * 5) % product_ids.len();
                    let quantity = 1 + ((seed + line) % 4) as i32;
                    (product_ids[product_idx], quantity, products[product_idx].price)
                })
                .collect();

            let total: Decimal = lines
                .iter()
                .map(|(_, quantity, price)| Decimal::from(*quantity) * *price)
                .sum();

            let order_id = db
                .create::<Order>(&NewOrder {
                    user_id: Some(*user_id),
                    total_amount: total,
                    status: status.to_string(),
                })
                .await?;
            order_count += 1;

            let items: Vec<NewOrderItem> = lines
                .into_iter()
                .map(|(product_id, quantity, price)| NewOrderItem {
                    order_id,
                    product_id,
                    quantity,
                    price,
                })
                .collect();
            line_count += db.create_many::<OrderItem>(&items).await?.len();

            if status == "paid" || status == "shipped" {
                db.create::<Payment>(&NewPayment {
                    order_id,
                    amount: total,
                    method: if seed % 2 == 0 { "card" } else { "transfer" }.to_string(),
                    status: "completed".to_string(),
                    paid_at: Some(chrono::Utc::now()),
                })
                .await?;
            }
        }
    }
    println!("✓ {} orders, {} order lines", order_count, line_count);

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    db.close().await;
    Ok(())
}

/// Generates a product with deterministic price and stock.
fn generate_product(
    name: &str,
    seed: usize,
    category_id: Option<i32>,
    brand_id: Option<i32>,
) -> NewProduct {
    // $4.99 - $104.99
    let price = Decimal::new(499 + ((seed * 1_337) % 10_000) as i64, 2);

    let prefix: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_uppercase();

    NewProduct {
        product_name: name.to_string(),
        description: Some(format!("{} for everyday use", name)),
        price,
        stock_quantity: ((seed * 13) % 60) as i32,
        category_id,
        brand_id,
        sku: Some(format!("{}-{:03}", prefix, seed)),
        image_url: (seed % 3 != 0).then(|| format!("https://img.example.com/{}.jpg", seed)),
        is_active: seed % 7 != 6,
    }
}

fn generate_user(index: usize) -> NewUser {
    let first = FIRST_NAMES[index % FIRST_NAMES.len()];
    let last = LAST_NAMES[(index / FIRST_NAMES.len() + index) % LAST_NAMES.len()];
    let domain = if index % 2 == 0 { "example.com" } else { "gmail.com" };

    NewUser {
        fullname: format!("{} {}", first, last),
        email: format!(
            "{}.{}{}@{}",
            first.to_lowercase(),
            last.to_lowercase(),
            index,
            domain
        ),
        phone: 5_550_000_000 + index as i64,
        address: format!("{} Market Street", 100 + index),
    }
}
