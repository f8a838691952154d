//! # Schema Definitions
//!
//! Static DDL for the storefront tables.
//!
//! ## Creation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Schema Initialization                              │
//! │                                                                         │
//! │  Database::initialize_schema()                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  users ─┐   categories ─┐   brands ─┐                                  │
//! │         │               └─────┬─────┘                                  │
//! │         │                     ▼                                         │
//! │         │                 products                                      │
//! │         ▼                     │                                         │
//! │      orders ◄─────────────────┤                                         │
//! │         │                     │                                         │
//! │         ├──► order_items ◄────┤                                         │
//! │         │                     │                                         │
//! │         ├──► payments    cart_items ◄── users                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Indexes (IF NOT EXISTS)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Upgrades (users.phone integer → BIGINT, only if still integer)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every statement is idempotent, so running this against an existing
//! database is a no-op. Referencing tables come after the tables they
//! reference, and each statement runs on its own: a failure leaves the
//! tables created so far in place.

use std::time::Instant;

use sqlx::PgPool;
use tracing::{debug, error, info};

use crate::error::{DbError, DbResult};

// =============================================================================
// Tables
// =============================================================================

pub const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          SERIAL PRIMARY KEY,
    fullname    VARCHAR(100) NOT NULL,
    email       VARCHAR(100) NOT NULL UNIQUE,
    phone       BIGINT NOT NULL,
    address     TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

pub const CREATE_CATEGORIES: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id          SERIAL PRIMARY KEY,
    name        VARCHAR(100) NOT NULL UNIQUE,
    description TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

pub const CREATE_BRANDS: &str = r#"
CREATE TABLE IF NOT EXISTS brands (
    id          SERIAL PRIMARY KEY,
    name        VARCHAR(100) NOT NULL UNIQUE,
    description TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

pub const CREATE_PRODUCTS: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id              SERIAL PRIMARY KEY,
    product_name    VARCHAR(100) NOT NULL,
    description     TEXT,
    price           NUMERIC(10, 2) NOT NULL,
    stock_quantity  INT NOT NULL,
    category_id     INT REFERENCES categories(id) ON DELETE SET NULL,
    brand_id        INT REFERENCES brands(id) ON DELETE SET NULL,
    sku             VARCHAR(50) UNIQUE,
    image_url       VARCHAR(255),
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

pub const CREATE_ORDERS: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id            SERIAL PRIMARY KEY,
    user_id       INT REFERENCES users(id) ON DELETE SET NULL,
    order_date    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    total_amount  NUMERIC(12, 2) NOT NULL DEFAULT 0,
    status        VARCHAR(20) NOT NULL DEFAULT 'pending',
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

pub const CREATE_ORDER_ITEMS: &str = r#"
CREATE TABLE IF NOT EXISTS order_items (
    id          SERIAL PRIMARY KEY,
    order_id    INT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_id  INT NOT NULL REFERENCES products(id),
    quantity    INT NOT NULL CHECK (quantity > 0),
    price       NUMERIC(10, 2) NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

pub const CREATE_CART_ITEMS: &str = r#"
CREATE TABLE IF NOT EXISTS cart_items (
    id          SERIAL PRIMARY KEY,
    user_id     INT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    product_id  INT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    quantity    INT NOT NULL CHECK (quantity > 0),
    added_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (user_id, product_id)
)"#;

pub const CREATE_PAYMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS payments (
    id          SERIAL PRIMARY KEY,
    order_id    INT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    amount      NUMERIC(12, 2) NOT NULL,
    method      VARCHAR(30) NOT NULL,
    status      VARCHAR(20) NOT NULL DEFAULT 'pending',
    paid_at     TIMESTAMPTZ,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

/// `(table, DDL)` in foreign-key order.
pub const TABLES: [(&str, &str); 8] = [
    ("users", CREATE_USERS),
    ("categories", CREATE_CATEGORIES),
    ("brands", CREATE_BRANDS),
    ("products", CREATE_PRODUCTS),
    ("orders", CREATE_ORDERS),
    ("order_items", CREATE_ORDER_ITEMS),
    ("cart_items", CREATE_CART_ITEMS),
    ("payments", CREATE_PAYMENTS),
];

// =============================================================================
// Indexes
// =============================================================================

/// Indexes backing the filter columns and join keys.
pub const INDEXES: [&str; 8] = [
    "CREATE INDEX IF NOT EXISTS idx_users_created_at ON users (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_products_category_id ON products (category_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_brand_id ON products (brand_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_price ON products (price)",
    "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items (order_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_product_id ON order_items (product_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_order_id ON payments (order_id)",
];

// =============================================================================
// Upgrades
// =============================================================================

/// Widens `users.phone` for databases created when it was `INTEGER`.
///
/// Checks `information_schema` first so an already-BIGINT column is left
/// alone (no table rewrite, no lock).
pub const UPGRADE_PHONE_TO_BIGINT: &str = r#"
DO $$
BEGIN
    IF EXISTS (
        SELECT 1
        FROM information_schema.columns
        WHERE table_schema = current_schema()
          AND table_name = 'users'
          AND column_name = 'phone'
          AND data_type = 'integer'
    ) THEN
        ALTER TABLE users ALTER COLUMN phone TYPE BIGINT;
    END IF;
END
$$"#;

// =============================================================================
// Runner
// =============================================================================

/// Creates every table, index and upgrade that is missing.
///
/// ## Example
/// ```rust,ignore
/// initialize_tables(db.pool()).await?;
/// ```
pub async fn initialize_tables(pool: &PgPool) -> DbResult<()> {
    info!("Initializing database schema");

    for (table, ddl) in TABLES {
        run_ddl(pool, table, ddl).await?;
        info!(table, "Table ready");
    }

    for ddl in INDEXES {
        run_ddl(pool, "index", ddl).await?;
    }

    run_ddl(pool, "users.phone upgrade", UPGRADE_PHONE_TO_BIGINT).await?;

    info!(tables = TABLES.len(), "Database schema initialized");
    Ok(())
}

async fn run_ddl(pool: &PgPool, target: &str, ddl: &str) -> DbResult<()> {
    let started = Instant::now();

    match sqlx::query(ddl).execute(pool).await {
        Ok(_) => {
            debug!(target_object = target, elapsed = ?started.elapsed(), "DDL applied");
            Ok(())
        }
        Err(e) => {
            error!(target_object = target, error = %e, "DDL failed");
            Err(DbError::SchemaInit(format!("{target}: {e}")))
        }
    }
}

/// Returns the storefront tables that do not exist yet.
///
/// ## Usage
/// For diagnostics and the seed binary's "already initialized?" check.
pub async fn missing_tables(pool: &PgPool) -> DbResult<Vec<String>> {
    let wanted: Vec<String> = TABLES.iter().map(|(name, _)| name.to_string()).collect();

    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::TEXT FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = ANY($1)",
    )
    .bind(&wanted)
    .fetch_all(pool)
    .await?;

    Ok(wanted
        .into_iter()
        .filter(|name| !present.contains(name))
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn position(table: &str) -> usize {
        TABLES
            .iter()
            .position(|(name, _)| *name == table)
            .unwrap()
    }

    #[test]
    fn test_tables_in_foreign_key_order() {
        assert!(position("users") < position("orders"));
        assert!(position("categories") < position("products"));
        assert!(position("brands") < position("products"));
        assert!(position("orders") < position("order_items"));
        assert!(position("products") < position("order_items"));
        assert!(position("products") < position("cart_items"));
        assert!(position("orders") < position("payments"));
    }

    #[test]
    fn test_every_statement_is_idempotent() {
        for (table, ddl) in TABLES {
            assert!(
                ddl.contains("CREATE TABLE IF NOT EXISTS"),
                "{table} is not idempotent"
            );
        }
        for ddl in INDEXES {
            assert!(ddl.starts_with("CREATE INDEX IF NOT EXISTS"));
        }
    }

    #[test]
    fn test_money_columns_are_numeric() {
        assert!(CREATE_PRODUCTS.contains("price           NUMERIC(10, 2)"));
        assert!(CREATE_ORDERS.contains("NUMERIC(12, 2)"));
        assert!(CREATE_PAYMENTS.contains("NUMERIC(12, 2)"));
    }

    #[test]
    fn test_phone_upgrade_checks_current_type() {
        assert!(UPGRADE_PHONE_TO_BIGINT.contains("data_type = 'integer'"));
        assert!(CREATE_USERS.contains("phone       BIGINT"));
    }
}
