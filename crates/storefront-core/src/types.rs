//! # Domain Types
//!
//! Row records for every table, plus the shapes used to create and patch them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Row (read back)        Insert (no server fields)   Patch (all Option)  │
//! │  ───────────────        ─────────────────────────   ──────────────────  │
//! │  User                   NewUser                     UserPatch           │
//! │  Product                NewProduct                  ProductPatch        │
//! │  Category / Brand       NewCategory / NewBrand      CategoryPatch / ... │
//! │  Order / OrderItem      NewOrder / NewOrderItem     OrderPatch / ...    │
//! │  CartItem / Payment     NewCartItem / NewPayment    CartItemPatch / ... │
//! │                                                                         │
//! │  Relations: Order → User, OrderItem → Order/Product,                   │
//! │             CartItem → User/Product, Payment → Order,                  │
//! │             Product → Category/Brand                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Primary keys are `SERIAL` values generated by PostgreSQL, so only row
//! types carry an `id`. Insert types never do.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// User
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Server-generated identifier.
    pub id: i32,

    pub fullname: String,

    /// Unique across all users.
    pub email: String,

    /// Stored as BIGINT so full international numbers fit.
    pub phone: i64,

    pub address: String,

    pub created_at: DateTime<Utc>,

    /// Refreshed by every partial update.
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub fullname: String,
    pub email: String,
    pub phone: i64,
    pub address: String,
}

/// Partial update for a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<i64>,
    pub address: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i32,

    pub product_name: String,

    pub description: Option<String>,

    /// NUMERIC(10,2), never a float.
    pub price: Decimal,

    pub stock_quantity: i32,

    pub category_id: Option<i32>,

    pub brand_id: Option<i32>,

    /// Stock Keeping Unit, unique when present.
    pub sku: Option<String>,

    pub image_url: Option<String>,

    /// Inactive products are hidden from the convenience queries.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when the product has a non-empty image URL.
    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Fields needed to create a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub product_name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: Option<i32>,
    pub brand_id: Option<i32>,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
}

/// Partial update for a product.
///
/// Nullable columns use `Option<Option<T>>`: `Some(None)` clears the column,
/// `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub product_name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub category_id: Option<Option<i32>>,
    pub brand_id: Option<Option<i32>>,
    pub sku: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Category & Brand
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Brand {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBrand {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

// =============================================================================
// Order & OrderItem
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i32,

    /// Kept nullable so orders survive the deletion of their user.
    pub user_id: Option<i32>,

    pub order_date: DateTime<Utc>,

    pub total_amount: Decimal,

    /// Free-form status: pending, paid, shipped, cancelled...
    pub status: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: Option<i32>,
    pub total_amount: Decimal,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub user_id: Option<Option<i32>>,
    pub total_amount: Option<Decimal>,
    pub status: Option<String>,
}

/// One line of an order. `price` is the unit price at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// quantity × unit price.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItemPatch {
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
}

// =============================================================================
// CartItem & Payment
// =============================================================================

/// A product sitting in a user's cart. One row per (user, product).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartItemPatch {
    pub quantity: Option<i32>,
}

/// A payment against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i32,
    pub order_id: i32,
    pub amount: Decimal,

    /// card, cash, transfer...
    pub method: String,

    pub status: String,

    pub paid_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub order_id: i32,
    pub amount: Decimal,
    pub method: String,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentPatch {
    pub amount: Option<Decimal>,
    pub method: Option<String>,
    pub status: Option<String>,
    pub paid_at: Option<Option<DateTime<Utc>>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product(image_url: Option<&str>) -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            product_name: "Sample".to_string(),
            description: None,
            price: Decimal::from_str("19.99").unwrap(),
            stock_quantity: 3,
            category_id: None,
            brand_id: None,
            sku: Some("SKU-1".to_string()),
            image_url: image_url.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_has_image() {
        assert!(product(Some("http://example.com/a.jpg")).has_image());
        assert!(!product(Some("")).has_image());
        assert!(!product(None).has_image());
    }

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            quantity: 3,
            price: Decimal::from_str("2.50").unwrap(),
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total(), Decimal::from_str("7.50").unwrap());
    }

    #[test]
    fn test_patch_default_is_empty() {
        assert_eq!(UserPatch::default(), UserPatch {
            fullname: None,
            email: None,
            phone: None,
            address: None,
        });
    }
}
