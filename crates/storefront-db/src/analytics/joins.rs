//! Join reports across users, orders, order items and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::Analytics;
use crate::error::DbResult;

// =============================================================================
// Rows
// =============================================================================

/// An order with the user who placed it.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OrderWithUser {
    pub order_id: i32,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: String,
    pub user_id: i32,
    pub fullname: String,
}

/// One side of an outer join between users and orders.
///
/// Either side can be missing: a user with no orders has no `order_*`,
/// an order whose user was deleted has no `user_id`/`fullname`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserOrderRow {
    pub user_id: Option<i32>,
    pub fullname: Option<String>,
    pub order_id: Option<i32>,
    pub order_date: Option<DateTime<Utc>>,
    pub total_amount: Option<Decimal>,
}

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OrderItemLine {
    pub order_id: i32,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// Who bought what, in which order.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserOrderProduct {
    pub user_id: i32,
    pub fullname: String,
    pub order_id: i32,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// A fully described order line, with the product's category and brand
/// when it has them.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OrderDetail {
    pub order_id: i32,
    pub fullname: String,
    pub product_name: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
    pub total_item_cost: Decimal,
    pub order_total: Decimal,
}

// =============================================================================
// Statements
// =============================================================================

const ORDERS_WITH_USERS: &str = r#"
SELECT o.id AS order_id, o.order_date, o.total_amount, o.status,
       u.id AS user_id, u.fullname
FROM orders o
INNER JOIN users u ON o.user_id = u.id
ORDER BY o.id"#;

const USERS_WITH_ORDERS: &str = r#"
SELECT u.id AS user_id, u.fullname,
       o.id AS order_id, o.order_date, o.total_amount
FROM users u
LEFT JOIN orders o ON u.id = o.user_id
ORDER BY u.id, o.id"#;

const ORDERS_WITH_USERS_RIGHT_JOIN: &str = r#"
SELECT u.id AS user_id, u.fullname,
       o.id AS order_id, o.order_date, o.total_amount
FROM users u
RIGHT JOIN orders o ON u.id = o.user_id
ORDER BY o.id"#;

const USERS_AND_ORDERS_FULL_JOIN: &str = r#"
SELECT u.id AS user_id, u.fullname,
       o.id AS order_id, o.order_date, o.total_amount
FROM users u
FULL OUTER JOIN orders o ON u.id = o.user_id
ORDER BY u.id NULLS LAST, o.id NULLS LAST"#;

const ORDERS_WITH_ITEMS: &str = r#"
SELECT o.id AS order_id, o.order_date, o.total_amount,
       p.id AS product_id, p.product_name,
       oi.quantity, oi.price
FROM orders o
INNER JOIN order_items oi ON o.id = oi.order_id
INNER JOIN products p ON oi.product_id = p.id
ORDER BY o.id, oi.id"#;

const USER_ORDER_PRODUCT_DETAILS: &str = r#"
SELECT u.id AS user_id, u.fullname,
       o.id AS order_id, o.order_date, o.total_amount,
       p.id AS product_id, p.product_name,
       oi.quantity, oi.price
FROM users u
INNER JOIN orders o ON u.id = o.user_id
INNER JOIN order_items oi ON o.id = oi.order_id
INNER JOIN products p ON oi.product_id = p.id
ORDER BY u.id, o.id, oi.id"#;

const ORDER_DETAILS: &str = r#"
SELECT o.id AS order_id, u.fullname, p.product_name,
       c.name AS category, b.name AS brand,
       oi.quantity, oi.price,
       (oi.quantity * oi.price) AS total_item_cost,
       o.total_amount AS order_total
FROM orders o
JOIN users u ON o.user_id = u.id
JOIN order_items oi ON o.id = oi.order_id
JOIN products p ON oi.product_id = p.id
LEFT JOIN categories c ON p.category_id = c.id
LEFT JOIN brands b ON p.brand_id = b.id
ORDER BY o.id, oi.id"#;

impl Analytics {
    /// Orders together with the user who placed them. Orders without a
    /// user are left out.
    pub async fn orders_with_users(&self) -> DbResult<Vec<OrderWithUser>> {
        self.db.fetch_all_as(ORDERS_WITH_USERS, &[]).await
    }

    /// Every user, with one row per order (or one empty row if none).
    pub async fn users_with_orders(&self) -> DbResult<Vec<UserOrderRow>> {
        self.db.fetch_all_as(USERS_WITH_ORDERS, &[]).await
    }

    /// Every order, with its user when it still exists.
    pub async fn orders_with_users_right_join(&self) -> DbResult<Vec<UserOrderRow>> {
        self.db.fetch_all_as(ORDERS_WITH_USERS_RIGHT_JOIN, &[]).await
    }

    /// Every user and every order, matched where possible.
    pub async fn users_and_orders_full_join(&self) -> DbResult<Vec<UserOrderRow>> {
        self.db.fetch_all_as(USERS_AND_ORDERS_FULL_JOIN, &[]).await
    }

    pub async fn orders_with_items(&self) -> DbResult<Vec<OrderItemLine>> {
        self.db.fetch_all_as(ORDERS_WITH_ITEMS, &[]).await
    }

    pub async fn user_order_product_details(&self) -> DbResult<Vec<UserOrderProduct>> {
        self.db.fetch_all_as(USER_ORDER_PRODUCT_DETAILS, &[]).await
    }

    /// Order lines with buyer, product, category and brand.
    pub async fn order_details(&self) -> DbResult<Vec<OrderDetail>> {
        self.db.fetch_all_as(ORDER_DETAILS, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_kinds() {
        assert!(ORDERS_WITH_USERS.contains("INNER JOIN users"));
        assert!(USERS_WITH_ORDERS.contains("LEFT JOIN orders"));
        assert!(ORDERS_WITH_USERS_RIGHT_JOIN.contains("RIGHT JOIN orders"));
        assert!(USERS_AND_ORDERS_FULL_JOIN.contains("FULL OUTER JOIN orders"));
        assert_eq!(USER_ORDER_PRODUCT_DETAILS.matches("INNER JOIN").count(), 3);
        assert_eq!(ORDER_DETAILS.matches("LEFT JOIN").count(), 2);
    }

    #[test]
    fn test_reports_take_no_parameters() {
        for sql in [ORDERS_WITH_USERS, ORDER_DETAILS, ORDERS_WITH_ITEMS] {
            assert!(!sql.contains('$'));
        }
    }
}
