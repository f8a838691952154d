//! Set operations and subqueries.

use serde::Serialize;
use sqlx::FromRow;
use storefront_core::Product;

use super::Analytics;
use crate::entity::Entity;
use crate::error::DbResult;
use crate::value::SqlValue;

/// A user or product reduced to a display name and an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct NamedEntry {
    /// `user` or `product`.
    pub kind: String,
    pub name: String,
    /// Email for users, SKU for products (which may have none).
    pub identifier: Option<String>,
}

/// A user and how many different products they have ordered.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserProductCount {
    pub user_id: i32,
    pub fullname: String,
    pub email: String,
    pub distinct_products: i64,
}

const USERS_AND_PRODUCTS: &str = r#"
SELECT 'user' AS kind, fullname AS name, email AS identifier FROM users
UNION ALL
SELECT 'product' AS kind, product_name AS name, sku AS identifier FROM products"#;

/// The subquery runs once per user row.
const USERS_WITH_MANY_PRODUCTS: &str = r#"
SELECT user_id, fullname, email, distinct_products
FROM (
    SELECT u.id AS user_id, u.fullname, u.email,
           (SELECT COUNT(DISTINCT oi.product_id)
            FROM orders o
            JOIN order_items oi ON oi.order_id = o.id
            WHERE o.user_id = u.id) AS distinct_products
    FROM users u
) counted
WHERE distinct_products > $1
ORDER BY distinct_products DESC, user_id"#;

fn expensive_products_sql() -> String {
    format!(
        r#"
WITH avg_price AS (
    SELECT AVG(price) AS average_price FROM products
)
SELECT {} FROM products
WHERE price > (SELECT average_price FROM avg_price)
ORDER BY price DESC"#,
        Product::select_list()
    )
}

impl Analytics {
    /// Users and products in one list (UNION ALL keeps duplicates).
    pub async fn users_and_products(&self) -> DbResult<Vec<NamedEntry>> {
        self.db.fetch_all_as(USERS_AND_PRODUCTS, &[]).await
    }

    /// Users who have ordered more than `min` distinct products.
    pub async fn users_with_many_products(&self, min: i64) -> DbResult<Vec<UserProductCount>> {
        self.db
            .fetch_all_as(USERS_WITH_MANY_PRODUCTS, &[SqlValue::BigInt(min)])
            .await
    }

    /// Products priced above the catalogue average, most expensive first.
    pub async fn expensive_products(&self) -> DbResult<Vec<Product>> {
        self.db.fetch_all_as(&expensive_products_sql(), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_keeps_duplicates() {
        assert!(USERS_AND_PRODUCTS.contains("UNION ALL"));
    }

    #[test]
    fn test_subquery_is_correlated_on_user() {
        assert!(USERS_WITH_MANY_PRODUCTS.contains("WHERE o.user_id = u.id"));
        assert!(USERS_WITH_MANY_PRODUCTS.contains("COUNT(DISTINCT oi.product_id)"));
    }

    #[test]
    fn test_expensive_products_uses_cte() {
        let sql = expensive_products_sql();
        assert!(sql.trim_start().starts_with("WITH avg_price AS"));
        assert!(sql.contains("SELECT id, product_name,"));
    }
}
