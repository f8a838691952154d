//! Sales aggregates: per category, and per category × brand with
//! ROLLUP / CUBE subtotals.
//!
//! ## Reading ROLLUP and CUBE rows
//! ```text
//! category     brand     grouping_level  meaning
//! ───────────  ────────  ──────────────  ─────────────────────────────
//! Electronics  Acme      0               one category/brand pair
//! Electronics  NULL      1               subtotal for the category
//! NULL         Acme      2               subtotal for the brand (CUBE only)
//! NULL         NULL      3               grand total
//! ```
//!
//! Products without a category or brand are grouped under
//! `Uncategorized` / `Unbranded`, so a `NULL` in these reports always means
//! "subtotal", never "missing".

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::Analytics;
use crate::error::DbResult;

/// Revenue of one category.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CategorySales {
    pub category: String,
    pub total_sales: Decimal,
}

/// One row of a ROLLUP or CUBE report.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SalesGroupRow {
    /// `None` on brand subtotals and the grand total.
    pub category: Option<String>,
    /// `None` on category subtotals and the grand total.
    pub brand: Option<String>,
    /// `GROUPING(category, brand)`: 0 detail, 1 category subtotal,
    /// 2 brand subtotal, 3 grand total.
    pub grouping_level: i32,
    pub total_sales: Decimal,
}

impl SalesGroupRow {
    pub fn is_grand_total(&self) -> bool {
        self.grouping_level == 3
    }
}

const SALES_BY_CATEGORY: &str = r#"
SELECT c.name AS category,
       SUM(oi.quantity * oi.price) AS total_sales
FROM order_items oi
JOIN products p ON oi.product_id = p.id
JOIN categories c ON p.category_id = c.id
GROUP BY c.name
ORDER BY total_sales DESC"#;

/// Shared input for the grouped reports; `{grouping}` is ROLLUP or CUBE.
const SALES_GROUPED: &str = r#"
WITH line_sales AS (
    SELECT COALESCE(c.name, 'Uncategorized') AS category,
           COALESCE(b.name, 'Unbranded') AS brand,
           oi.quantity * oi.price AS amount
    FROM order_items oi
    JOIN products p ON oi.product_id = p.id
    LEFT JOIN categories c ON p.category_id = c.id
    LEFT JOIN brands b ON p.brand_id = b.id
)
SELECT category, brand,
       GROUPING(category, brand) AS grouping_level,
       COALESCE(SUM(amount), 0) AS total_sales
FROM line_sales
GROUP BY {grouping} (category, brand)
ORDER BY category NULLS LAST, brand NULLS LAST"#;

fn grouped(grouping: &str) -> String {
    SALES_GROUPED.replace("{grouping}", grouping)
}

impl Analytics {
    /// Revenue per category, highest first. Uncategorized products are
    /// not counted.
    pub async fn sales_by_category(&self) -> DbResult<Vec<CategorySales>> {
        self.db.fetch_all_as(SALES_BY_CATEGORY, &[]).await
    }

    /// Category × brand revenue with per-category subtotals and a grand
    /// total.
    pub async fn sales_rollup(&self) -> DbResult<Vec<SalesGroupRow>> {
        self.db.fetch_all_as(&grouped("ROLLUP"), &[]).await
    }

    /// Category × brand revenue with every subtotal combination.
    pub async fn sales_cube(&self) -> DbResult<Vec<SalesGroupRow>> {
        self.db.fetch_all_as(&grouped("CUBE"), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_statements() {
        assert!(grouped("ROLLUP").contains("GROUP BY ROLLUP (category, brand)"));
        assert!(grouped("CUBE").contains("GROUP BY CUBE (category, brand)"));
        assert!(!grouped("CUBE").contains("{grouping}"));
    }

    #[test]
    fn test_grouped_total_never_null() {
        // with no order lines the grand-total row still comes back
        assert!(grouped("ROLLUP").contains("COALESCE(SUM(amount), 0) AS total_sales"));
    }

    #[test]
    fn test_grand_total_detection() {
        let row = SalesGroupRow {
            category: None,
            brand: None,
            grouping_level: 3,
            total_sales: Decimal::from(100),
        };
        assert!(row.is_grand_total());
    }
}
