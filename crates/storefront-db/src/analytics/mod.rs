//! # Reporting Queries
//!
//! Fixed, read-only SQL over the whole schema, each returning typed rows.
//!
//! ## Catalogue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  joins.rs                                                               │
//! │  ├── orders_with_users              INNER  orders ⋈ users              │
//! │  ├── users_with_orders              LEFT   users ⟕ orders              │
//! │  ├── orders_with_users_right_join   RIGHT  users ⟖ orders              │
//! │  ├── users_and_orders_full_join     FULL   users ⟗ orders              │
//! │  ├── orders_with_items              orders ⋈ order_items ⋈ products    │
//! │  ├── user_order_product_details     users ⋈ orders ⋈ items ⋈ products  │
//! │  └── order_details                  ... ⟕ categories ⟕ brands          │
//! │                                                                         │
//! │  sales.rs                                                               │
//! │  ├── sales_by_category              GROUP BY                           │
//! │  ├── sales_rollup                   GROUP BY ROLLUP (category, brand)  │
//! │  └── sales_cube                     GROUP BY CUBE (category, brand)    │
//! │                                                                         │
//! │  sets.rs                                                                │
//! │  ├── users_and_products             UNION ALL                          │
//! │  ├── users_with_many_products       correlated subquery                │
//! │  └── expensive_products             CTE                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod joins;
pub mod sales;
pub mod sets;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{DbError, DbResult};
use crate::pool::Database;

pub use joins::{OrderDetail, OrderItemLine, OrderWithUser, UserOrderProduct, UserOrderRow};
pub use sales::{CategorySales, SalesGroupRow};
pub use sets::{NamedEntry, UserProductCount};

/// Default threshold for [`Analytics::users_with_many_products`].
pub const DEFAULT_MIN_DISTINCT_PRODUCTS: i64 = 5;

/// Handle for the reporting queries.
#[derive(Debug, Clone)]
pub struct Analytics {
    db: Database,
}

impl Analytics {
    pub fn new(db: Database) -> Self {
        Analytics { db }
    }

    /// Runs a report by name and returns its rows as JSON.
    pub async fn run(&self, report: Report) -> DbResult<serde_json::Value> {
        match report {
            Report::OrdersWithUsers => to_json(self.orders_with_users().await?),
            Report::UsersWithOrders => to_json(self.users_with_orders().await?),
            Report::OrdersWithUsersRightJoin => {
                to_json(self.orders_with_users_right_join().await?)
            }
            Report::UsersAndOrdersFullJoin => to_json(self.users_and_orders_full_join().await?),
            Report::OrdersWithItems => to_json(self.orders_with_items().await?),
            Report::UserOrderProductDetails => to_json(self.user_order_product_details().await?),
            Report::OrderDetails => to_json(self.order_details().await?),
            Report::SalesByCategory => to_json(self.sales_by_category().await?),
            Report::SalesRollup => to_json(self.sales_rollup().await?),
            Report::SalesCube => to_json(self.sales_cube().await?),
            Report::UsersAndProducts => to_json(self.users_and_products().await?),
            Report::UsersWithManyProducts => to_json(
                self.users_with_many_products(DEFAULT_MIN_DISTINCT_PRODUCTS)
                    .await?,
            ),
            Report::ExpensiveProducts => to_json(self.expensive_products().await?),
        }
    }
}

fn to_json<T: Serialize>(rows: Vec<T>) -> DbResult<serde_json::Value> {
    serde_json::to_value(rows).map_err(|e| DbError::Internal(e.to_string()))
}

// =============================================================================
// Report names
// =============================================================================

/// Every report, addressable by its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    OrdersWithUsers,
    UsersWithOrders,
    OrdersWithUsersRightJoin,
    UsersAndOrdersFullJoin,
    OrdersWithItems,
    UserOrderProductDetails,
    OrderDetails,
    SalesByCategory,
    SalesRollup,
    SalesCube,
    UsersAndProducts,
    UsersWithManyProducts,
    ExpensiveProducts,
}

impl Report {
    pub const ALL: [Report; 13] = [
        Report::OrdersWithUsers,
        Report::UsersWithOrders,
        Report::OrdersWithUsersRightJoin,
        Report::UsersAndOrdersFullJoin,
        Report::OrdersWithItems,
        Report::UserOrderProductDetails,
        Report::OrderDetails,
        Report::SalesByCategory,
        Report::SalesRollup,
        Report::SalesCube,
        Report::UsersAndProducts,
        Report::UsersWithManyProducts,
        Report::ExpensiveProducts,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Report::OrdersWithUsers => "orders_with_users",
            Report::UsersWithOrders => "users_with_orders",
            Report::OrdersWithUsersRightJoin => "orders_with_users_right_join",
            Report::UsersAndOrdersFullJoin => "users_and_orders_full_join",
            Report::OrdersWithItems => "orders_with_items",
            Report::UserOrderProductDetails => "user_order_product_details",
            Report::OrderDetails => "order_details",
            Report::SalesByCategory => "sales_by_category",
            Report::SalesRollup => "sales_rollup",
            Report::SalesCube => "sales_cube",
            Report::UsersAndProducts => "users_and_products",
            Report::UsersWithManyProducts => "users_with_many_products",
            Report::ExpensiveProducts => "expensive_products",
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Report {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_lowercase();
        Report::ALL
            .into_iter()
            .find(|report| report.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Report::ALL.iter().map(Report::name).collect();
                format!("unknown report '{s}', expected one of: {}", names.join(", "))
            })
    }
}
