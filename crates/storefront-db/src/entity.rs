//! # Entity Mapping
//!
//! Compile-time description of each table: its name, its columns, which of
//! them are free-text searchable, and how insert/patch shapes turn into
//! `(column, value)` pairs.
//!
//! ## Why Explicit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Column names end up in SQL text (they cannot be bound), so the only    │
//! │  names that ever reach a statement are the `&'static str`s listed here. │
//! │                                                                         │
//! │  impl Entity for User                                                   │
//! │  ├── TABLE        = "users"                                             │
//! │  ├── COLUMNS      = id, fullname, email, phone, address, created_at ... │
//! │  ├── SEARCHABLE   = fullname, email, address                            │
//! │  └── HAS_UPDATED_AT = true   → update() appends updated_at = NOW()      │
//! │                                                                         │
//! │  impl Insertable for NewUser  → [("fullname", Text), ("email", ...)]    │
//! │  impl Patch for UserPatch     → only the fields that are Some           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::postgres::PgRow;
use sqlx::FromRow;
use storefront_core::{
    Brand, BrandPatch, CartItem, CartItemPatch, Category, CategoryPatch, NewBrand, NewCartItem,
    NewCategory, NewOrder, NewOrderItem, NewPayment, NewProduct, NewUser, Order, OrderItem,
    OrderItemPatch, OrderPatch, Payment, PaymentPatch, Product, ProductPatch, User, UserPatch,
};

use crate::value::SqlValue;

/// A table row type.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Table name.
    const TABLE: &'static str;

    /// Human-readable name for logs and errors.
    const NAME: &'static str;

    /// Every column, in select order. Doubles as the sort allow-list.
    const COLUMNS: &'static [&'static str];

    /// Text columns allowed in free-text search.
    const SEARCHABLE: &'static [&'static str];

    /// Whether partial updates should refresh `updated_at`.
    const HAS_UPDATED_AT: bool;

    /// Insert shape.
    type New: Insertable + Sync;

    /// Partial-update shape.
    type Patch: Patch + Sync;

    /// Comma-separated column list for `SELECT`.
    fn select_list() -> String {
        Self::COLUMNS.join(", ")
    }
}

/// A value that can be inserted as one row.
pub trait Insertable {
    /// `(column, value)` for every column the insert sets.
    fn values(&self) -> Vec<(&'static str, SqlValue)>;
}

/// A partial update.
pub trait Patch {
    /// `(column, value)` for the supplied fields only.
    fn changes(&self) -> Vec<(&'static str, SqlValue)>;

    fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }
}

/// Collects the `Some` fields of a patch.
///
/// `Option<Option<T>>` fields flatten naturally: `Some(None)` becomes a
/// typed `NULL`, `None` is skipped.
macro_rules! changes {
    ($patch:expr; $($field:ident),* $(,)?) => {{
        let mut changes: Vec<(&'static str, SqlValue)> = Vec::new();
        $(
            if let Some(value) = &$patch.$field {
                changes.push((stringify!($field), SqlValue::from(value.clone())));
            }
        )*
        changes
    }};
}

/// Lists every field of an insert shape.
macro_rules! values {
    ($new:expr; $($field:ident),* $(,)?) => {
        vec![$((stringify!($field), SqlValue::from($new.$field.clone()))),*]
    };
}

// =============================================================================
// Users
// =============================================================================

impl Entity for User {
    const TABLE: &'static str = "users";
    const NAME: &'static str = "User";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "fullname",
        "email",
        "phone",
        "address",
        "created_at",
        "updated_at",
    ];
    const SEARCHABLE: &'static [&'static str] = &["fullname", "email", "address"];
    const HAS_UPDATED_AT: bool = true;
    type New = NewUser;
    type Patch = UserPatch;
}

impl Insertable for NewUser {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        values!(self; fullname, email, phone, address)
    }
}

impl Patch for UserPatch {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        changes!(self; fullname, email, phone, address)
    }
}

// =============================================================================
// Products
// =============================================================================

impl Entity for Product {
    const TABLE: &'static str = "products";
    const NAME: &'static str = "Product";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "product_name",
        "description",
        "price",
        "stock_quantity",
        "category_id",
        "brand_id",
        "sku",
        "image_url",
        "is_active",
        "created_at",
        "updated_at",
    ];
    const SEARCHABLE: &'static [&'static str] = &["product_name", "description", "sku"];
    const HAS_UPDATED_AT: bool = true;
    type New = NewProduct;
    type Patch = ProductPatch;
}

impl Insertable for NewProduct {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        values!(self;
            product_name, description, price, stock_quantity,
            category_id, brand_id, sku, image_url, is_active,
        )
    }
}

impl Patch for ProductPatch {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        changes!(self;
            product_name, description, price, stock_quantity,
            category_id, brand_id, sku, image_url, is_active,
        )
    }
}

// =============================================================================
// Categories & Brands
// =============================================================================

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const NAME: &'static str = "Category";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "description", "created_at", "updated_at"];
    const SEARCHABLE: &'static [&'static str] = &["name", "description"];
    const HAS_UPDATED_AT: bool = true;
    type New = NewCategory;
    type Patch = CategoryPatch;
}

impl Insertable for NewCategory {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        values!(self; name, description)
    }
}

impl Patch for CategoryPatch {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        changes!(self; name, description)
    }
}

impl Entity for Brand {
    const TABLE: &'static str = "brands";
    const NAME: &'static str = "Brand";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "description", "created_at", "updated_at"];
    const SEARCHABLE: &'static [&'static str] = &["name", "description"];
    const HAS_UPDATED_AT: bool = true;
    type New = NewBrand;
    type Patch = BrandPatch;
}

impl Insertable for NewBrand {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        values!(self; name, description)
    }
}

impl Patch for BrandPatch {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        changes!(self; name, description)
    }
}

// =============================================================================
// Orders & Order Items
// =============================================================================

impl Entity for Order {
    const TABLE: &'static str = "orders";
    const NAME: &'static str = "Order";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "order_date",
        "total_amount",
        "status",
        "created_at",
        "updated_at",
    ];
    const SEARCHABLE: &'static [&'static str] = &["status"];
    const HAS_UPDATED_AT: bool = true;
    type New = NewOrder;
    type Patch = OrderPatch;
}

impl Insertable for NewOrder {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        values!(self; user_id, total_amount, status)
    }
}

impl Patch for OrderPatch {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        changes!(self; user_id, total_amount, status)
    }
}

impl Entity for OrderItem {
    const TABLE: &'static str = "order_items";
    const NAME: &'static str = "OrderItem";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "order_id",
        "product_id",
        "quantity",
        "price",
        "created_at",
    ];
    const SEARCHABLE: &'static [&'static str] = &[];
    const HAS_UPDATED_AT: bool = false;
    type New = NewOrderItem;
    type Patch = OrderItemPatch;
}

impl Insertable for NewOrderItem {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        values!(self; order_id, product_id, quantity, price)
    }
}

impl Patch for OrderItemPatch {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        changes!(self; quantity, price)
    }
}

// =============================================================================
// Cart Items & Payments
// =============================================================================

impl Entity for CartItem {
    const TABLE: &'static str = "cart_items";
    const NAME: &'static str = "CartItem";
    const COLUMNS: &'static [&'static str] =
        &["id", "user_id", "product_id", "quantity", "added_at"];
    const SEARCHABLE: &'static [&'static str] = &[];
    const HAS_UPDATED_AT: bool = false;
    type New = NewCartItem;
    type Patch = CartItemPatch;
}

impl Insertable for NewCartItem {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        values!(self; user_id, product_id, quantity)
    }
}

impl Patch for CartItemPatch {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        changes!(self; quantity)
    }
}

impl Entity for Payment {
    const TABLE: &'static str = "payments";
    const NAME: &'static str = "Payment";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "order_id",
        "amount",
        "method",
        "status",
        "paid_at",
        "created_at",
    ];
    const SEARCHABLE: &'static [&'static str] = &["method", "status"];
    const HAS_UPDATED_AT: bool = false;
    type New = NewPayment;
    type Patch = PaymentPatch;
}

impl Insertable for NewPayment {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        values!(self; order_id, amount, method, status, paid_at)
    }
}

impl Patch for PaymentPatch {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        changes!(self; amount, method, status, paid_at)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlType;
    use rust_decimal::Decimal;

    #[test]
    fn test_patch_lists_only_supplied_fields() {
        let patch = UserPatch {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            patch.changes(),
            vec![("email", SqlValue::Text("new@example.com".to_string()))]
        );
    }

    #[test]
    fn test_empty_patch() {
        assert!(UserPatch::default().is_empty());
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn test_clearing_nullable_column_binds_typed_null() {
        let patch = ProductPatch {
            category_id: Some(None),
            ..Default::default()
        };
        assert_eq!(
            patch.changes(),
            vec![("category_id", SqlValue::Null(SqlType::Int))]
        );
    }

    #[test]
    fn test_insert_values_cover_every_field() {
        let product = NewProduct {
            product_name: "Lamp".to_string(),
            description: None,
            price: Decimal::new(2500, 2),
            stock_quantity: 4,
            category_id: Some(1),
            brand_id: None,
            sku: Some("LAMP-1".to_string()),
            image_url: None,
            is_active: true,
        };
        let columns: Vec<&str> = product.values().iter().map(|(c, _)| *c).collect();
        assert_eq!(
            columns,
            vec![
                "product_name",
                "description",
                "price",
                "stock_quantity",
                "category_id",
                "brand_id",
                "sku",
                "image_url",
                "is_active",
            ]
        );
    }

    fn assert_columns_known<E: Entity>() {
        for col in E::SEARCHABLE {
            assert!(E::COLUMNS.contains(col), "{} not a column of {}", col, E::TABLE);
        }
        assert_eq!(E::COLUMNS[0], "id");
        assert_eq!(
            E::COLUMNS.contains(&"updated_at"),
            E::HAS_UPDATED_AT,
            "{}",
            E::TABLE
        );
    }

    #[test]
    fn test_entity_metadata_consistent() {
        assert_columns_known::<User>();
        assert_columns_known::<Product>();
        assert_columns_known::<Category>();
        assert_columns_known::<Brand>();
        assert_columns_known::<Order>();
        assert_columns_known::<OrderItem>();
        assert_columns_known::<CartItem>();
        assert_columns_known::<Payment>();
    }
}
