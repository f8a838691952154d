//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Validated insert / bulk insert / partial update
//! - Structured filtering (price and stock ranges, categories, brands ...)
//! - Storefront lookups over active products only
//!
//! ## Storefront Lookups
//! ```text
//! ┌──────────────────┬────────────────────────────────┬─────────────────────┐
//! │ Method           │ Condition (plus is_active)     │ Order               │
//! ├──────────────────┼────────────────────────────────┼─────────────────────┤
//! │ by_category      │ category_id = $n               │ id                  │
//! │ by_brand         │ brand_id = $n                  │ id                  │
//! │ in_price_range   │ price BETWEEN $a AND $b        │ price ASC           │
//! │ low_stock        │ stock_quantity <= $n           │ stock_quantity ASC  │
//! │ search           │ name or description ILIKE      │ product_name ASC    │
//! │ newest           │ -                              │ created_at DESC     │
//! └──────────────────┴────────────────────────────────┴─────────────────────┘
//! ```

use rust_decimal::Decimal;
use storefront_core::validation::{validate_new_product, validate_sku};
use storefront_core::{
    BaseFilterOptions, FilterResponse, NewProduct, Product, ProductFilterOptions, ProductPatch,
    Range, SortOrder, ValidationError,
};
use tracing::debug;

use crate::error::DbResult;
use crate::filter::product_query;
use crate::pool::Database;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let cheap = repo.in_price_range(Decimal::ZERO, Decimal::from(20)).await?;
/// let reorder = repo.low_stock(5).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: Database,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(db: Database) -> Self {
        ProductRepository { db }
    }

    /// Inserts a product and returns its id.
    ///
    /// ## Errors
    /// - `Validation` for a blank name, negative price or stock, bad SKU
    /// - `ConstraintViolation { field: "sku", .. }` when the SKU is taken
    /// - `ForeignKeyViolation` for an unknown category or brand
    pub async fn insert(&self, product: &NewProduct) -> DbResult<i32> {
        validate_new_product(product)?;
        self.db.create::<Product>(product).await
    }

    /// Inserts every product or none of them.
    pub async fn insert_many(&self, products: &[NewProduct]) -> DbResult<Vec<i32>> {
        for product in products {
            validate_new_product(product)?;
        }
        self.db.create_many::<Product>(products).await
    }

    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        self.db.read_all::<Product>().await
    }

    /// Gets a product by id. `Ok(None)` when there is none.
    pub async fn get_by_id(&self, id: i32) -> DbResult<Option<Product>> {
        self.db.read_by_id::<Product>(id).await
    }

    /// Updates only the fields set in `patch`.
    pub async fn update(&self, id: i32, patch: &ProductPatch) -> DbResult<()> {
        debug!(id, "Updating product");

        if patch.price.is_some_and(|price| price.is_sign_negative()) {
            return Err(ValidationError::MustBePositive {
                field: "price".to_string(),
            }
            .into());
        }
        if patch.stock_quantity.is_some_and(|stock| stock < 0) {
            return Err(ValidationError::MustBePositive {
                field: "stock_quantity".to_string(),
            }
            .into());
        }
        if let Some(Some(sku)) = &patch.sku {
            validate_sku(sku)?;
        }

        self.db.update::<Product>(id, patch).await
    }

    pub async fn delete(&self, id: i32) -> DbResult<()> {
        self.db.delete::<Product>(id).await
    }

    pub async fn delete_all(&self) -> DbResult<u64> {
        self.db.delete_all::<Product>().await
    }

    /// Runs a structured filter.
    pub async fn filter(
        &self,
        options: &ProductFilterOptions,
    ) -> DbResult<FilterResponse<Product>> {
        product_query(options)?.fetch(&self.db).await
    }

    // =========================================================================
    // Storefront lookups
    // =========================================================================

    async fn active(
        &self,
        options: ProductFilterOptions,
    ) -> DbResult<Vec<Product>> {
        let options = ProductFilterOptions {
            is_active: Some(true),
            ..options
        };
        Ok(self.filter(&options).await?.data)
    }

    fn sorted(column: &str, order: SortOrder) -> BaseFilterOptions {
        BaseFilterOptions {
            sort_by: Some(column.to_string()),
            sort_order: Some(order),
            ..Default::default()
        }
    }

    /// Active products in a category.
    pub async fn by_category(&self, category_id: i32) -> DbResult<Vec<Product>> {
        self.active(ProductFilterOptions {
            category_id: Some(category_id),
            ..Default::default()
        })
        .await
    }

    /// Active products of a brand.
    pub async fn by_brand(&self, brand_id: i32) -> DbResult<Vec<Product>> {
        self.active(ProductFilterOptions {
            brand_id: Some(brand_id),
            ..Default::default()
        })
        .await
    }

    /// Active products priced within `[min, max]`, cheapest first.
    pub async fn in_price_range(&self, min: Decimal, max: Decimal) -> DbResult<Vec<Product>> {
        self.active(ProductFilterOptions {
            price_range: Some(Range::new(min, max)),
            base: Self::sorted("price", SortOrder::Asc),
            ..Default::default()
        })
        .await
    }

    /// Active products with at most `threshold` units left, lowest first.
    pub async fn low_stock(&self, threshold: i32) -> DbResult<Vec<Product>> {
        self.active(ProductFilterOptions {
            max_stock: Some(threshold),
            base: Self::sorted("stock_quantity", SortOrder::Asc),
            ..Default::default()
        })
        .await
    }

    /// Active products whose name or description contains `term`.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Product>> {
        debug!(term, "Searching products");
        self.active(ProductFilterOptions {
            base: BaseFilterOptions {
                search: Some(term.to_string()),
                search_fields: vec!["product_name".to_string(), "description".to_string()],
                ..Self::sorted("product_name", SortOrder::Asc)
            },
            ..Default::default()
        })
        .await
    }

    /// The `limit` most recently added active products.
    pub async fn newest(&self, limit: u32) -> DbResult<Vec<Product>> {
        self.active(ProductFilterOptions {
            base: BaseFilterOptions {
                limit: Some(limit),
                ..Self::sorted("created_at", SortOrder::Desc)
            },
            ..Default::default()
        })
        .await
    }
}
