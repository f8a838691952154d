//! Filter flags for the `users` and `products` commands.
//!
//! Every option is reachable through `--filter '<json>'` (camelCase, the
//! same shape the library deserializes); the common ones also have flags,
//! which override the JSON.

use anyhow::Context;
use clap::Args;
use rust_decimal::Decimal;
use storefront_core::{
    BaseFilterOptions, ProductFilterOptions, Range, SortOrder, UserFilterOptions,
};

/// Paging, sorting and search flags shared by both commands.
#[derive(Debug, Args)]
pub struct BaseArgs {
    /// Full options as camelCase JSON, e.g. '{"emailDomain":"gmail.com"}'
    #[arg(long)]
    filter: Option<String>,

    /// Free-text search term
    #[arg(long)]
    search: Option<String>,

    /// Columns to search (repeatable)
    #[arg(long = "search-field")]
    search_fields: Vec<String>,

    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    page_size: Option<u32>,

    #[arg(long)]
    limit: Option<u32>,

    #[arg(long)]
    offset: Option<u32>,

    /// Column to sort by
    #[arg(long)]
    sort_by: Option<String>,

    /// Sort descending
    #[arg(long)]
    desc: bool,
}

impl BaseArgs {
    fn apply(self, base: &mut BaseFilterOptions) {
        if self.search.is_some() {
            base.search = self.search;
        }
        if !self.search_fields.is_empty() {
            base.search_fields = self.search_fields;
        }
        base.page = self.page.or(base.page);
        base.page_size = self.page_size.or(base.page_size);
        base.limit = self.limit.or(base.limit);
        base.offset = self.offset.or(base.offset);
        if self.sort_by.is_some() {
            base.sort_by = self.sort_by;
        }
        if self.desc {
            base.sort_order = Some(SortOrder::Desc);
        }
    }
}

fn parse_json<T: serde::de::DeserializeOwned + Default>(json: Option<&str>) -> anyhow::Result<T> {
    match json {
        Some(json) => serde_json::from_str(json).context("--filter is not valid filter JSON"),
        None => Ok(T::default()),
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(flatten)]
    base: BaseArgs,

    /// Name contains (case-insensitive)
    #[arg(long)]
    name: Option<String>,

    /// Email domain, e.g. gmail.com
    #[arg(long)]
    email_domain: Option<String>,

    /// Phone number prefix
    #[arg(long)]
    phone_prefix: Option<String>,
}

impl UserArgs {
    pub fn into_options(self) -> anyhow::Result<UserFilterOptions> {
        let mut options: UserFilterOptions = parse_json(self.base.filter.as_deref())?;

        if self.name.is_some() {
            options.fullname_contains = self.name;
        }
        if self.email_domain.is_some() {
            options.email_domain = self.email_domain;
        }
        if self.phone_prefix.is_some() {
            options.phone_starts_with = self.phone_prefix;
        }

        self.base.apply(&mut options.base);
        Ok(options)
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[command(flatten)]
    base: BaseArgs,

    /// Name contains (case-insensitive)
    #[arg(long)]
    name: Option<String>,

    /// Lowest price, inclusive
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Highest price, inclusive
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Category id (repeatable)
    #[arg(long = "category")]
    categories: Vec<i32>,

    /// Brand id (repeatable)
    #[arg(long = "brand")]
    brands: Vec<i32>,

    /// Only active products
    #[arg(long)]
    active: bool,

    /// Only products with an image
    #[arg(long)]
    with_image: bool,
}

impl ProductArgs {
    pub fn into_options(self) -> anyhow::Result<ProductFilterOptions> {
        let mut options: ProductFilterOptions = parse_json(self.base.filter.as_deref())?;

        if self.name.is_some() {
            options.product_name_contains = self.name;
        }
        match (self.min_price, self.max_price) {
            (Some(min), Some(max)) => options.price_range = Some(Range::new(min, max)),
            (min, max) => {
                options.min_price = min.or(options.min_price);
                options.max_price = max.or(options.max_price);
            }
        }
        if !self.categories.is_empty() {
            options.category_ids = self.categories;
        }
        if !self.brands.is_empty() {
            options.brand_ids = self.brands;
        }
        if self.active {
            options.is_active = Some(true);
        }
        if self.with_image {
            options.has_image = Some(true);
        }

        self.base.apply(&mut options.base);
        Ok(options)
    }
}
