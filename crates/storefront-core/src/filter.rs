//! # Filter Options
//!
//! Structured, all-optional filter inputs for the user and product filters,
//! and the response envelope they return.
//!
//! ## Shape
//! ```text
//! ProductFilterOptions
//! ├── base: BaseFilterOptions      (paging, sorting, free-text search)
//! ├── id / ids
//! ├── product_name / product_name_contains / description_contains
//! ├── min_price / max_price / price_range
//! ├── min_stock / max_stock / stock_range
//! ├── category_id(s) / brand_id(s)
//! ├── sku / sku_contains
//! ├── has_image / is_active
//! └── created_* / updated_*
//! ```
//!
//! Options deserialize from camelCase JSON, so `{"pageSize": 10}` works.
//! Every field is optional; an empty options value means "everything,
//! ordered by id".

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::DEFAULT_PAGE_SIZE;

// =============================================================================
// Sorting
// =============================================================================

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// =============================================================================
// Range
// =============================================================================

/// Inclusive `[min, max]` range, rendered as `BETWEEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T> Range<T> {
    pub fn new(min: T, max: T) -> Self {
        Range { min, max }
    }
}

impl<T: PartialOrd + ToString> Range<T> {
    /// Rejects ranges whose lower bound is above the upper bound.
    pub fn validate(&self, field: &str) -> Result<(), ValidationError> {
        if self.min > self.max {
            return Err(ValidationError::InvalidRange {
                field: field.to_string(),
                min: self.min.to_string(),
                max: self.max.to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Resolved paging mode. The two modes are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// 1-based page number plus page size.
    Page { page: u32, page_size: u32 },
    /// Raw window. `limit: None` with an offset skips rows without capping.
    Window { limit: Option<u32>, offset: Option<u32> },
}

impl Pagination {
    /// SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        match *self {
            Pagination::Page { page, page_size } => {
                u64::from(page.saturating_sub(1)) * u64::from(page_size)
            }
            Pagination::Window { offset, .. } => u64::from(offset.unwrap_or(0)),
        }
    }

    /// SQL LIMIT value, if any.
    pub fn limit(&self) -> Option<u32> {
        match *self {
            Pagination::Page { page_size, .. } => Some(page_size),
            Pagination::Window { limit, .. } => limit,
        }
    }
}

/// `ceil(total / page_size)`; zero rows means zero pages.
pub fn total_pages(total: i64, page_size: u32) -> i64 {
    if total <= 0 || page_size == 0 {
        return 0;
    }
    let size = i64::from(page_size);
    (total + size - 1) / size
}

// =============================================================================
// Base Options
// =============================================================================

/// Paging, sorting and free-text search shared by every entity filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseFilterOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,

    /// Column name; checked against the entity's allow-list.
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,

    /// Free-text term matched case-insensitively against `search_fields`.
    pub search: Option<String>,
    pub search_fields: Vec<String>,
}

impl BaseFilterOptions {
    /// Resolves the paging mode.
    ///
    /// Page mode wins when both `page` and `limit`/`offset` are given. A page
    /// without a size uses [`DEFAULT_PAGE_SIZE`]; a size without a page is
    /// page 1.
    pub fn pagination(&self) -> Result<Option<Pagination>, ValidationError> {
        if self.page.is_some() || self.page_size.is_some() {
            let page = self.page.unwrap_or(1);
            let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
            crate::validation::validate_page(page, page_size)?;
            return Ok(Some(Pagination::Page { page, page_size }));
        }

        if self.limit.is_some() || self.offset.is_some() {
            return Ok(Some(Pagination::Window {
                limit: self.limit,
                offset: self.offset,
            }));
        }

        Ok(None)
    }

    /// Trimmed search term, or `None` when blank or when no fields are named.
    pub fn search_term(&self) -> Option<&str> {
        if self.search_fields.is_empty() {
            return None;
        }
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

// =============================================================================
// User Options
// =============================================================================

/// Filters over the `users` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFilterOptions {
    #[serde(flatten)]
    pub base: BaseFilterOptions,

    pub id: Option<i32>,
    pub ids: Vec<i32>,

    pub fullname: Option<String>,
    pub fullname_contains: Option<String>,

    pub email: Option<String>,
    pub email_contains: Option<String>,

    /// Matches the part after `@`, e.g. `gmail.com`.
    pub email_domain: Option<String>,

    pub phone: Option<i64>,
    pub phone_starts_with: Option<String>,

    pub address_contains: Option<String>,

    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
}

// =============================================================================
// Product Options
// =============================================================================

/// Filters over the `products` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFilterOptions {
    #[serde(flatten)]
    pub base: BaseFilterOptions,

    pub id: Option<i32>,
    pub ids: Vec<i32>,

    pub product_name: Option<String>,
    pub product_name_contains: Option<String>,
    pub description_contains: Option<String>,

    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub price_range: Option<Range<Decimal>>,

    pub min_stock: Option<i32>,
    pub max_stock: Option<i32>,
    pub stock_range: Option<Range<i32>>,

    pub category_id: Option<i32>,
    pub category_ids: Vec<i32>,

    pub brand_id: Option<i32>,
    pub brand_ids: Vec<i32>,

    pub sku: Option<String>,
    pub sku_contains: Option<String>,

    /// `true`: non-empty image_url. `false`: null or empty.
    pub has_image: Option<bool>,
    pub is_active: Option<bool>,

    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
}

// =============================================================================
// Response
// =============================================================================

/// Result of a filter call.
///
/// Paging fields are only present in page mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse<T> {
    pub data: Vec<T>,

    /// Rows matching the conditions, before LIMIT/OFFSET.
    pub total: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_previous_page: Option<bool>,
}

impl<T> FilterResponse<T> {
    /// Builds the envelope, filling paging metadata in page mode.
    pub fn new(data: Vec<T>, total: i64, pagination: Option<Pagination>) -> Self {
        match pagination {
            Some(Pagination::Page { page, page_size }) => {
                let pages = total_pages(total, page_size);
                FilterResponse {
                    data,
                    total,
                    page: Some(page),
                    page_size: Some(page_size),
                    total_pages: Some(pages),
                    has_next_page: Some(i64::from(page) < pages),
                    has_previous_page: Some(page > 1),
                }
            }
            _ => FilterResponse {
                data,
                total,
                page: None,
                page_size: None,
                total_pages: None,
                has_next_page: None,
                has_previous_page: None,
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
