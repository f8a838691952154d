//! # Filter Builder
//!
//! Turns structured filter options into one parameterized `SELECT`, a
//! matching `COUNT(*)`, and a [`FilterResponse`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Filter Execution                                   │
//! │                                                                         │
//! │  ProductFilterOptions                                                  │
//! │       │  validate (ranges, paging, allow-listed identifiers)           │
//! │       ▼                                                                 │
//! │  FilterQuery                                                           │
//! │  ├── conditions: ["price BETWEEN $1 AND $2", "is_active = $3", ...]   │
//! │  ├── params:     [Decimal(10), Decimal(20), Bool(true)]               │
//! │  ├── order_by:   "price DESC, id DESC"                                 │
//! │  └── pagination: Page { page: 2, page_size: 10 }                       │
//! │       │                                                                 │
//! │       ├──► SELECT COUNT(*) FROM products WHERE ...      → total        │
//! │       └──► SELECT ... WHERE ... ORDER BY ... LIMIT OFFSET → data       │
//! │                                                                         │
//! │  Both statements share the same WHERE clause and the same values.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Injection Safety
//! Values are always bound as `$n` parameters. The only caller-chosen text
//! that reaches SQL is a column name, and column names are first resolved
//! against the entity's allow-list to a `&'static str` from this crate.

pub mod product;
pub mod user;

use std::marker::PhantomData;

use storefront_core::validation::validate_identifier;
use storefront_core::{BaseFilterOptions, FilterResponse, Pagination, SortOrder};
use tracing::debug;

use crate::entity::Entity;
use crate::error::DbResult;
use crate::pool::Database;
use crate::statement;
use crate::value::SqlValue;

pub use product::product_query;
pub use user::user_query;

/// Escapes `%`, `_` and `\` so the text matches literally inside LIKE.
///
/// ## Example
/// ```rust
/// use storefront_db::filter::like_escape;
///
/// assert_eq!(like_escape("50%_off"), "50\\%\\_off");
/// ```
pub fn like_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// FilterQuery
// =============================================================================

/// A filter under construction for entity `E`.
#[derive(Debug, Clone)]
pub struct FilterQuery<E: Entity> {
    conditions: Vec<String>,
    params: Vec<SqlValue>,
    order_by: String,
    pagination: Option<Pagination>,
    entity: PhantomData<E>,
}

impl<E: Entity> Default for FilterQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> FilterQuery<E> {
    /// An unfiltered query: every row, ordered by id.
    pub fn new() -> Self {
        FilterQuery {
            conditions: Vec::new(),
            params: Vec::new(),
            order_by: "id ASC".to_string(),
            pagination: None,
            entity: PhantomData,
        }
    }

    /// Binds a value and returns its placeholder (`$n`).
    fn push(&mut self, value: impl Into<SqlValue>) -> String {
        self.params.push(value.into());
        format!("${}", self.params.len())
    }

    // -------------------------------------------------------------------------
    // Conditions
    // -------------------------------------------------------------------------

    /// `column = $n`
    pub fn eq(&mut self, column: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        let p = self.push(value);
        self.conditions.push(format!("{column} = {p}"));
        self
    }

    /// `column ILIKE '%text%'`, with the text matched literally.
    pub fn contains(&mut self, column: &'static str, text: &str) -> &mut Self {
        let p = self.push(format!("%{}%", like_escape(text)));
        self.conditions.push(format!("{column} ILIKE {p}"));
        self
    }

    /// `column ILIKE '%suffix'`
    pub fn ends_with(&mut self, column: &'static str, suffix: &str) -> &mut Self {
        let p = self.push(format!("%{}", like_escape(suffix)));
        self.conditions.push(format!("{column} ILIKE {p}"));
        self
    }

    /// `CAST(column AS TEXT) LIKE 'prefix%'`, for numeric columns.
    pub fn text_starts_with(&mut self, column: &'static str, prefix: &str) -> &mut Self {
        let p = self.push(format!("{}%", like_escape(prefix)));
        self.conditions
            .push(format!("CAST({column} AS TEXT) LIKE {p}"));
        self
    }

    /// `column BETWEEN $n AND $n+1` (inclusive)
    pub fn between(
        &mut self,
        column: &'static str,
        min: impl Into<SqlValue>,
        max: impl Into<SqlValue>,
    ) -> &mut Self {
        let lo = self.push(min);
        let hi = self.push(max);
        self.conditions
            .push(format!("{column} BETWEEN {lo} AND {hi}"));
        self
    }

    /// `column >= $n`
    pub fn gte(&mut self, column: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        let p = self.push(value);
        self.conditions.push(format!("{column} >= {p}"));
        self
    }

    /// `column <= $n`
    pub fn lte(&mut self, column: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        let p = self.push(value);
        self.conditions.push(format!("{column} <= {p}"));
        self
    }

    /// `column = ANY($n)`. An empty list adds nothing.
    pub fn any(&mut self, column: &'static str, ids: &[i32]) -> &mut Self {
        if ids.is_empty() {
            return self;
        }
        let p = self.push(ids.to_vec());
        self.conditions.push(format!("{column} = ANY({p})"));
        self
    }

    /// Non-empty (`true`) or null/empty (`false`) text column.
    pub fn present(&mut self, column: &'static str, present: bool) -> &mut Self {
        let condition = if present {
            format!("({column} IS NOT NULL AND {column} <> '')")
        } else {
            format!("({column} IS NULL OR {column} = '')")
        };
        self.conditions.push(condition);
        self
    }

    /// `(f1 ILIKE $n OR f2 ILIKE $n ...)`, one bound value reused.
    ///
    /// Every field must be one of the entity's searchable columns.
    pub fn search(&mut self, fields: &[String], term: &str) -> DbResult<&mut Self> {
        let columns = fields
            .iter()
            .map(|field| validate_identifier("searchFields", field, E::SEARCHABLE))
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Ok(self);
        }

        let p = self.push(format!("%{}%", like_escape(term)));
        let disjunction = columns
            .iter()
            .map(|column| format!("{column} ILIKE {p}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.conditions.push(format!("({disjunction})"));
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Ordering & paging
    // -------------------------------------------------------------------------

    /// Sets `ORDER BY`; the column must be one of the entity's columns.
    ///
    /// Any column other than `id` gets `id` as a tiebreaker so pages are
    /// stable.
    pub fn sort(&mut self, sort_by: Option<&str>, order: Option<SortOrder>) -> DbResult<&mut Self> {
        let column = match sort_by {
            Some(name) => validate_identifier("sortBy", name, E::COLUMNS)?,
            None => "id",
        };
        let direction = order.unwrap_or_default().as_sql();
        self.order_by = if column == "id" {
            format!("id {direction}")
        } else {
            format!("{column} {direction}, id {direction}")
        };
        Ok(self)
    }

    pub fn paginate(&mut self, pagination: Option<Pagination>) -> &mut Self {
        self.pagination = pagination;
        self
    }

    /// Applies paging, sorting and search from the shared options.
    pub fn apply_base(&mut self, base: &BaseFilterOptions) -> DbResult<&mut Self> {
        if let Some(term) = base.search_term() {
            self.search(&base.search_fields, term)?;
        }
        self.sort(base.sort_by.as_deref(), base.sort_order)?;
        self.paginate(base.pagination()?);
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// The data statement.
    pub fn select_sql(&self) -> String {
        let mut sql = format!(
            "SELECT {} FROM {}{} ORDER BY {}",
            E::select_list(),
            E::TABLE,
            self.where_clause(),
            self.order_by
        );

        if let Some(pagination) = self.pagination {
            if let Some(limit) = pagination.limit() {
                sql.push_str(&format!(" LIMIT {limit}"));
            }
            let offset = pagination.offset();
            if offset > 0 {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
        }

        sql
    }

    /// The count statement; same conditions, no ordering or paging.
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}{}", E::TABLE, self.where_clause())
    }

    /// Values for `$1..$n`, shared by both statements.
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    /// Runs the count and data statements.
    pub async fn fetch(&self, db: &Database) -> DbResult<FilterResponse<E>> {
        debug!(
            table = E::TABLE,
            conditions = self.conditions.len(),
            "Running filter"
        );

        let total: i64 = statement::fetch_scalar(db.pool(), &self.count_sql(), &self.params).await?;
        let data: Vec<E> =
            statement::fetch_all_as(db.pool(), &self.select_sql(), &self.params).await?;

        debug!(table = E::TABLE, total, returned = data.len(), "Filter complete");
        Ok(FilterResponse::new(data, total, self.pagination))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
