//! # storefront-core: Data Model for the Storefront Layer
//!
//! Entities, filter options and validation rules shared by the database
//! layer and the CLI. Nothing in here touches the network or the disk.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    storefront CLI                               │   │
//! │  │    init, demo, report, users, products                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    storefront-db                                │   │
//! │  │      PgPool, generic CRUD, filter builder, reports              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ storefront-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                   │   │
//! │  │   │   types   │  │  filter   │  │ validation│                   │   │
//! │  │   │  User     │  │  options  │  │   rules   │                   │   │
//! │  │   │  Product  │  │  response │  │  checks   │                   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity rows plus their insert and partial-update shapes
//! - [`filter`] - Filter options, pagination and the filter response envelope
//! - [`error`] - Validation error type
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::filter::{Pagination, ProductFilterOptions, Range};
//! use rust_decimal::Decimal;
//!
//! let options = ProductFilterOptions {
//!     price_range: Some(Range::new(Decimal::from(10), Decimal::from(20))),
//!     is_active: Some(true),
//!     ..Default::default()
//! };
//! assert!(options.price_range.is_some());
//!
//! let page = Pagination::Page { page: 2, page_size: 10 };
//! assert_eq!(page.offset(), 10);
//! ```

pub mod error;
pub mod filter;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use filter::{
    BaseFilterOptions, FilterResponse, Pagination, ProductFilterOptions, Range, SortOrder,
    UserFilterOptions,
};
pub use types::*;

/// Page size used when a caller asks for paging without a size.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on a single page so one request cannot pull the whole table
/// through the paging API.
pub const MAX_PAGE_SIZE: u32 = 1000;
