//! # storefront-db: Database Layer for Storefront
//!
//! PostgreSQL access for the storefront schema, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Data Flow                               │
//! │                                                                         │
//! │  storefront CLI / seed binary                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌───────────┐  ┌─────────┐  │   │
//! │  │  │  Database  │  │ Repositories │  │  Filter   │  │Analytics│  │   │
//! │  │  │ (pool.rs)  │  │ users        │  │  builder  │  │ joins   │  │   │
//! │  │  │            │◄─│ products     │─►│           │  │ sales   │  │   │
//! │  │  │ PgPool     │  └──────────────┘  └───────────┘  │ sets    │  │   │
//! │  │  │ crud.rs    │◄──────────────────────────────────└─────────┘  │   │
//! │  │  └────────────┘                                                 │   │
//! │  │  config.rs (env)   schema.rs (DDL)   entity.rs (table mapping)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     PostgreSQL                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Connection settings from the environment
//! - [`pool`] - Connection pool and raw query interface
//! - [`schema`] - Table DDL
//! - [`entity`] - Per-table mapping used by the generic CRUD
//! - [`crud`] - Generic create/read/update/delete and bulk insert
//! - [`filter`] - Parameterized filter builder for users and products
//! - [`repository`] - User and product repositories
//! - [`analytics`] - Fixed reporting queries
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let id = db.users().insert(&new_user).await?;
//! let cheap = db.products().in_price_range(min, max).await?;
//! let totals = db.analytics().sales_rollup().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod config;
pub mod crud;
pub mod entity;
pub mod error;
pub mod filter;
pub mod pool;
pub mod repository;
pub mod schema;
mod statement;
pub mod value;

// =============================================================================
// Re-exports
// =============================================================================

pub use analytics::{Analytics, Report};
pub use config::{ConfigError, DbConfig};
pub use entity::{Entity, Insertable, Patch};
pub use error::{DbError, DbResult};
pub use filter::FilterQuery;
pub use pool::Database;
pub use value::{SqlType, SqlValue};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
