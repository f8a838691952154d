//! # Repository Module
//!
//! Entity-specific access on top of the generic CRUD and filter builder.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Repository Pattern                                 │
//! │                                                                         │
//! │  CLI / seed                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UserRepository / ProductRepository                                    │
//! │  ├── validates input (storefront-core)                                 │
//! │  ├── generic CRUD  → Database::create::<User>(..)                     │
//! │  ├── filter        → user_query(..).fetch(..)                         │
//! │  └── conveniences  → canned filter options                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PgPool                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The other six tables have no repository: the generic operations on
//! [`Database`](crate::Database) cover them.

pub mod product;
pub mod user;
