//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL error (sqlx::Error, SQLSTATE code)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Classified by SQLSTATE, logged at the call    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller (CLI, seed) ← Decides what to do; nothing retries here         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Classification
//! ```text
//! 23505 unique_violation       → ConstraintViolation { field: "email" ... }
//! 23503 foreign_key_violation  → ForeignKeyViolation
//! 23502 / 23514 not-null/check → ConstraintViolation
//! PoolTimedOut                 → PoolExhausted
//! Io / Tls / PoolClosed        → ConnectionFailed
//! anything else from the server→ QueryFailed (message verbatim)
//! ```

use sqlx::error::ErrorKind;
use storefront_core::ValidationError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// Point lookups return `Ok(None)` instead; this is for operations that
    /// require the row (e.g. `fetch_one` on a report).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique, not-null or check constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate email or SKU
    /// - Adding the same product to a cart twice
    /// - Negative quantity on an order line
    #[error("Constraint {constraint} violated on {field}: {detail}")]
    ConstraintViolation {
        /// Server-side constraint name, e.g. `users_email_key`.
        constraint: String,
        /// Offending column, e.g. `email`.
        field: String,
        /// Server detail line, e.g. `Key (email)=(a@b.c) already exists.`
        detail: String,
    },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent user, order or product
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database unreachable or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema creation failed.
    #[error("Schema initialization failed: {0}")]
    SchemaInit(String),

    /// Malformed SQL, type mismatch, or any other server-side failure.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// BEGIN / COMMIT / ROLLBACK failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Input rejected before any SQL was sent.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Internal database error (row decoding, driver bugs).
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// True for unique / not-null / check violations.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, DbError::ConstraintViolation { .. })
    }

    /// The conflicting column for a constraint violation.
    pub fn violated_field(&self) -> Option<&str> {
        match self {
            DbError::ConstraintViolation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Pulls the column name out of a PostgreSQL detail line.
///
/// `Key (email)=(john@example.com) already exists.` → `email`
fn field_from_detail(detail: &str) -> Option<String> {
    let start = detail.find("Key (")? + "Key (".len();
    let end = detail[start..].find(')')? + start;
    Some(detail[start..end].to_string())
}

/// Guesses the column from a constraint name.
///
/// `users_email_key` → `email`, `products_sku_key` → `sku`
fn field_from_constraint(constraint: &str, table: Option<&str>) -> String {
    let trimmed = constraint
        .strip_suffix("_key")
        .or_else(|| constraint.strip_suffix("_check"))
        .or_else(|| constraint.strip_suffix("_fkey"))
        .unwrap_or(constraint);

    match table.and_then(|t| trimmed.strip_prefix(t)) {
        Some(rest) => rest.trim_start_matches('_').to_string(),
        None => trimmed.to_string(),
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Classified by ErrorKind / SQLSTATE
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::Io / Tls       → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                let table = db_err.table().map(str::to_string);

                let pg = db_err.try_downcast_ref::<sqlx::postgres::PgDatabaseError>();
                let detail = pg
                    .and_then(|e| e.detail())
                    .map(str::to_string)
                    .unwrap_or_else(|| message.clone());
                let column = pg.and_then(|e| e.column()).map(str::to_string);

                match db_err.kind() {
                    ErrorKind::UniqueViolation | ErrorKind::CheckViolation => {
                        let field = field_from_detail(&detail).unwrap_or_else(|| {
                            field_from_constraint(&constraint, table.as_deref())
                        });
                        DbError::ConstraintViolation {
                            constraint,
                            field,
                            detail,
                        }
                    }
                    ErrorKind::NotNullViolation => DbError::ConstraintViolation {
                        field: column.unwrap_or_else(|| "unknown".to_string()),
                        constraint: "not_null".to_string(),
                        detail: message,
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                        message: format!("{message} ({detail})"),
                    },
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::Tls(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::Configuration(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_detail() {
        assert_eq!(
            field_from_detail("Key (email)=(john@example.com) already exists."),
            Some("email".to_string())
        );
        assert_eq!(
            field_from_detail("Key (user_id, product_id)=(1, 2) already exists."),
            Some("user_id, product_id".to_string())
        );
        assert_eq!(field_from_detail("no key here"), None);
    }

    #[test]
    fn test_field_from_constraint() {
        assert_eq!(field_from_constraint("users_email_key", Some("users")), "email");
        assert_eq!(field_from_constraint("products_sku_key", Some("products")), "sku");
        assert_eq!(field_from_constraint("custom", None), "custom");
    }

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));
    }

    #[test]
    fn test_pool_closed_maps_to_connection_failed() {
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }

    #[test]
    fn test_violated_field() {
        let err = DbError::ConstraintViolation {
            constraint: "users_email_key".to_string(),
            field: "email".to_string(),
            detail: "Key (email)=(a@b.c) already exists.".to_string(),
        };
        assert!(err.is_constraint_violation());
        assert_eq!(err.violated_field(), Some("email"));
        assert_eq!(DbError::PoolExhausted.violated_field(), None);
    }

    #[test]
    fn test_validation_converts() {
        let err: DbError = ValidationError::Required {
            field: "email".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
