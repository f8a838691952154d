//! # Database Pool Management
//!
//! Connection pool creation and the raw query interface for PostgreSQL.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  CLI / seed startup                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::from_env() ← PG* / DATABASE_URL / STOREFRONT_DB_*           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + initialize schema         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │              PgPool                      │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections = 20)   │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ Every call borrows a connection and returns it on drop,        │
//! │       │ including on error. Waiting callers give up after the          │
//! │       │ acquire timeout with DbError::PoolExhausted.                   │
//! │       ▼                                                                 │
//! │  db.users().filter(..)   db.create::<Product>(..)   db.analytics()..   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A broken connection never terminates the process: it surfaces as a
//! typed error on the call that hit it and as `false` from
//! [`Database::health_check`].

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::FromRow;
use tracing::{error, info};

use crate::analytics::Analytics;
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use crate::repository::user::UserRepository;
use crate::schema;
use crate::statement;
use crate::value::SqlValue;

// =============================================================================
// Database
// =============================================================================

/// Main database handle.
///
/// Cloning is cheap: clones share the same pool. Pass it explicitly to
/// whatever needs database access.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::from_env()?).await?;
///
/// let id = db.users().insert(&new_user).await?;
/// let page = db.products().filter(&options).await?;
/// let report = db.analytics().sales_by_category().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The PostgreSQL connection pool.
    pool: PgPool,
}

impl Database {
    /// Creates the connection pool.
    ///
    /// ## What This Does
    /// 1. Builds connect options from the URL or the individual fields
    /// 2. Creates the pool and opens `min_connections` connections
    /// 3. Creates missing tables (if `initialize_schema` is set)
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = DbConfig::new("postgres://postgres@localhost/storefront");
    /// let db = Database::new(config).await?;
    /// ```
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            target_db = %config.redacted_target(),
            "Initializing database connection"
        );

        let connect_options = config
            .connect_options()
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                error!(error = %e, "Could not connect to PostgreSQL");
                DbError::ConnectionFailed(e.to_string())
            })?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.initialize_schema {
            db.initialize_schema().await?;
        }

        Ok(db)
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Database { pool }
    }

    /// Creates every missing table, index and upgrade.
    ///
    /// Idempotent; safe on every startup.
    pub async fn initialize_schema(&self) -> DbResult<()> {
        schema::initialize_tables(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by the helpers.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    // Raw query interface
    // =========================================================================

    /// Runs a parameterized statement and returns the raw rows.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let rows = db
    ///     .execute_query("SELECT * FROM users WHERE id = $1", &[SqlValue::Int(1)])
    ///     .await?;
    /// ```
    pub async fn execute_query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<PgRow>> {
        statement::fetch_rows(&self.pool, sql, params).await
    }

    /// Runs a parameterized statement and returns the affected row count.
    pub async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
        statement::execute(&self.pool, sql, params).await
    }

    /// Runs a parameterized statement and decodes each row into `T`.
    pub async fn fetch_all_as<T>(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        statement::fetch_all_as(&self.pool, sql, params).await
    }

    // =========================================================================
    // Repositories
    // =========================================================================

    /// Returns the user repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let gmail = db.users().by_email_domain("gmail.com").await?;
    /// ```
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.clone())
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.clone())
    }

    /// Returns the reporting queries.
    pub fn analytics(&self) -> Analytics {
        Analytics::new(self.clone())
    }

    /// Closes the database connection pool.
    ///
    /// ## Note
    /// After calling close, every operation fails with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    ///
    /// ## Returns
    /// * `true` - Database is responsive
    /// * `false` - Database is unavailable or the pool is closed
    pub async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Database health check failed");
                false
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unreachable_config() -> DbConfig {
        // Port 1 on loopback refuses immediately.
        DbConfig::new("postgres://postgres@127.0.0.1:1/storefront")
            .acquire_timeout(Duration::from_millis(500))
            .initialize_schema(false)
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_failed() {
        let result = Database::new(unreachable_config()).await;
        assert!(matches!(result, Err(DbError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_lazy_pool_reports_unhealthy() {
        let options = unreachable_config().connect_options().unwrap();
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy_with(options);
        let db = Database::from_pool(pool);

        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_unhealthy() {
        let options = unreachable_config().connect_options().unwrap();
        let db = Database::from_pool(PgPoolOptions::new().connect_lazy_with(options));
        db.close().await;

        assert!(!db.health_check().await);
        let err = db.execute("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}
