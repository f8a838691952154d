//! # User Repository
//!
//! Database operations for users.
//!
//! ## Key Operations
//! - Validated insert / bulk insert / partial update
//! - Structured filtering with paging
//! - Canned lookups: by email domain, by name, recently registered

use chrono::{Duration, Utc};
use storefront_core::validation::{validate_email, validate_new_user};
use storefront_core::{
    BaseFilterOptions, FilterResponse, NewUser, SortOrder, User, UserFilterOptions, UserPatch,
    ValidationError,
};
use tracing::debug;

use crate::error::DbResult;
use crate::filter::user_query;
use crate::pool::Database;

/// Repository for user database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.users();
///
/// let id = repo.insert(&new_user).await?;
/// let user = repo.get_by_id(id).await?;
/// let gmail = repo.by_email_domain("gmail.com").await?;
/// ```
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(db: Database) -> Self {
        UserRepository { db }
    }

    /// Inserts a user and returns its id.
    ///
    /// ## Errors
    /// - `Validation` for a blank name, malformed email, non-positive phone
    /// - `ConstraintViolation { field: "email", .. }` when the email is taken
    pub async fn insert(&self, user: &NewUser) -> DbResult<i32> {
        validate_new_user(user)?;
        self.db.create::<User>(user).await
    }

    /// Inserts every user or none of them.
    pub async fn insert_many(&self, users: &[NewUser]) -> DbResult<Vec<i32>> {
        for user in users {
            validate_new_user(user)?;
        }
        self.db.create_many::<User>(users).await
    }

    /// Returns all users ordered by id.
    pub async fn get_all(&self) -> DbResult<Vec<User>> {
        self.db.read_all::<User>().await
    }

    /// Gets a user by id.
    ///
    /// ## Returns
    /// * `Ok(Some(user))` - User found
    /// * `Ok(None)` - No user with this id
    pub async fn get_by_id(&self, id: i32) -> DbResult<Option<User>> {
        self.db.read_by_id::<User>(id).await
    }

    /// Updates only the fields set in `patch`.
    pub async fn update(&self, id: i32, patch: &UserPatch) -> DbResult<()> {
        debug!(id, "Updating user");

        if let Some(email) = &patch.email {
            validate_email(email)?;
        }
        if patch.phone.is_some_and(|phone| phone <= 0) {
            return Err(ValidationError::MustBePositive {
                field: "phone".to_string(),
            }
            .into());
        }

        self.db.update::<User>(id, patch).await
    }

    pub async fn delete(&self, id: i32) -> DbResult<()> {
        self.db.delete::<User>(id).await
    }

    /// Deletes every user. Their orders keep a `NULL` user_id.
    pub async fn delete_all(&self) -> DbResult<u64> {
        self.db.delete_all::<User>().await
    }

    /// Runs a structured filter.
    pub async fn filter(&self, options: &UserFilterOptions) -> DbResult<FilterResponse<User>> {
        user_query(options)?.fetch(&self.db).await
    }

    // =========================================================================
    // Canned lookups
    // =========================================================================

    /// Users whose email ends in `@domain`.
    pub async fn by_email_domain(&self, domain: &str) -> DbResult<Vec<User>> {
        let options = UserFilterOptions {
            email_domain: Some(domain.to_string()),
            ..Default::default()
        };
        Ok(self.filter(&options).await?.data)
    }

    /// Users whose full name contains `pattern` (case-insensitive).
    pub async fn by_name_pattern(&self, pattern: &str) -> DbResult<Vec<User>> {
        let options = UserFilterOptions {
            fullname_contains: Some(pattern.to_string()),
            base: BaseFilterOptions {
                sort_by: Some("fullname".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        Ok(self.filter(&options).await?.data)
    }

    /// Users registered in the last `days` days, newest first.
    pub async fn recent(&self, days: u32) -> DbResult<Vec<User>> {
        let options = UserFilterOptions {
            created_after: Some(Utc::now() - Duration::days(i64::from(days))),
            base: BaseFilterOptions {
                sort_by: Some("created_at".to_string()),
                sort_order: Some(SortOrder::Desc),
                ..Default::default()
            },
            ..Default::default()
        };
        Ok(self.filter(&options).await?.data)
    }
}
