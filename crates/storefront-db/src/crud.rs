//! # Generic CRUD
//!
//! Create / read / update / delete for any [`Entity`], plus an atomic bulk
//! insert.
//!
//! ## Statement Shapes
//! ```text
//! create       INSERT INTO users (fullname, email, phone, address)
//!              VALUES ($1, $2, $3, $4) RETURNING id
//! read_all     SELECT <columns> FROM users ORDER BY id
//! read_by_id   SELECT <columns> FROM users WHERE id = $1
//! update       UPDATE users SET email = $1, updated_at = NOW() WHERE id = $2
//! delete       DELETE FROM users WHERE id = $1
//! delete_all   DELETE FROM users
//! create_many  BEGIN; INSERT ...; INSERT ...; COMMIT   (ROLLBACK on failure)
//! ```
//!
//! `update` and `delete` do not check that the row exists: touching zero
//! rows is not an error, the count is only logged.

use tracing::{debug, error, info, warn};

use crate::entity::{Entity, Insertable, Patch};
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::statement;
use crate::value::SqlValue;

// =============================================================================
// SQL builders
// =============================================================================

fn placeholders(from: usize, count: usize) -> String {
    (from..from + count)
        .map(|n| format!("${n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT INTO t (c1, c2) VALUES ($1, $2) RETURNING id` and its values.
pub(crate) fn insert_statement<E: Entity>(new: &E::New) -> (String, Vec<SqlValue>) {
    let (columns, values): (Vec<&str>, Vec<SqlValue>) = new.values().into_iter().unzip();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
        E::TABLE,
        columns.join(", "),
        placeholders(1, columns.len())
    );
    (sql, values)
}

/// `UPDATE t SET c1 = $1, ... WHERE id = $n`, or `None` for an empty patch.
pub(crate) fn update_statement<E: Entity>(
    id: i32,
    patch: &E::Patch,
) -> Option<(String, Vec<SqlValue>)> {
    let changes = patch.changes();
    if changes.is_empty() {
        return None;
    }

    let mut assignments: Vec<String> = changes
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ${}", i + 1))
        .collect();

    if E::HAS_UPDATED_AT {
        assignments.push("updated_at = NOW()".to_string());
    }

    let mut values: Vec<SqlValue> = changes.into_iter().map(|(_, value)| value).collect();
    values.push(SqlValue::Int(id));

    let sql = format!(
        "UPDATE {} SET {} WHERE id = ${}",
        E::TABLE,
        assignments.join(", "),
        values.len()
    );
    Some((sql, values))
}

fn select_all<E: Entity>() -> String {
    format!("SELECT {} FROM {} ORDER BY id", E::select_list(), E::TABLE)
}

fn select_by_id<E: Entity>() -> String {
    format!("SELECT {} FROM {} WHERE id = $1", E::select_list(), E::TABLE)
}

// =============================================================================
// Operations
// =============================================================================

impl Database {
    /// Inserts one row and returns its generated id.
    ///
    /// ## Errors
    /// - `ConstraintViolation` on a duplicate unique value (email, sku, ...)
    /// - `ForeignKeyViolation` when a referenced row does not exist
    pub async fn create<E: Entity>(&self, new: &E::New) -> DbResult<i32> {
        let (sql, values) = insert_statement::<E>(new);
        let id = statement::fetch_scalar::<i32, _>(self.pool(), &sql, &values).await?;
        info!(entity = E::NAME, id, "Inserted row");
        Ok(id)
    }

    /// Returns every row ordered by id.
    pub async fn read_all<E: Entity>(&self) -> DbResult<Vec<E>> {
        statement::fetch_all_as(self.pool(), &select_all::<E>(), &[]).await
    }

    /// Returns the row with `id`, or `None` when there is none.
    pub async fn read_by_id<E: Entity>(&self, id: i32) -> DbResult<Option<E>> {
        let row =
            statement::fetch_optional_as(self.pool(), &select_by_id::<E>(), &[SqlValue::Int(id)])
                .await?;
        if row.is_none() {
            debug!(entity = E::NAME, id, "No row with this id");
        }
        Ok(row)
    }

    /// Applies a partial update.
    ///
    /// Only the supplied fields are written; `updated_at` is refreshed on
    /// tables that have it. An empty patch sends nothing.
    pub async fn update<E: Entity>(&self, id: i32, patch: &E::Patch) -> DbResult<()> {
        let Some((sql, values)) = update_statement::<E>(id, patch) else {
            debug!(entity = E::NAME, id, "Empty patch, nothing to update");
            return Ok(());
        };

        let rows = statement::execute(self.pool(), &sql, &values).await?;
        info!(entity = E::NAME, id, rows, "Updated row");
        Ok(())
    }

    /// Deletes the row with `id`. Deleting a missing row is not an error.
    pub async fn delete<E: Entity>(&self, id: i32) -> DbResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let rows = statement::execute(self.pool(), &sql, &[SqlValue::Int(id)]).await?;
        info!(entity = E::NAME, id, rows, "Deleted row");
        Ok(())
    }

    /// Deletes every row of the table and returns how many were removed.
    pub async fn delete_all<E: Entity>(&self) -> DbResult<u64> {
        let sql = format!("DELETE FROM {}", E::TABLE);
        let rows = statement::execute(self.pool(), &sql, &[]).await?;
        info!(entity = E::NAME, rows, "Deleted all rows");
        Ok(rows)
    }

    /// Inserts every row in one transaction and returns their ids in order.
    ///
    /// ## Atomicity
    /// ```text
    /// BEGIN
    ///   INSERT row 1   ✓
    ///   INSERT row 2   ✗ duplicate email
    /// ROLLBACK         → row 1 is gone too, the error is returned
    /// ```
    pub async fn create_many<E: Entity>(&self, rows: &[E::New]) -> DbResult<Vec<i32>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool().begin().await.map_err(|e| {
            error!(entity = E::NAME, error = %e, "Could not begin transaction");
            DbError::from(e)
        })?;

        let mut ids = Vec::with_capacity(rows.len());
        for (index, new) in rows.iter().enumerate() {
            let (sql, values) = insert_statement::<E>(new);
            match statement::fetch_scalar::<i32, _>(&mut *tx, &sql, &values).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    warn!(entity = E::NAME, index, "Bulk insert failed, rolling back");
                    if let Err(rollback_err) = tx.rollback().await {
                        error!(error = %rollback_err, "Rollback failed");
                    }
                    return Err(e);
                }
            }
        }

        tx.commit().await.map_err(|e| {
            error!(entity = E::NAME, error = %e, "Commit failed");
            DbError::TransactionFailed(e.to_string())
        })?;

        info!(entity = E::NAME, count = ids.len(), "Bulk insert committed");
        Ok(ids)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{CartItem, CartItemPatch, NewUser, Product, ProductPatch, User, UserPatch};

    fn new_user() -> NewUser {
        NewUser {
            fullname: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: 1234567890,
            address: "123 Main St".to_string(),
        }
    }

    #[test]
    fn test_insert_statement() {
        let (sql, values) = insert_statement::<User>(&new_user());
        assert_eq!(
            sql,
            "INSERT INTO users (fullname, email, phone, address) VALUES ($1, $2, $3, $4) RETURNING id"
        );
        assert_eq!(values.len(), 4);
        assert_eq!(values[2], SqlValue::BigInt(1234567890));
    }

    #[test]
    fn test_update_statement_touches_only_supplied_fields() {
        let patch = UserPatch {
            email: Some("jane@example.com".to_string()),
            ..Default::default()
        };
        let (sql, values) = update_statement::<User>(7, &patch).unwrap();
        assert_eq!(
            sql,
            "UPDATE users SET email = $1, updated_at = NOW() WHERE id = $2"
        );
        assert_eq!(
            values,
            vec![
                SqlValue::Text("jane@example.com".to_string()),
                SqlValue::Int(7)
            ]
        );
    }

    #[test]
    fn test_update_without_updated_at_column() {
        let patch = CartItemPatch { quantity: Some(3) };
        let (sql, _) = update_statement::<CartItem>(1, &patch).unwrap();
        assert_eq!(sql, "UPDATE cart_items SET quantity = $1 WHERE id = $2");
    }

    #[test]
    fn test_empty_patch_builds_nothing() {
        assert!(update_statement::<Product>(1, &ProductPatch::default()).is_none());
    }

    #[test]
    fn test_select_statements() {
        assert_eq!(
            select_all::<User>(),
            "SELECT id, fullname, email, phone, address, created_at, updated_at FROM users ORDER BY id"
        );
        assert!(select_by_id::<Product>().ends_with("FROM products WHERE id = $1"));
    }
}
