//! Timed, logged statement execution.
//!
//! Every statement the crate sends goes through one of these helpers, so
//! each one logs its first line and duration at `debug`, and failures log
//! at `error` before being classified into [`DbError`].
//!
//! The helpers take any executor: `&PgPool` for one-shot calls, or
//! `&mut *tx` inside a transaction.

use std::time::Instant;

use sqlx::postgres::PgRow;
use sqlx::{Executor, FromRow, Postgres};
use tracing::{debug, error};

use crate::error::{DbError, DbResult};
use crate::value::{BindValues, SqlValue};

/// First non-empty line of a statement, for log lines.
pub(crate) fn summary(sql: &str) -> &str {
    sql.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

fn finish<T>(sql: &str, started: Instant, result: Result<T, sqlx::Error>) -> DbResult<T> {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(value) => {
            debug!(statement = summary(sql), elapsed_ms, "Executed statement");
            Ok(value)
        }
        Err(e) => {
            error!(statement = summary(sql), elapsed_ms, error = %e, "Statement failed");
            Err(DbError::from(e))
        }
    }
}

/// Runs a statement and returns the raw rows.
pub(crate) async fn fetch_rows<'c, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> DbResult<Vec<PgRow>>
where
    E: Executor<'c, Database = Postgres>,
{
    let started = Instant::now();
    let result = sqlx::query(sql)
        .bind_values(params)
        .fetch_all(executor)
        .await;
    let rows = finish(sql, started, result)?;
    debug!(rows = rows.len(), "Rows returned");
    Ok(rows)
}

/// Runs a statement and decodes every row into `T`.
pub(crate) async fn fetch_all_as<'c, T, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> DbResult<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: Executor<'c, Database = Postgres>,
{
    let started = Instant::now();
    let result = sqlx::query_as::<_, T>(sql)
        .bind_values(params)
        .fetch_all(executor)
        .await;
    finish(sql, started, result)
}

/// Runs a statement expected to return at most one row.
pub(crate) async fn fetch_optional_as<'c, T, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> DbResult<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: Executor<'c, Database = Postgres>,
{
    let started = Instant::now();
    let result = sqlx::query_as::<_, T>(sql)
        .bind_values(params)
        .fetch_optional(executor)
        .await;
    finish(sql, started, result)
}

/// Runs a statement returning a single scalar (`COUNT(*)`, `RETURNING id`).
pub(crate) async fn fetch_scalar<'c, T, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> DbResult<T>
where
    T: Send + Unpin,
    (T,): for<'r> FromRow<'r, PgRow>,
    E: Executor<'c, Database = Postgres>,
{
    let started = Instant::now();
    let result = sqlx::query_scalar::<_, T>(sql)
        .bind_values(params)
        .fetch_one(executor)
        .await;
    finish(sql, started, result)
}

/// Runs a statement and returns the number of rows it touched.
pub(crate) async fn execute<'c, E>(executor: E, sql: &str, params: &[SqlValue]) -> DbResult<u64>
where
    E: Executor<'c, Database = Postgres>,
{
    let started = Instant::now();
    let result = sqlx::query(sql).bind_values(params).execute(executor).await;
    let rows_affected = finish(sql, started, result)?.rows_affected();
    debug!(rows_affected, "Statement complete");
    Ok(rows_affected)
}
