//! # Bound Parameter Values
//!
//! Every caller-supplied value travels to PostgreSQL as a positional
//! parameter (`$1`, `$2`, ...). [`SqlValue`] is the owned, inspectable form of
//! such a parameter, so a statement and its values can be built (and tested)
//! without a connection and bound later.
//!
//! ## Flow
//! ```text
//! NewUser / UserPatch / filter options
//!        │  Insertable::values(), Patch::changes(), FilterQuery::push()
//!        ▼
//! Vec<SqlValue>             ← plain data, compared in unit tests
//!        │  BindValues::bind_values()
//!        ▼
//! sqlx Query / QueryAs / QueryScalar  ──►  PgPool / Transaction
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::Postgres;

/// Column type of a typed SQL `NULL`.
///
/// PostgreSQL needs a type even for `NULL` parameters, so clearing a
/// nullable column carries the column's type along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Int,
    BigInt,
    Text,
    Bool,
    Decimal,
    Timestamp,
}

/// A single bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i32),
    BigInt(i64),
    Text(String),
    Bool(bool),
    Decimal(Decimal),
    Timestamp(DateTime<Utc>),
    /// `INT[]`, used with `= ANY($n)`.
    IntArray(Vec<i32>),
    /// `TEXT[]`, used with `= ANY($n)`.
    TextArray(Vec<String>),
    Null(SqlType),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }
}

// =============================================================================
// Conversions
// =============================================================================

/// Maps a Rust type to the [`SqlType`] used for its `NULL`.
pub trait SqlTyped {
    const SQL_TYPE: SqlType;
}

macro_rules! sql_value_from {
    ($ty:ty, $variant:ident, $sql_type:ident) => {
        impl From<$ty> for SqlValue {
            fn from(value: $ty) -> Self {
                SqlValue::$variant(value)
            }
        }

        impl SqlTyped for $ty {
            const SQL_TYPE: SqlType = SqlType::$sql_type;
        }
    };
}

sql_value_from!(i32, Int, Int);
sql_value_from!(i64, BigInt, BigInt);
sql_value_from!(String, Text, Text);
sql_value_from!(bool, Bool, Bool);
sql_value_from!(Decimal, Decimal, Decimal);
sql_value_from!(DateTime<Utc>, Timestamp, Timestamp);

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<Vec<i32>> for SqlValue {
    fn from(value: Vec<i32>) -> Self {
        SqlValue::IntArray(value)
    }
}

impl From<Vec<String>> for SqlValue {
    fn from(value: Vec<String>) -> Self {
        SqlValue::TextArray(value)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue> + SqlTyped,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null(T::SQL_TYPE),
        }
    }
}

// =============================================================================
// Binding
// =============================================================================

/// Binds [`SqlValue`]s onto a sqlx query builder in order.
pub trait BindValues: Sized {
    fn bind_value(self, value: &SqlValue) -> Self;

    fn bind_values(self, values: &[SqlValue]) -> Self {
        values.iter().fold(self, |query, value| query.bind_value(value))
    }
}

macro_rules! bind_sql_value {
    ($query:expr, $value:expr) => {
        match $value {
            SqlValue::Int(v) => $query.bind(*v),
            SqlValue::BigInt(v) => $query.bind(*v),
            SqlValue::Text(v) => $query.bind(v.clone()),
            SqlValue::Bool(v) => $query.bind(*v),
            SqlValue::Decimal(v) => $query.bind(*v),
            SqlValue::Timestamp(v) => $query.bind(*v),
            SqlValue::IntArray(v) => $query.bind(v.clone()),
            SqlValue::TextArray(v) => $query.bind(v.clone()),
            SqlValue::Null(SqlType::Int) => $query.bind(None::<i32>),
            SqlValue::Null(SqlType::BigInt) => $query.bind(None::<i64>),
            SqlValue::Null(SqlType::Text) => $query.bind(None::<String>),
            SqlValue::Null(SqlType::Bool) => $query.bind(None::<bool>),
            SqlValue::Null(SqlType::Decimal) => $query.bind(None::<Decimal>),
            SqlValue::Null(SqlType::Timestamp) => $query.bind(None::<DateTime<Utc>>),
        }
    };
}

impl<'q> BindValues for Query<'q, Postgres, PgArguments> {
    fn bind_value(self, value: &SqlValue) -> Self {
        bind_sql_value!(self, value)
    }
}

impl<'q, O> BindValues for QueryAs<'q, Postgres, O, PgArguments> {
    fn bind_value(self, value: &SqlValue) -> Self {
        bind_sql_value!(self, value)
    }
}

impl<'q, O> BindValues for QueryScalar<'q, Postgres, O, PgArguments> {
    fn bind_value(self, value: &SqlValue) -> Self {
        bind_sql_value!(self, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_none_keeps_type() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null(SqlType::Int));
        assert_eq!(
            SqlValue::from(None::<String>),
            SqlValue::Null(SqlType::Text)
        );
        assert!(SqlValue::from(None::<Decimal>).is_null());
    }

    #[test]
    fn test_option_some_unwraps() {
        assert_eq!(SqlValue::from(Some(7)), SqlValue::Int(7));
        assert_eq!(
            SqlValue::from(Some("x".to_string())),
            SqlValue::Text("x".to_string())
        );
    }

    #[test]
    fn test_phone_is_bigint() {
        assert_eq!(SqlValue::from(5_551_234_567_i64), SqlValue::BigInt(5_551_234_567));
    }
}
