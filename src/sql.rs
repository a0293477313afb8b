//! Bridge from `sea-query` statements to `may_postgres` parameters.
//!
//! Statements are built with `sea-query` and rendered with
//! `PostgresQueryBuilder`, which yields SQL with `$n` placeholders plus a list
//! of `sea_query::Value`s. The values are first copied into owned, typed
//! [`Param`]s and then borrowed as `&dyn ToSql` for the duration of the call.

use crate::executor::{parse_rows, DbError, DbExecutor, FromRow};
use chrono::NaiveDate;
use may_postgres::types::ToSql;
use sea_query::{PostgresQueryBuilder, QueryStatementWriter, Value, Values};

#[derive(Debug, Clone, PartialEq)]
enum Param {
    Bool(Option<bool>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
}

impl Param {
    fn from_value(value: &Value) -> Result<Self, DbError> {
        let param = match value {
            Value::Bool(b) => Param::Bool(*b),
            Value::TinyInt(i) => Param::Int(i.map(i32::from)),
            Value::SmallInt(i) => Param::Int(i.map(i32::from)),
            Value::Int(i) => Param::Int(*i),
            Value::BigInt(i) => Param::BigInt(*i),
            Value::TinyUnsigned(u) => Param::Int(u.map(i32::from)),
            Value::SmallUnsigned(u) => Param::Int(u.map(i32::from)),
            Value::Unsigned(u) => Param::BigInt(u.map(i64::from)),
            Value::String(Some(s)) => Param::Text(Some(String::clone(s))),
            Value::String(None) => Param::Text(None),
            Value::ChronoDate(Some(d)) => Param::Date(Some(NaiveDate::clone(d))),
            Value::ChronoDate(None) => Param::Date(None),
            other => {
                return Err(DbError::QueryError(format!(
                    "Unsupported value type in query: {other:?}"
                )))
            }
        };
        Ok(param)
    }

    fn as_sql(&self) -> &dyn ToSql {
        match self {
            Param::Bool(v) => v,
            Param::Int(v) => v,
            Param::BigInt(v) => v,
            Param::Text(v) => v,
            Param::Date(v) => v,
        }
    }
}

/// Convert `values` to driver parameters and run `f` with them.
pub fn with_converted_params<F, R>(values: &Values, f: F) -> Result<R, DbError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, DbError>,
{
    let owned = values
        .iter()
        .map(Param::from_value)
        .collect::<Result<Vec<_>, _>>()?;
    let params: Vec<&dyn ToSql> = owned.iter().map(Param::as_sql).collect();
    f(&params)
}

/// Build and run a statement, returning the rows it produced.
pub fn fetch_rows<S, E>(executor: &E, statement: &S) -> Result<Vec<may_postgres::Row>, DbError>
where
    S: QueryStatementWriter,
    E: DbExecutor + ?Sized,
{
    let (sql, values) = statement.build(PostgresQueryBuilder);
    with_converted_params(&values, |params| executor.query_all(&sql, params))
}

/// Build and run a statement, parsing every row as `T`.
pub fn fetch_all<T, S, E>(executor: &E, statement: &S) -> Result<Vec<T>, DbError>
where
    T: FromRow,
    S: QueryStatementWriter,
    E: DbExecutor + ?Sized,
{
    parse_rows(&fetch_rows(executor, statement)?)
}

/// Build and run a statement, returning the affected row count.
pub fn execute<S, E>(executor: &E, statement: &S) -> Result<u64, DbError>
where
    S: QueryStatementWriter,
    E: DbExecutor + ?Sized,
{
    let (sql, values) = statement.build(PostgresQueryBuilder);
    with_converted_params(&values, |params| executor.execute(&sql, params))
}

/// Run a statement ending in `RETURNING id` and read the generated key.
pub fn insert_returning_id<S, E>(executor: &E, statement: &S) -> Result<i32, DbError>
where
    S: QueryStatementWriter,
    E: DbExecutor + ?Sized,
{
    let (sql, values) = statement.build(PostgresQueryBuilder);
    let row = with_converted_params(&values, |params| executor.query_one(&sql, params))?;
    row.try_get::<_, i32>(0)
        .map_err(|e| DbError::ParseError(format!("Failed to read generated id: {e}")))
}
