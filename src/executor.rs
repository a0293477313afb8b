//! Database execution over `may_postgres`.
//!
//! [`DbExecutor`] is the seam every repository, migration and transaction
//! goes through, so the same code runs against a pooled connection or inside
//! an open transaction.

use may_postgres::types::ToSql;
use may_postgres::{Client, Error as PostgresError, Row};
use std::fmt;
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Executor error type
#[derive(Debug)]
pub enum DbError {
    /// `PostgreSQL` error from `may_postgres`
    PostgresError(PostgresError),
    /// Query could not be built or returned an unexpected shape
    QueryError(String),
    /// Row parsing/conversion error
    ParseError(String),
    /// Other execution errors
    Other(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::PostgresError(e) => write!(f, "PostgreSQL error: {e}"),
            DbError::QueryError(s) => write!(f, "Query error: {s}"),
            DbError::ParseError(s) => write!(f, "Parse error: {s}"),
            DbError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for DbError {}

impl From<PostgresError> for DbError {
    fn from(err: PostgresError) -> Self {
        DbError::PostgresError(err)
    }
}

/// Trait for executing database operations
///
/// Implemented by [`PgExecutor`] and by [`crate::transaction::Transaction`].
pub trait DbExecutor {
    /// Execute a statement and return the number of rows affected.
    fn execute(&self, query: &str, params: &[&dyn ToSql]) -> Result<u64, DbError>;

    /// Execute a query that must return exactly one row.
    fn query_one(&self, query: &str, params: &[&dyn ToSql]) -> Result<Row, DbError>;

    /// Execute a query and return all rows.
    fn query_all(&self, query: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, DbError>;
}

/// Types that can be built from a result row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, PostgresError>;
}

/// Parse every row, mapping driver errors to [`DbError::ParseError`].
pub fn parse_rows<T: FromRow>(rows: &[Row]) -> Result<Vec<T>, DbError> {
    rows.iter()
        .map(|row| {
            T::from_row(row).map_err(|e| DbError::ParseError(format!("Failed to parse row: {e}")))
        })
        .collect()
}

/// Executor over a single `may_postgres::Client`.
pub struct PgExecutor {
    client: Client,
}

impl PgExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Start a transaction on this connection.
    ///
    /// The connection must not be shared with other coroutines while the
    /// transaction is open; the pool guarantees that for pooled connections.
    pub fn begin(&self) -> Result<crate::transaction::Transaction<'_>, DbError> {
        crate::transaction::Transaction::begin(self)
    }

    /// Verify the connection still answers.
    pub fn check_health(&self) -> Result<(), DbError> {
        crate::connection::check_connection_health(&self.client)
            .map_err(|e| DbError::Other(format!("Health check error: {e}")))
    }

    fn timed<T>(
        &self,
        query: &str,
        run: impl FnOnce(&Client) -> Result<T, PostgresError>,
    ) -> Result<T, DbError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(query).entered();

        let start = Instant::now();
        let result = run(&self.client).map_err(|e| {
            #[cfg(feature = "metrics")]
            METRICS.record_query_error();
            log::debug!("query failed: {query}: {e}");
            DbError::PostgresError(e)
        });

        #[cfg(feature = "metrics")]
        METRICS.record_query_duration(start.elapsed());
        log::trace!("{query} took {:?}", start.elapsed());

        result
    }
}

impl DbExecutor for PgExecutor {
    fn execute(&self, query: &str, params: &[&dyn ToSql]) -> Result<u64, DbError> {
        self.timed(query, |client| client.execute(query, params))
    }

    fn query_one(&self, query: &str, params: &[&dyn ToSql]) -> Result<Row, DbError> {
        self.timed(query, |client| client.query_one(query, params))
    }

    fn query_all(&self, query: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, DbError> {
        self.timed(query, |client| client.query(query, params))
    }
}
