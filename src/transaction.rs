//! Transactions over a single pooled connection.
//!
//! A [`Transaction`] issues `BEGIN` when created and `COMMIT` when
//! committed. Dropping an uncommitted transaction rolls it back.

use crate::executor::{DbError, DbExecutor, PgExecutor};
use may_postgres::types::ToSql;
use may_postgres::Row;

pub struct Transaction<'a> {
    executor: &'a PgExecutor,
    finished: bool,
}

impl<'a> Transaction<'a> {
    /// `BEGIN` at the server's default isolation level (read committed).
    pub fn begin(executor: &'a PgExecutor) -> Result<Self, DbError> {
        executor.execute("BEGIN", &[])?;
        Ok(Self {
            executor,
            finished: false,
        })
    }

    pub fn commit(mut self) -> Result<(), DbError> {
        self.finished = true;
        self.executor.execute("COMMIT", &[]).map(|_| ())
    }
}

impl DbExecutor for Transaction<'_> {
    fn execute(&self, query: &str, params: &[&dyn ToSql]) -> Result<u64, DbError> {
        self.executor.execute(query, params)
    }

    fn query_one(&self, query: &str, params: &[&dyn ToSql]) -> Result<Row, DbError> {
        self.executor.query_one(query, params)
    }

    fn query_all(&self, query: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, DbError> {
        self.executor.query_all(query, params)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.executor.execute("ROLLBACK", &[]) {
                log::warn!("rollback of abandoned transaction failed: {e}");
            }
        }
    }
}
