//! `MigrationRecord` - Represents entries in the `petclinic_migrations` state table

use crate::executor::FromRow;
use chrono::NaiveDateTime;
use may_postgres::{Error as PostgresError, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    /// Migration version (timestamp: YYYYMMDDHHMMSS)
    pub version: i64,

    pub name: String,

    /// `SHA-256` checksum of the script when it was applied
    pub checksum: String,

    /// When the migration was applied (UTC)
    pub applied_at: NaiveDateTime,

    /// Execution time in milliseconds (`None` if not recorded)
    pub execution_time_ms: Option<i32>,
}

impl FromRow for MigrationRecord {
    /// Expected column order: `version`, `name`, `checksum`, `applied_at`, `execution_time_ms`
    fn from_row(row: &Row) -> Result<Self, PostgresError> {
        Ok(Self {
            version: row.try_get(0)?,
            name: row.try_get(1)?,
            checksum: row.try_get(2)?,
            applied_at: row.try_get(3)?,
            execution_time_ms: row.try_get(4)?,
        })
    }
}
