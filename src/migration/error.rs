//! Migration-specific error types

use crate::executor::DbError;
use crate::pool::PoolError;

#[derive(Debug)]
pub enum MigrationError {
    /// Database execution error
    Database(DbError),
    /// No pooled connection to run migrations on
    Pool(PoolError),
    /// Migrations directory or file could not be read
    FileNotFound(String),
    /// Migration file name or content is malformed
    InvalidFormat(String),
    /// An applied migration file was edited afterwards
    ChecksumMismatch {
        version: i64,
        name: String,
        stored: String,
        current: String,
    },
    /// Another process holds the migration lock
    LockTimeout(String),
    /// A statement of the migration failed
    ExecutionFailed {
        version: i64,
        name: String,
        error: String,
    },
    /// Applied migration whose file is gone
    MissingFile { version: i64, name: String },
}

impl std::fmt::Display for MigrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationError::Database(e) => write!(f, "Database error: {e}"),
            MigrationError::Pool(e) => write!(f, "No connection for migrations: {e}"),
            MigrationError::FileNotFound(path) => write!(f, "Migration file not found: {path}"),
            MigrationError::InvalidFormat(msg) => write!(f, "Invalid migration format: {msg}"),
            MigrationError::ChecksumMismatch {
                version,
                name,
                stored,
                current,
            } => write!(
                f,
                "Migration '{name}' (version {version}) has been modified after being applied.\n\
                 Stored checksum: {stored}\n\
                 Current checksum: {current}"
            ),
            MigrationError::LockTimeout(msg) => write!(f, "Migration lock timeout: {msg}"),
            MigrationError::ExecutionFailed { version, name, error } => write!(
                f,
                "Migration '{name}' (version {version}) failed during execution: {error}"
            ),
            MigrationError::MissingFile { version, name } => write!(
                f,
                "Applied migration file not found: m{version}_{name}.sql"
            ),
        }
    }
}

impl std::error::Error for MigrationError {}

impl From<DbError> for MigrationError {
    fn from(error: DbError) -> Self {
        MigrationError::Database(error)
    }
}

impl From<PoolError> for MigrationError {
    fn from(error: PoolError) -> Self {
        MigrationError::Pool(error)
    }
}
