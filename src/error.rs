//! Application-level error type.

use crate::executor::DbError;
use crate::migration::MigrationError;
use crate::pool::PoolError;

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    /// A referenced owner or pet does not exist.
    #[error("{entity} Id not found: {id}")]
    NotFound { entity: &'static str, id: i32 },

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Request that cannot be bound at all (bad path id, unreadable body).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Deliberately raised by `/oups`.
    #[error("{0}")]
    Crash(String),

    #[error("{0}")]
    Internal(String),
}

impl ClinicError {
    pub fn owner_not_found(id: i32) -> Self {
        ClinicError::NotFound { entity: "Owner", id }
    }

    pub fn pet_not_found(id: i32) -> Self {
        ClinicError::NotFound { entity: "Pet", id }
    }
}

pub type Result<T, E = ClinicError> = std::result::Result<T, E>;
