//! Table-based migration lock.
//!
//! A reserved row (version `-1`) in the state table marks a running
//! migration. Inserting it relies on the primary key, so only one process
//! wins; the others poll until it is deleted or the timeout passes.

use crate::executor::DbExecutor;
use crate::migration::state_table::STATE_TABLE;
use crate::migration::MigrationError;
use std::time::{Duration, Instant};

const LOCK_VERSION: i64 = -1;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Holds the migration lock until dropped.
pub struct MigrationLockGuard<'a> {
    executor: &'a dyn DbExecutor,
}

impl<'a> MigrationLockGuard<'a> {
    pub fn acquire(executor: &'a dyn DbExecutor, timeout: Duration) -> Result<Self, MigrationError> {
        let start = Instant::now();
        let sql = format!(
            "INSERT INTO {STATE_TABLE} (version, name, checksum, applied_at) \
             VALUES ({LOCK_VERSION}, 'LOCK', 'lock', NOW()) \
             ON CONFLICT (version) DO NOTHING"
        );

        loop {
            if executor.execute(&sql, &[])? > 0 {
                log::debug!("migration lock acquired");
                return Ok(Self { executor });
            }
            if start.elapsed() >= timeout {
                return Err(MigrationError::LockTimeout(format!(
                    "not acquired within {timeout:?}; another process may be migrating. \
                     A stale lock can be removed with: DELETE FROM {STATE_TABLE} WHERE version = {LOCK_VERSION}"
                )));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Drop for MigrationLockGuard<'_> {
    fn drop(&mut self) {
        let sql = format!("DELETE FROM {STATE_TABLE} WHERE version = {LOCK_VERSION}");
        if let Err(e) = self.executor.execute(&sql, &[]) {
            log::warn!("failed to release migration lock: {e}");
        }
    }
}

/// Lock row version, excluded when listing applied migrations.
pub(crate) fn lock_version() -> i64 {
    LOCK_VERSION
}
