//! Migration status tracking

use crate::migration::{MigrationFile, MigrationRecord};

#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Applied migrations (from the database)
    pub applied: Vec<MigrationRecord>,

    /// Pending migrations (from the file system), oldest first
    pub pending: Vec<MigrationFile>,
}

impl MigrationStatus {
    pub fn new(applied: Vec<MigrationRecord>, pending: Vec<MigrationFile>) -> Self {
        Self { applied, pending }
    }

    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn latest_applied_version(&self) -> Option<i64> {
        self.applied.iter().map(|m| m.version).max()
    }

    pub fn next_pending_version(&self) -> Option<i64> {
        self.pending.first().map(|m| m.version)
    }
}
