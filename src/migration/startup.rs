//! In-process migration execution helpers

use crate::migration::{MigrationError, Migrator};
use crate::pool::PgPool;
use std::path::Path;

/// Apply pending migrations before the server starts.
///
/// Fails fast: when a migration cannot be applied the application should
/// not serve requests against a half-migrated schema.
pub fn startup_migrations(pool: &PgPool, migrations_dir: impl AsRef<Path>) -> Result<usize, MigrationError> {
    let conn = pool.acquire()?;
    let migrator = Migrator::new(migrations_dir);
    let applied = migrator.up(&conn)?;

    if applied > 0 {
        log::info!("Applied {applied} migration(s) on startup");
    } else {
        log::debug!("No pending migrations to apply");
    }
    Ok(applied)
}
