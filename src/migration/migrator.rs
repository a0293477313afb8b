//! Migrator - applies SQL migration files in version order.

use crate::executor::{parse_rows, DbExecutor, PgExecutor};
use crate::migration::file::discover_migrations;
use crate::migration::lock::{lock_version, MigrationLockGuard};
use crate::migration::state_table::{initialize_state_table, STATE_TABLE};
use crate::migration::{MigrationError, MigrationFile, MigrationRecord, MigrationStatus};
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Migrator {
    migrations_dir: PathBuf,
}

impl Migrator {
    pub fn new(migrations_dir: impl AsRef<Path>) -> Self {
        Self {
            migrations_dir: migrations_dir.as_ref().to_path_buf(),
        }
    }

    pub fn discover_migrations(&self) -> Result<Vec<MigrationFile>, MigrationError> {
        discover_migrations(&self.migrations_dir)
    }

    /// Compare files on disk with the state table.
    ///
    /// Fails when an applied file was edited (checksum mismatch) or removed.
    pub fn status(&self, executor: &dyn DbExecutor) -> Result<MigrationStatus, MigrationError> {
        initialize_state_table(executor)?;

        let files = self.discover_migrations()?;
        let applied = Self::query_applied_migrations(executor)?;
        plan(files, applied)
    }

    /// Apply every pending migration, each in its own transaction.
    ///
    /// Returns the number of migrations applied.
    pub fn up(&self, executor: &PgExecutor) -> Result<usize, MigrationError> {
        initialize_state_table(executor)?;
        let _lock = MigrationLockGuard::acquire(executor, LOCK_TIMEOUT)?;

        let status = self.status(executor)?;
        for migration in &status.pending {
            self.apply(executor, migration)?;
        }
        Ok(status.pending.len())
    }

    fn apply(&self, executor: &PgExecutor, migration: &MigrationFile) -> Result<(), MigrationError> {
        log::info!("applying migration m{}_{}", migration.version, migration.name);
        let start = Instant::now();
        let failed = |error: String| MigrationError::ExecutionFailed {
            version: migration.version,
            name: migration.name.clone(),
            error,
        };

        let tx = executor.begin()?;
        for statement in migration.statements() {
            tx.execute(&statement, &[]).map_err(|e| failed(e.to_string()))?;
        }

        let record = MigrationRecord {
            version: migration.version,
            name: migration.name.clone(),
            checksum: migration.checksum.clone(),
            applied_at: Utc::now().naive_utc(),
            execution_time_ms: Some(i32::try_from(start.elapsed().as_millis()).unwrap_or(i32::MAX)),
        };
        Self::record_migration(&tx, &record)?;
        tx.commit()?;
        Ok(())
    }

    fn query_applied_migrations(executor: &dyn DbExecutor) -> Result<Vec<MigrationRecord>, MigrationError> {
        let sql = format!(
            "SELECT version, name, checksum, applied_at, execution_time_ms \
             FROM {STATE_TABLE} WHERE version <> $1 ORDER BY version ASC"
        );
        let rows = executor.query_all(&sql, &[&lock_version()])?;
        Ok(parse_rows(&rows)?)
    }

    fn record_migration(executor: &dyn DbExecutor, record: &MigrationRecord) -> Result<(), MigrationError> {
        let sql = format!(
            "INSERT INTO {STATE_TABLE} (version, name, checksum, applied_at, execution_time_ms) \
             VALUES ($1, $2, $3, $4, $5)"
        );
        executor.execute(
            &sql,
            &[
                &record.version,
                &record.name,
                &record.checksum,
                &record.applied_at,
                &record.execution_time_ms,
            ],
        )?;
        Ok(())
    }
}

/// Split files into applied and pending against the recorded migrations.
fn plan(files: Vec<MigrationFile>, applied: Vec<MigrationRecord>) -> Result<MigrationStatus, MigrationError> {
    let file_versions: HashSet<i64> = files.iter().map(|f| f.version).collect();
    if let Some(orphan) = applied.iter().find(|r| !file_versions.contains(&r.version)) {
        return Err(MigrationError::MissingFile {
            version: orphan.version,
            name: orphan.name.clone(),
        });
    }

    let mut applied_records = Vec::new();
    let mut pending = Vec::new();
    for file in files {
        match applied.iter().find(|r| r.version == file.version) {
            Some(record) if record.checksum != file.checksum => {
                return Err(MigrationError::ChecksumMismatch {
                    version: file.version,
                    name: file.name,
                    stored: record.checksum.clone(),
                    current: file.checksum,
                });
            }
            Some(record) => applied_records.push(record.clone()),
            None => pending.push(file),
        }
    }

    Ok(MigrationStatus::new(applied_records, pending))
}
