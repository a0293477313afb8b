//! Migration state table management

use crate::executor::DbExecutor;
use crate::migration::MigrationError;

pub const STATE_TABLE: &str = "petclinic_migrations";

/// Create `petclinic_migrations` and its index if they do not exist yet.
pub fn initialize_state_table(executor: &dyn DbExecutor) -> Result<(), MigrationError> {
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {STATE_TABLE} (
            version BIGINT PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            checksum VARCHAR(64) NOT NULL,
            applied_at TIMESTAMP NOT NULL,
            execution_time_ms INTEGER
        )
        "#
    );
    executor.execute(&sql, &[])?;

    let index_sql = format!(
        "CREATE INDEX IF NOT EXISTS idx_{STATE_TABLE}_applied_at ON {STATE_TABLE}(applied_at)"
    );
    executor.execute(&index_sql, &[])?;

    Ok(())
}
