//! SQL migrations.
//!
//! Scripts named `m{YYYYMMDDHHMMSS}_{name}.sql` live in the migrations
//! directory. Each applied script is recorded with its SHA-256 checksum in
//! the `petclinic_migrations` table; pending scripts run in version order,
//! one transaction per script.

mod checksum;
mod error;
mod file;
mod lock;
mod migrator;
mod record;
mod startup;
mod state_table;
mod status;

pub use checksum::calculate_checksum;
pub use error::MigrationError;
pub use file::{discover_migrations, split_statements, MigrationFile};
pub use migrator::Migrator;
pub use record::MigrationRecord;
pub use startup::startup_migrations;
pub use state_table::{initialize_state_table, STATE_TABLE};
pub use status::MigrationStatus;
