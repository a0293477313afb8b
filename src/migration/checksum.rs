//! Checksum calculation for migration files

use sha2::{Digest, Sha256};

/// Hex SHA-256 of a migration script.
///
/// Stored when the migration is applied and compared on every later run so
/// edits to an applied file are detected.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
