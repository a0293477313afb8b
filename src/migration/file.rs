//! Migration file discovery and parsing

use crate::migration::{calculate_checksum, MigrationError};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// A discovered migration script.
#[derive(Debug, Clone)]
pub struct MigrationFile {
    pub path: PathBuf,

    /// Migration version (timestamp: YYYYMMDDHHMMSS)
    pub version: i64,

    /// Human-readable migration name
    pub name: String,

    /// SHA-256 checksum of the file content
    pub checksum: String,

    /// Script text
    pub sql: String,
}

impl MigrationFile {
    /// Parse migration file name to extract version and name
    ///
    /// Expected format: `m{YYYYMMDDHHMMSS}_{name}.sql`, e.g.
    /// `m20240101000000_create_schema.sql` → (20240101000000, "create_schema").
    pub fn parse_filename(filename: &str) -> Result<(i64, String), MigrationError> {
        let re = Regex::new(r"^m(\d{14})_(.+)\.sql$")
            .map_err(|e| MigrationError::InvalidFormat(format!("Invalid regex: {e}")))?;

        let invalid = || {
            MigrationError::InvalidFormat(format!(
                "Migration file name '{filename}' does not match expected pattern: m{{YYYYMMDDHHMMSS}}_{{name}}.sql"
            ))
        };
        let caps = re.captures(filename).ok_or_else(invalid)?;
        let (Some(version), Some(name)) = (caps.get(1), caps.get(2)) else {
            return Err(invalid());
        };
        let version = version
            .as_str()
            .parse::<i64>()
            .map_err(|e| MigrationError::InvalidFormat(format!("Invalid version in '{filename}': {e}")))?;

        Ok((version, name.as_str().to_string()))
    }

    /// Read and fingerprint one migration script.
    pub fn load(path: &Path) -> Result<Self, MigrationError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MigrationError::InvalidFormat(format!("Invalid filename: {}", path.display())))?;
        let (version, name) = Self::parse_filename(filename)?;
        let sql = fs::read_to_string(path).map_err(|e| {
            MigrationError::FileNotFound(format!("Failed to read migration file {}: {e}", path.display()))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            version,
            name,
            checksum: calculate_checksum(&sql),
            sql,
        })
    }

    pub fn statements(&self) -> Vec<String> {
        split_statements(&self.sql)
    }
}

/// Discover all `.sql` migrations in a directory, oldest version first.
pub fn discover_migrations(migrations_dir: &Path) -> Result<Vec<MigrationFile>, MigrationError> {
    if !migrations_dir.exists() {
        return Err(MigrationError::FileNotFound(
            migrations_dir.to_string_lossy().to_string(),
        ));
    }

    if !migrations_dir.is_dir() {
        return Err(MigrationError::InvalidFormat(format!(
            "Path is not a directory: {}",
            migrations_dir.display()
        )));
    }

    let entries = fs::read_dir(migrations_dir).map_err(|e| {
        MigrationError::FileNotFound(format!(
            "Failed to read migrations directory {}: {e}",
            migrations_dir.display()
        ))
    })?;

    let mut migrations = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| MigrationError::FileNotFound(format!("Failed to read directory entry: {e}")))?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) != Some("sql") {
            continue;
        }

        migrations.push(MigrationFile::load(&path)?);
    }

    migrations.sort_by_key(|m| m.version);

    if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(MigrationError::InvalidFormat(format!(
            "Duplicate migration version {} ({} and {})",
            pair[0].version,
            pair[0].path.display(),
            pair[1].path.display()
        )));
    }

    Ok(migrations)
}

/// Split a script into statements on `;`.
///
/// Semicolons inside single-quoted literals and `--` comments do not end a
/// statement. Comment-only and empty statements are dropped.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            '-' if !in_quote && chars.peek() == Some(&'-') => {
                // Skip to end of line.
                for next in chars.by_ref() {
                    if next == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            ';' if !in_quote => {
                push_statement(&mut statements, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_filename() {
        let (version, name) =
            MigrationFile::parse_filename("m20240101000000_create_schema.sql").expect("valid");
        assert_eq!(version, 20240101000000);
        assert_eq!(name, "create_schema");
    }

    #[test]
    fn test_parse_filename_rejects_bad_names() {
        assert!(MigrationFile::parse_filename("create_schema.sql").is_err());
        assert!(MigrationFile::parse_filename("m2024_create_schema.sql").is_err());
        assert!(MigrationFile::parse_filename("m20240101000000_create_schema.rs").is_err());
    }

    #[test]
    fn test_split_statements_respects_quotes_and_comments() {
        let script = "-- owners; pets\nCREATE TABLE a (id INT);\n\
                      INSERT INTO a VALUES ('semi;colon', 'it''s');\n\n  ;\n-- trailing";
        let statements = split_statements(script);
        assert_eq!(
            statements,
            [
                "CREATE TABLE a (id INT)",
                "INSERT INTO a VALUES ('semi;colon', 'it''s')",
            ]
        );
    }

    #[test]
    fn test_discover_sorts_and_skips_other_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        for (file, body) in [
            ("m20240101000100_seed.sql", "INSERT INTO t VALUES (1);"),
            ("m20240101000000_schema.sql", "CREATE TABLE t (id INT);"),
            ("README.md", "not a migration"),
        ] {
            let mut f = std::fs::File::create(dir.path().join(file)).expect("create");
            f.write_all(body.as_bytes()).expect("write");
        }

        let found = discover_migrations(dir.path()).expect("discover");
        let names: Vec<_> = found.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["schema", "seed"]);
        assert_eq!(found[0].statements(), ["CREATE TABLE t (id INT)"]);
        assert_eq!(found[1].checksum, calculate_checksum("INSERT INTO t VALUES (1);"));
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = discover_migrations(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, MigrationError::FileNotFound(_)));
    }

    #[test]
    fn test_duplicate_versions_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("m20240101000000_a.sql"), "SELECT 1;").expect("write");
        std::fs::write(dir.path().join("m20240101000000_b.sql"), "SELECT 2;").expect("write");
        assert!(matches!(
            discover_migrations(dir.path()),
            Err(MigrationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_bundled_migrations_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
        let found = discover_migrations(&dir).expect("bundled migrations");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|m| !m.statements().is_empty()));
    }
}
