//! Versioned schema migrations read from `NNN_name.sql` files.

use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use crate::error::{Result, KgpathError};

struct Migration {
    version: u32,
    name: String,
    sql: String,
}

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );",
    )?;
    Ok(())
}

/// Versions recorded in `schema_migrations`
pub fn applied_versions(conn: &Connection) -> Result<BTreeSet<u32>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get::<_, u32>(0))?
        .collect::<std::result::Result<BTreeSet<_>, rusqlite::Error>>()?;
    Ok(versions)
}

/// "001_graph_tables.sql" -> (1, "001_graph_tables")
fn parse_file_name(file_name: &str) -> Result<(u32, String)> {
    let stem = file_name
        .strip_suffix(".sql")
        .ok_or_else(|| KgpathError::Config(format!("Not a migration file: {}", file_name)))?;
    let version = stem
        .split_once('_')
        .and_then(|(prefix, _)| prefix.parse::<u32>().ok())
        .ok_or_else(|| KgpathError::Config(format!("Migration without version prefix: {}", file_name)))?;
    Ok((version, stem.to_string()))
}

fn load_migrations(migrations_dir: &Path) -> Result<Vec<Migration>> {
    let entries = fs::read_dir(migrations_dir).map_err(|e| {
        KgpathError::Config(format!(
            "Cannot read migrations directory {}: {}",
            migrations_dir.display(),
            e
        ))
    })?;

    let mut migrations = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("sql") {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let (version, name) = parse_file_name(&file_name)?;
        let sql = fs::read_to_string(&path)?;
        migrations.push(Migration { version, name, sql });
    }

    migrations.sort_by_key(|m| m.version);
    if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(KgpathError::Config(format!(
            "Duplicate migration version {}: {} and {}",
            pair[0].version, pair[0].name, pair[1].name
        )));
    }
    Ok(migrations)
}

/// Apply every migration not yet recorded, each in its own transaction.
///
/// Returns the number of migrations applied.
pub fn run_migrations(conn: &mut Connection, migrations_dir: &Path) -> Result<usize> {
    ensure_migrations_table(conn)?;
    let applied = applied_versions(conn)?;

    let pending: Vec<Migration> = load_migrations(migrations_dir)?
        .into_iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();
    if pending.is_empty() {
        log::debug!("Schema up to date ({} migrations)", applied.len());
        return Ok(0);
    }

    for migration in &pending {
        log::info!("Applying migration {}", migration.name);
        let tx = conn.transaction()?;
        tx.execute_batch(&migration.sql).map_err(|e| {
            KgpathError::Config(format!("Migration {} failed: {}", migration.name, e))
        })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![migration.version, migration.name],
        )?;
        tx.commit()?;
    }

    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_migrations() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
    }

    fn names_of(conn: &Connection, kind: &str) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name")
            .unwrap()
            .query_map([kind], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            .unwrap()
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(parse_file_name("001_graph_tables.sql").unwrap(), (1, "001_graph_tables".to_string()));
        assert_eq!(parse_file_name("12_x.sql").unwrap().0, 12);
        assert!(parse_file_name("graph_tables.sql").is_err());
        assert!(parse_file_name("001.sql").is_err());
    }

    #[test]
    fn test_load_migrations_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("002_second.sql"), "CREATE TABLE second (id INTEGER);").unwrap();
        fs::write(dir.join("001_first.sql"), "CREATE TABLE first (id INTEGER);").unwrap();
        fs::write(dir.join("README.md"), "not a migration").unwrap();

        let versions: Vec<u32> = load_migrations(dir).unwrap().iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[test]
    fn test_duplicate_version_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("001_a.sql"), "SELECT 1;").unwrap();
        fs::write(dir.join("001_b.sql"), "SELECT 1;").unwrap();
        assert!(matches!(load_migrations(dir), Err(KgpathError::Config(_))));
    }

    #[test]
    fn test_missing_migrations_dir() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_migrations(&temp_dir.path().join("nope")).err().unwrap();
        assert!(matches!(err, KgpathError::Config(_)));
    }

    #[test]
    fn test_graph_schema() {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = Connection::open(temp_dir.path().join("test.db")).unwrap();

        assert_eq!(run_migrations(&mut conn, &project_migrations()).unwrap(), 1);

        let tables = names_of(&conn, "table");
        for table in ["entities", "relationships", "schema_migrations"] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
        let indexes = names_of(&conn, "index");
        for index in ["idx_entities_name", "idx_relationships_low", "idx_relationships_high"] {
            assert!(indexes.contains(&index.to_string()), "missing {index}");
        }
    }

    #[test]
    fn test_migrations_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = Connection::open(temp_dir.path().join("test.db")).unwrap();

        run_migrations(&mut conn, &project_migrations()).unwrap();
        assert_eq!(run_migrations(&mut conn, &project_migrations()).unwrap(), 0);
        assert_eq!(applied_versions(&conn).unwrap(), BTreeSet::from([1]));
    }

    #[test]
    fn test_only_new_migrations_applied() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("migrations");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("001_first.sql"), "CREATE TABLE first (id INTEGER);").unwrap();
        let mut conn = Connection::open(temp_dir.path().join("test.db")).unwrap();
        assert_eq!(run_migrations(&mut conn, &dir).unwrap(), 1);

        fs::write(dir.join("002_second.sql"), "CREATE TABLE second (id INTEGER);").unwrap();
        assert_eq!(run_migrations(&mut conn, &dir).unwrap(), 1);
        assert_eq!(applied_versions(&conn).unwrap(), BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_failed_migration_not_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("migrations");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("001_broken.sql"), "CREATE TABLE (;").unwrap();
        let mut conn = Connection::open(temp_dir.path().join("test.db")).unwrap();

        assert!(matches!(run_migrations(&mut conn, &dir), Err(KgpathError::Config(_))));
        assert!(applied_versions(&conn).unwrap().is_empty());
    }
}
