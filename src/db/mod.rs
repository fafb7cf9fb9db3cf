use rusqlite::Connection;
use std::path::Path;
use crate::error::{Result, KgpathError};

/// Database connection wrapper
pub struct Db {
    path: std::path::PathBuf,
}

impl Db {
    /// Create a new database connection manager
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Open a new database connection with the graph store pragmas
    ///
    /// A connection that cannot be opened means the store is unreachable.
    pub fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(|e| {
            KgpathError::StoreUnavailable(format!(
                "cannot open {}: {}",
                self.path.display(),
                e
            ))
        })?;

        // WAL for readers during ingestion, foreign keys so edges cannot
        // outlive their endpoints
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON; \
             PRAGMA temp_store = MEMORY; \
             PRAGMA cache_size = -65536;"
        )?;

        Ok(conn)
    }

    /// Open a connection and bring the schema up to date
    pub fn open_migrated(&self, migrations_dir: &Path) -> Result<Connection> {
        let mut conn = self.open_connection()?;
        migrate::run_migrations(&mut conn, migrations_dir)?;
        Ok(conn)
    }
}

pub mod migrate;
