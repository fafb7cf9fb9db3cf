//! Graph store backends.
//!
//! The pipeline talks to storage only through [`GraphStore`]. Writes are
//! individually fallible so callers can skip a rejected item and keep going.

mod memory;
mod sqlite;
mod traversal;

pub use memory::MemoryGraphStore;
pub use sqlite::SqliteGraphStore;

use serde::Serialize;

use crate::config::{GraphConfig, StorageKind};
use crate::db::Db;
use crate::error::Result;
use crate::graph::{Entity, RawPath, WeightedEdge};

/// Store-assigned identifier of a created entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntityHandle(pub i64);

/// Size of a stored graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub entity_count: usize,
    pub relationship_count: usize,
    pub total_frequency: u64,
}

/// Storage collaborator for graph construction and path queries.
pub trait GraphStore {
    /// Remove every entity and relationship.
    fn clear_all(&mut self) -> Result<()>;

    /// Create one entity. Fails with `StoreWrite` if (name, tag) already exists.
    fn create_entity(&mut self, entity: &Entity) -> Result<EntityHandle>;

    /// Create one weighted edge between two existing entities.
    ///
    /// Fails with `StoreWrite` if an endpoint is missing and with
    /// `InvalidRelationType` if the label is not a valid identifier.
    fn create_relationship(&mut self, edge: &WeightedEdge) -> Result<()>;

    /// All paths of 1..=`max_depth` undirected edges from any entity named
    /// `source` to any entity named `target`. An edge is used at most once per
    /// path. Unknown names yield no paths.
    fn find_paths(&self, source: &str, target: &str, max_depth: usize) -> Result<Vec<RawPath>>;

    fn stats(&self) -> Result<GraphStats>;
}

/// Open the backend selected by configuration.
pub fn open_store(config: &GraphConfig) -> Result<Box<dyn GraphStore>> {
    match config.storage {
        StorageKind::Memory => {
            log::info!("Using in-memory graph store");
            Ok(Box::new(MemoryGraphStore::new()))
        }
        StorageKind::Sqlite => {
            log::info!("Using SQLite graph store at {}", config.db_path.display());
            let db = Db::new(&config.db_path);
            Ok(Box::new(SqliteGraphStore::open(&db, &config.migrations_dir)?))
        }
    }
}
