//! SQLite-backed graph store.

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

use super::traversal::{enumerate_paths, Adjacency, Incident};
use super::{EntityHandle, GraphStats, GraphStore};
use crate::db::Db;
use crate::error::{KgpathError, Result};
use crate::graph::{validate_relation_type, Entity, PathNode, RawPath, WeightedEdge};

/// Graph persisted in the `entities` and `relationships` tables.
///
/// All values are bound as statement parameters.
pub struct SqliteGraphStore {
    conn: Connection,
}

/// Constraint violations reject one write; anything else means the store is broken.
fn write_error(e: rusqlite::Error, what: &str) -> KgpathError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            KgpathError::StoreWrite(format!("{}: {}", what, e))
        }
        _ => KgpathError::StoreUnavailable(format!("{}: {}", what, e)),
    }
}

impl SqliteGraphStore {
    /// Open the database and apply pending migrations.
    pub fn open(db: &Db, migrations_dir: &Path) -> Result<Self> {
        let conn = db.open_migrated(migrations_dir)?;
        Ok(Self { conn })
    }

    /// Wrap a connection whose schema is already migrated.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn entity_id(&self, entity: &Entity) -> Result<Option<i64>> {
        let id = self
            .conn
            .prepare_cached("SELECT entity_id FROM entities WHERE name = ?1 AND tag = ?2")?
            .query_row(params![entity.name, entity.tag], |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(id)
    }

    fn endpoint(&self, entity: &Entity) -> Result<i64> {
        self.entity_id(entity)?.ok_or_else(|| {
            KgpathError::StoreWrite(format!(
                "endpoint not found: ({}:{})",
                entity.name, entity.tag
            ))
        })
    }

    fn ids_named(&self, name: &str) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT entity_id FROM entities WHERE name = ?1 ORDER BY entity_id")?;
        let ids = stmt
            .query_map([name], |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(ids)
    }
}

impl GraphStore for SqliteGraphStore {
    fn clear_all(&mut self) -> Result<()> {
        let unavailable = |e: rusqlite::Error| KgpathError::StoreUnavailable(format!("clear: {}", e));
        let tx = self.conn.transaction().map_err(unavailable)?;
        tx.execute("DELETE FROM relationships", []).map_err(unavailable)?;
        tx.execute("DELETE FROM entities", []).map_err(unavailable)?;
        tx.commit().map_err(unavailable)?;
        log::info!("Cleared graph store");
        Ok(())
    }

    fn create_entity(&mut self, entity: &Entity) -> Result<EntityHandle> {
        let what = format!("create ({}:{})", entity.name, entity.tag);
        self.conn
            .prepare_cached("INSERT INTO entities (name, tag) VALUES (?1, ?2)")
            .and_then(|mut stmt| stmt.execute(params![entity.name, entity.tag]))
            .map_err(|e| write_error(e, &what))?;
        Ok(EntityHandle(self.conn.last_insert_rowid()))
    }

    fn create_relationship(&mut self, edge: &WeightedEdge) -> Result<()> {
        let rel = &edge.relationship;
        validate_relation_type(&rel.relation_type)?;
        let low = self.endpoint(&rel.low)?;
        let high = self.endpoint(&rel.high)?;
        let score = i64::try_from(edge.frequency)
            .map_err(|_| KgpathError::StoreWrite(format!("frequency {} out of range", edge.frequency)))?;

        self.conn
            .prepare_cached(
                "INSERT INTO relationships (low_entity, relation_type, high_entity, score) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .and_then(|mut stmt| stmt.execute(params![low, rel.relation_type, high, score]))
            .map_err(|e| write_error(e, &format!("create {}", edge)))?;
        Ok(())
    }

    fn find_paths(&self, source: &str, target: &str, max_depth: usize) -> Result<Vec<RawPath>> {
        let starts = self.ids_named(source)?;
        let targets: HashSet<i64> = self.ids_named(target)?.into_iter().collect();
        if starts.is_empty() || targets.is_empty() {
            return Ok(Vec::new());
        }
        enumerate_paths(self, &starts, &targets, max_depth)
    }

    fn stats(&self) -> Result<GraphStats> {
        let entity_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))?;
        let (relationship_count, total_frequency): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(score), 0) FROM relationships",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(GraphStats {
            entity_count: entity_count as usize,
            relationship_count: relationship_count as usize,
            total_frequency: total_frequency as u64,
        })
    }
}

impl Adjacency for SqliteGraphStore {
    fn node(&self, id: i64) -> Result<PathNode> {
        let node = self
            .conn
            .prepare_cached("SELECT name, tag FROM entities WHERE entity_id = ?1")?
            .query_row([id], |row| {
                Ok(PathNode {
                    name: row.get(0)?,
                    tag: row.get(1)?,
                })
            })?;
        Ok(node)
    }

    fn incident(&self, id: i64) -> Result<Vec<Incident>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT rel_id, relation_type, score, low_entity, high_entity \
             FROM relationships \
             WHERE low_entity = ?1 OR high_entity = ?1 \
             ORDER BY rel_id",
        )?;
        let rows = stmt.query_map([id], |row| {
            let low: i64 = row.get(3)?;
            let high: i64 = row.get(4)?;
            Ok(Incident {
                edge_id: row.get(0)?,
                relation_type: row.get(1)?,
                frequency: row.get::<_, i64>(2)? as u64,
                neighbor: if low == id { high } else { low },
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
