//! In-process graph store.

use std::collections::{HashMap, HashSet};

use super::traversal::{enumerate_paths, Adjacency, Incident};
use super::{EntityHandle, GraphStats, GraphStore};
use crate::error::{KgpathError, Result};
use crate::graph::{validate_relation_type, Entity, PathNode, RawPath, WeightedEdge};

#[derive(Debug, Clone)]
struct StoredEdge {
    low: i64,
    high: i64,
    relation_type: String,
    frequency: u64,
}

/// Graph held in hash maps; lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    entities: Vec<Entity>,
    by_key: HashMap<Entity, i64>,
    by_name: HashMap<String, Vec<i64>>,
    edges: Vec<StoredEdge>,
    incident: HashMap<i64, Vec<usize>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ids_named(&self, name: &str) -> &[i64] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn endpoint(&self, entity: &Entity) -> Result<i64> {
        self.by_key.get(entity).copied().ok_or_else(|| {
            KgpathError::StoreWrite(format!(
                "endpoint not found: ({}:{})",
                entity.name, entity.tag
            ))
        })
    }
}

impl GraphStore for MemoryGraphStore {
    fn clear_all(&mut self) -> Result<()> {
        *self = Self::default();
        Ok(())
    }

    fn create_entity(&mut self, entity: &Entity) -> Result<EntityHandle> {
        if self.by_key.contains_key(entity) {
            return Err(KgpathError::StoreWrite(format!(
                "entity already exists: ({}:{})",
                entity.name, entity.tag
            )));
        }
        let id = self.entities.len() as i64;
        self.entities.push(entity.clone());
        self.by_key.insert(entity.clone(), id);
        self.by_name.entry(entity.name.clone()).or_default().push(id);
        Ok(EntityHandle(id))
    }

    fn create_relationship(&mut self, edge: &WeightedEdge) -> Result<()> {
        let rel = &edge.relationship;
        validate_relation_type(&rel.relation_type)?;
        let low = self.endpoint(&rel.low)?;
        let high = self.endpoint(&rel.high)?;

        let index = self.edges.len();
        self.edges.push(StoredEdge {
            low,
            high,
            relation_type: rel.relation_type.clone(),
            frequency: edge.frequency,
        });
        self.incident.entry(low).or_default().push(index);
        if high != low {
            self.incident.entry(high).or_default().push(index);
        }
        Ok(())
    }

    fn find_paths(&self, source: &str, target: &str, max_depth: usize) -> Result<Vec<RawPath>> {
        let starts = self.ids_named(source);
        let targets: HashSet<i64> = self.ids_named(target).iter().copied().collect();
        if starts.is_empty() || targets.is_empty() {
            return Ok(Vec::new());
        }
        enumerate_paths(self, starts, &targets, max_depth)
    }

    fn stats(&self) -> Result<GraphStats> {
        Ok(GraphStats {
            entity_count: self.entities.len(),
            relationship_count: self.edges.len(),
            total_frequency: self.edges.iter().map(|e| e.frequency).sum(),
        })
    }
}

impl Adjacency for MemoryGraphStore {
    fn node(&self, id: i64) -> Result<PathNode> {
        let entity = usize::try_from(id)
            .ok()
            .and_then(|i| self.entities.get(i))
            .ok_or_else(|| KgpathError::InvalidInput(format!("unknown entity id {}", id)))?;
        Ok(PathNode {
            name: entity.name.clone(),
            tag: entity.tag.clone(),
        })
    }

    fn incident(&self, id: i64) -> Result<Vec<Incident>> {
        let Some(indices) = self.incident.get(&id) else {
            return Ok(Vec::new());
        };
        Ok(indices
            .iter()
            .map(|&i| {
                let e = &self.edges[i];
                Incident {
                    edge_id: i as i64,
                    relation_type: e.relation_type.clone(),
                    frequency: e.frequency,
                    neighbor: if e.low == id { e.high } else { e.low },
                }
            })
            .collect())
    }
}
