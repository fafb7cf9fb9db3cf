//! Bounded-depth path enumeration shared by the store backends.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::Result;
use crate::graph::{PathEdge, PathNode, RawPath};

/// One edge seen from a given node.
#[derive(Debug, Clone)]
pub(crate) struct Incident {
    pub edge_id: i64,
    pub relation_type: String,
    pub frequency: u64,
    pub neighbor: i64,
}

/// Read access a backend provides for traversal.
pub(crate) trait Adjacency {
    fn node(&self, id: i64) -> Result<PathNode>;

    /// Edges touching `id`, in either direction. A self-loop appears once.
    fn incident(&self, id: i64) -> Result<Vec<Incident>>;
}

/// Enumerate every path of 1..=`max_depth` edges from a start node to a target
/// node, never reusing an edge within one path.
pub(crate) fn enumerate_paths<A: Adjacency + ?Sized>(
    adjacency: &A,
    starts: &[i64],
    targets: &HashSet<i64>,
    max_depth: usize,
) -> Result<Vec<RawPath>> {
    let mut walk = Walk {
        adjacency,
        targets,
        max_depth,
        incident_cache: HashMap::new(),
        node_cache: HashMap::new(),
        node_stack: Vec::new(),
        edge_stack: Vec::new(),
        used_edges: HashSet::new(),
        found: Vec::new(),
    };

    for &start in starts {
        walk.node_stack.push(start);
        walk.extend(start, 0)?;
        walk.node_stack.pop();
    }

    Ok(walk.found)
}

struct Walk<'a, A: Adjacency + ?Sized> {
    adjacency: &'a A,
    targets: &'a HashSet<i64>,
    max_depth: usize,
    incident_cache: HashMap<i64, Rc<Vec<Incident>>>,
    node_cache: HashMap<i64, PathNode>,
    node_stack: Vec<i64>,
    edge_stack: Vec<PathEdge>,
    used_edges: HashSet<i64>,
    found: Vec<RawPath>,
}

impl<A: Adjacency + ?Sized> Walk<'_, A> {
    fn incident(&mut self, id: i64) -> Result<Rc<Vec<Incident>>> {
        if let Some(cached) = self.incident_cache.get(&id) {
            return Ok(Rc::clone(cached));
        }
        let incident = Rc::new(self.adjacency.incident(id)?);
        self.incident_cache.insert(id, Rc::clone(&incident));
        Ok(incident)
    }

    fn node(&mut self, id: i64) -> Result<PathNode> {
        if let Some(node) = self.node_cache.get(&id) {
            return Ok(node.clone());
        }
        let node = self.adjacency.node(id)?;
        self.node_cache.insert(id, node.clone());
        Ok(node)
    }

    fn extend(&mut self, current: i64, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Ok(());
        }

        let incident = self.incident(current)?;
        for inc in incident.iter() {
            if !self.used_edges.insert(inc.edge_id) {
                continue;
            }
            self.node_stack.push(inc.neighbor);
            self.edge_stack.push(PathEdge {
                relation_type: inc.relation_type.clone(),
                frequency: inc.frequency,
            });

            if self.targets.contains(&inc.neighbor) {
                self.record()?;
            }
            self.extend(inc.neighbor, depth + 1)?;

            self.edge_stack.pop();
            self.node_stack.pop();
            self.used_edges.remove(&inc.edge_id);
        }

        Ok(())
    }

    fn record(&mut self) -> Result<()> {
        let ids = self.node_stack.clone();
        let mut nodes = Vec::with_capacity(ids.len());
        for id in ids {
            nodes.push(self.node(id)?);
        }
        self.found.push(RawPath {
            nodes,
            edges: self.edge_stack.clone(),
        });
        Ok(())
    }
}
