//! Canonical undirected relationships and their frequencies.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::{CanonicalRelationship, Entity, Identities, Sample, WeightedEdge};
use crate::error::{KgpathError, Result};

fn lookup(map: &super::IdMap, key: &str, what: &str) -> Result<usize> {
    map.get(key)
        .ok_or_else(|| KgpathError::InvalidInput(format!("unresolved {}: {:?}", what, key)))
}

/// Undirected, tie-broken form of one sample.
///
/// The entity with the smaller entity id is `low`. On equal entity ids the
/// smaller tag id is `low`. When both ids are equal the two sides are the same
/// (name, tag) and the head is written as `low`.
pub fn canonicalize(sample: &Sample, identities: &Identities) -> Result<CanonicalRelationship> {
    let head_id = lookup(&identities.entities, &sample.head_name, "entity")?;
    let tail_id = lookup(&identities.entities, &sample.tail_name, "entity")?;

    let head_first = match head_id.cmp(&tail_id) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => {
            let head_tag = lookup(&identities.tags, &sample.head_tag, "tag")?;
            let tail_tag = lookup(&identities.tags, &sample.tail_tag, "tag")?;
            head_tag <= tail_tag
        }
    };

    let head = Entity::new(sample.head_name.as_str(), sample.head_tag.as_str());
    let tail = Entity::new(sample.tail_name.as_str(), sample.tail_tag.as_str());
    let (low, high) = if head_first { (head, tail) } else { (tail, head) };

    Ok(CanonicalRelationship {
        low,
        relation_type: sample.relation_type.clone(),
        high,
    })
}

/// Count samples per canonical relationship.
///
/// Returns one edge per distinct canonical tuple, in first-seen order. The
/// frequencies sum to `samples.len()`.
pub fn aggregate_relationships(
    samples: &[Sample],
    identities: &Identities,
) -> Result<Vec<WeightedEdge>> {
    let mut index: HashMap<CanonicalRelationship, usize> = HashMap::new();
    let mut edges: Vec<WeightedEdge> = Vec::new();

    for s in samples {
        let relationship = canonicalize(s, identities)?;
        match index.get(&relationship) {
            Some(&i) => edges[i].frequency += 1,
            None => {
                index.insert(relationship.clone(), edges.len());
                edges.push(WeightedEdge {
                    relationship,
                    frequency: 1,
                });
            }
        }
    }

    log::debug!(
        "Aggregated {} samples into {} canonical relationships",
        samples.len(),
        edges.len()
    );

    Ok(edges)
}
