//! One entity per distinct (name, tag) pair.

use std::collections::HashSet;

use super::{Entity, Identities, Sample};

/// Distinct entities in first-seen order (samples in order, head before tail).
///
/// The `(entity_id, tag_id)` pair is only a dedup key; returned entities carry
/// the original name and tag. A name seen with two tags yields two entities.
pub fn distinct_entities(samples: &[Sample], identities: &Identities) -> Vec<Entity> {
    let mut seen: HashSet<(Option<usize>, Option<usize>)> = HashSet::new();
    let mut entities = Vec::new();

    for s in samples {
        for (name, tag) in [(&s.head_name, &s.head_tag), (&s.tail_name, &s.tail_tag)] {
            let key = (identities.entities.get(name), identities.tags.get(tag));
            if seen.insert(key) {
                entities.push(Entity::new(name.as_str(), tag.as_str()));
            }
        }
    }

    entities
}
