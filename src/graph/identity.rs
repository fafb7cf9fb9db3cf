//! Dense integer ids for entity names and entity tags.

use std::collections::HashMap;

use super::Sample;

/// Mapping from a string key to a dense id `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    ids: HashMap<String, usize>,
    keys: Vec<String>,
}

impl IdMap {
    /// Id of `key`, assigning the next free one if unseen.
    fn intern(&mut self, key: &str) -> usize {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        let id = self.keys.len();
        self.ids.insert(key.to_string(), id);
        self.keys.push(key.to_string());
        id
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in id order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// Independent numberings of entity names and entity tags for one ingestion run.
#[derive(Debug, Clone, Default)]
pub struct Identities {
    pub entities: IdMap,
    pub tags: IdMap,
}

/// Assign ids to every head/tail name and every head/tail tag.
///
/// Ids follow first appearance (samples in order, head before tail). Each call
/// starts from empty maps.
pub fn resolve_identities(samples: &[Sample]) -> Identities {
    let mut identities = Identities::default();

    for s in samples {
        identities.entities.intern(&s.head_name);
        identities.entities.intern(&s.tail_name);
        identities.tags.intern(&s.head_tag);
        identities.tags.intern(&s.tail_tag);
    }

    log::info!("Entity tags: {:?}", identities.tags.keys());
    log::debug!(
        "Resolved {} entity names and {} tags from {} samples",
        identities.entities.len(),
        identities.tags.len(),
        samples.len()
    );

    identities
}
