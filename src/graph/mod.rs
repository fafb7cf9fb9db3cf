//! Graph construction and path scoring.
//!
//! Turns a flat list of extracted (head, relation, tail) samples into deduplicated
//! entities and frequency-weighted undirected relationships, and scores the raw
//! paths a graph store returns for a bounded-depth query.

mod aggregate;
mod dedup;
mod identity;
mod scoring;

pub use aggregate::{aggregate_relationships, canonicalize};
pub use dedup::distinct_entities;
pub use identity::{resolve_identities, IdMap, Identities};
pub use scoring::{rank_paths, render_path, score_path, score_paths};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{KgpathError, Result};

/// One extracted triple: `head --relation_type--> tail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub relation_type: String,
    pub head_name: String,
    pub head_tag: String,
    pub tail_name: String,
    pub tail_tag: String,
}

impl Sample {
    pub fn new(
        relation_type: impl Into<String>,
        head_name: impl Into<String>,
        head_tag: impl Into<String>,
        tail_name: impl Into<String>,
        tail_tag: impl Into<String>,
    ) -> Self {
        Self {
            relation_type: relation_type.into(),
            head_name: head_name.into(),
            head_tag: head_tag.into(),
            tail_name: tail_name.into(),
            tail_tag: tail_tag.into(),
        }
    }
}

/// A graph node. Identity is the (name, tag) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub tag: String,
}

impl Entity {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

/// Undirected, tie-broken form of a sample.
///
/// `low` and `high` are ordered by entity id, then tag id, so a triple and its
/// reverse produce the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalRelationship {
    pub low: Entity,
    pub relation_type: String,
    pub high: Entity,
}

/// A canonical relationship with the number of samples that collapsed into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEdge {
    pub relationship: CanonicalRelationship,
    pub frequency: u64,
}

impl std::fmt::Display for WeightedEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rel = &self.relationship;
        write!(
            f,
            "({}:{})--[{}]--({}:{}) x{}",
            rel.low.name, rel.low.tag, rel.relation_type, rel.high.name, rel.high.tag, self.frequency
        )
    }
}

/// Node on a raw path returned by a graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    pub name: String,
    pub tag: String,
}

/// Edge on a raw path returned by a graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEdge {
    pub relation_type: String,
    pub frequency: u64,
}

/// Alternating node/edge sequence from source to target.
///
/// A well-formed path has `nodes.len() == edges.len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPath {
    pub nodes: Vec<PathNode>,
    pub edges: Vec<PathEdge>,
}

/// A rendered, measured and scored path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPath {
    pub rendering: String,
    pub depth: usize,
    pub score: f64,
}

fn relation_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^[^\s\p{Cc}`\[\](){}'";]+$"#).expect("Invalid regex pattern")
    })
}

/// Check that a relation type is usable as an edge label.
///
/// Rejects empty strings, whitespace, control characters and the punctuation
/// that delimits labels in path renderings and graph query syntax.
pub fn validate_relation_type(relation_type: &str) -> Result<()> {
    if relation_type_regex().is_match(relation_type) {
        Ok(())
    } else {
        Err(KgpathError::InvalidRelationType(relation_type.to_string()))
    }
}
