//! Ingestion and path query operations over a [`GraphStore`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{KgpathError, Result};
use crate::graph::{
    aggregate_relationships, distinct_entities, resolve_identities, score_paths, Sample,
    ScoredPath,
};
use crate::store::GraphStore;

/// One write the store rejected
#[derive(Debug, Clone, Serialize)]
pub struct WriteFailure {
    pub item: String,
    pub reason: String,
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub samples: usize,
    pub tags: Vec<String>,
    pub entities_created: usize,
    pub entity_failures: Vec<WriteFailure>,
    pub relationships_created: usize,
    pub relationship_failures: Vec<WriteFailure>,
    /// Sum of frequencies over created relationships
    pub total_frequency: u64,
}

impl IngestReport {
    pub fn failure_count(&self) -> usize {
        self.entity_failures.len() + self.relationship_failures.len()
    }
}

/// Record a non-fatal write error, or hand back a fatal one.
fn absorb(failures: &mut Vec<WriteFailure>, item: String, err: KgpathError) -> Result<()> {
    if err.is_fatal() {
        return Err(err);
    }
    log::warn!("✗ {}: {}", item, err);
    failures.push(WriteFailure {
        item,
        reason: err.to_string(),
    });
    Ok(())
}

/// Build the graph for `samples` in `store`.
///
/// All entities are created before any relationship. A rejected write is logged
/// and recorded in the report; store unavailability aborts the run.
pub fn ingest<S: GraphStore + ?Sized>(store: &mut S, samples: &[Sample]) -> Result<IngestReport> {
    let started_at = Utc::now();
    let identities = resolve_identities(samples);

    let entities = distinct_entities(samples, &identities);
    log::info!("Creating {} entities", entities.len());
    let mut entities_created = 0;
    let mut entity_failures = Vec::new();
    for entity in &entities {
        match store.create_entity(entity) {
            Ok(handle) => {
                entities_created += 1;
                log::debug!("✓ entity ({}:{}) -> {:?}", entity.name, entity.tag, handle);
            }
            Err(e) => absorb(
                &mut entity_failures,
                format!("({}:{})", entity.name, entity.tag),
                e,
            )?,
        }
    }

    let edges = aggregate_relationships(samples, &identities)?;
    log::info!("Creating {} relationships", edges.len());
    let mut relationships_created = 0;
    let mut total_frequency = 0;
    let mut relationship_failures = Vec::new();
    for edge in &edges {
        match store.create_relationship(edge) {
            Ok(()) => {
                relationships_created += 1;
                total_frequency += edge.frequency;
                log::debug!("✓ {}", edge);
            }
            Err(e) => absorb(&mut relationship_failures, edge.to_string(), e)?,
        }
    }

    let report = IngestReport {
        started_at,
        finished_at: Utc::now(),
        samples: samples.len(),
        tags: identities.tags.keys().to_vec(),
        entities_created,
        entity_failures,
        relationships_created,
        relationship_failures,
        total_frequency,
    };

    log::info!(
        "Ingested {} samples: {} entities, {} relationships, {} failed writes",
        report.samples,
        report.entities_created,
        report.relationships_created,
        report.failure_count()
    );
    Ok(report)
}

/// Clear the store, then ingest `samples` into the empty graph.
pub fn rebuild<S: GraphStore + ?Sized>(store: &mut S, samples: &[Sample]) -> Result<IngestReport> {
    store.clear_all()?;
    ingest(store, samples)
}

/// Scored paths of 1..=`max_depth` edges between two entity names.
///
/// Results are unranked; see [`crate::graph::rank_paths`]. Unknown names give an
/// empty result. Unscorable raw paths are dropped individually.
pub fn query_paths<S: GraphStore + ?Sized>(
    store: &S,
    source: &str,
    target: &str,
    max_depth: usize,
) -> Result<Vec<ScoredPath>> {
    if max_depth == 0 {
        return Err(KgpathError::InvalidInput(
            "max_depth must be at least 1".to_string(),
        ));
    }

    let raw = store.find_paths(source, target, max_depth)?;
    log::info!(
        "Found {} paths from {:?} to {:?} within depth {}",
        raw.len(),
        source,
        target,
        max_depth
    );
    Ok(score_paths(&raw))
}
