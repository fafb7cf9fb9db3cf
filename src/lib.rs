pub mod config;
pub mod error;
pub mod db;
pub mod graph;
pub mod ingest;
pub mod pipeline;
pub mod store;

pub use config::Config;
pub use error::{KgpathError, Result};
pub use graph::{rank_paths, Entity, Sample, ScoredPath, WeightedEdge};
pub use pipeline::{ingest, query_paths, rebuild, IngestReport};
pub use store::{open_store, GraphStore, MemoryGraphStore, SqliteGraphStore};
