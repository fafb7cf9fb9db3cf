use clap::Parser;
use kgpath::ingest::read_samples;
use kgpath::{Config, open_store, query_paths, rank_paths};
use std::path::PathBuf;
use std::time::Instant;
use anyhow::{Context, Result};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Build the entity/relationship graph from a relation-extraction result file")]
struct Args {
    /// Tab-separated relation-extraction results
    input: PathBuf,

    /// Add to the existing graph instead of rebuilding it
    #[arg(short, long)]
    keep_existing: bool,

    /// Input has no header line
    #[arg(long)]
    no_header: bool,

    /// Print the ingestion report as JSON
    #[arg(long)]
    json: bool,

    /// After ingesting, query paths from this entity (requires --target)
    #[arg(long, requires = "target")]
    source: Option<String>,

    /// After ingesting, query paths to this entity (requires --source)
    #[arg(long, requires = "source")]
    target: Option<String>,

    /// Maximum path depth for the follow-up query
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.graph.log_level)
    ).init();

    log::info!("Starting kgpath ingestion");

    let skip_header = config.ingest.skip_header && !args.no_header;
    let batch = read_samples(&args.input, skip_header)
        .with_context(|| format!("Failed to load samples from {}", args.input.display()))?;

    if batch.samples.is_empty() {
        log::warn!("No samples found in {}. Nothing to ingest.", args.input.display());
    }

    let mut store = open_store(&config.graph).context("Failed to open graph store")?;

    let start = Instant::now();
    let clear = config.ingest.clear_before_ingest && !args.keep_existing;
    let report = if clear {
        log::info!("Mode: full rebuild");
        kgpath::rebuild(store.as_mut(), &batch.samples)?
    } else {
        log::info!("Mode: add to existing graph");
        kgpath::ingest(store.as_mut(), &batch.samples)?
    };
    let elapsed = start.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    log::info!("=== Ingestion Complete ===");
    log::info!("Samples: {} ({} lines skipped)", report.samples, batch.skipped.len());
    log::info!("Entity tags: {}", report.tags.join(", "));
    log::info!("Entities created: {}", report.entities_created);
    log::info!("Relationships created: {}", report.relationships_created);
    log::info!("Total frequency: {}", report.total_frequency);
    log::info!("Time: {:?}", elapsed);
    if report.failure_count() > 0 {
        log::warn!("{} writes failed. Check logs above for details.", report.failure_count());
    }

    if let (Some(source), Some(target)) = (args.source.as_deref(), args.target.as_deref()) {
        let max_depth = args.max_depth.unwrap_or(config.query.default_max_depth);
        let mut paths = query_paths(store.as_ref(), source, target, max_depth)?;
        rank_paths(&mut paths);
        println!("A total of {} paths", paths.len());
        for p in &paths {
            println!("{:.4}, {}, {}", p.score, p.depth, p.rendering);
        }
    }

    Ok(())
}
