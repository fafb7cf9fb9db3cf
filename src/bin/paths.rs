use clap::Parser;
use kgpath::{Config, open_store, query_paths, rank_paths};
use std::time::Instant;
use anyhow::{Context, Result};

#[derive(Parser, Debug)]
#[command(name = "paths")]
#[command(about = "Rank the paths between two entities by average relationship frequency")]
struct Args {
    /// Source entity name
    source: String,

    /// Target entity name
    target: String,

    /// Maximum number of edges per path (defaults to query.default_max_depth)
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Print at most this many of the top-ranked paths
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.graph.log_level)
    ).init();

    if args.source.trim().is_empty() || args.target.trim().is_empty() {
        anyhow::bail!("Source and target entity names cannot be empty");
    }

    let max_depth = args.max_depth.unwrap_or(config.query.default_max_depth);
    let store = open_store(&config.graph).context("Failed to open graph store")?;

    let start = Instant::now();
    let mut paths = query_paths(store.as_ref(), &args.source, &args.target, max_depth)?;
    rank_paths(&mut paths);
    let duration = start.elapsed();

    let total = paths.len();
    if let Some(limit) = args.limit {
        paths.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }

    println!("\nPaths from \"{}\" to \"{}\" (max depth {})\n", args.source, args.target, max_depth);
    if paths.is_empty() {
        println!("No paths found.");
    } else {
        println!("{:>10}  {:>5}  Path", "Score", "Depth");
        println!("{:-<80}", "");
        for p in &paths {
            println!("{:>10.4}  {:>5}  {}", p.score, p.depth, p.rendering);
        }
        println!("{:-<80}", "");
    }

    println!("Paths found: {}", total);
    if total > paths.len() {
        println!("Shown: {}", paths.len());
    }
    println!("Latency: {:?}", duration);

    Ok(())
}
