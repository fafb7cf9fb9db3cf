use kgpath::{Config, GraphStore, open_store};
use anyhow::{Context, Result};

fn main() -> Result<()> {
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.graph.log_level)
    ).init();

    let store = open_store(&config.graph).context("Failed to open graph store")?;
    let stats = store.stats()?;

    println!("\n=== kgpath Graph Statistics ===\n");
    println!("{:-<40}", "");
    println!("{:<25} {:>12}", "Entities", stats.entity_count);
    println!("{:<25} {:>12}", "Relationships", stats.relationship_count);
    println!("{:<25} {:>12}", "Total frequency", stats.total_frequency);
    if stats.relationship_count > 0 {
        let mean = stats.total_frequency as f64 / stats.relationship_count as f64;
        println!("{:<25} {:>12.4}", "Mean frequency", mean);
    }
    println!("{:-<40}", "");

    if stats.entity_count == 0 {
        println!("\nGraph is empty. Run `ingest <file>` to build it.");
    }
    println!();

    Ok(())
}
