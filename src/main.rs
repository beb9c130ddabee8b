use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hexworld::{
    config::{ConfigLoader, GeneratorConfig},
    logging,
    snapshot::SnapshotWriter,
    WorldGeneratorBuilder,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Hex world generator")]
struct Cli {
    /// Path to the generator YAML file (built-in small world when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the map radius
    #[arg(long)]
    radius: Option<u32>,

    /// Directory for snapshots
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip writing the snapshot
    #[arg(long)]
    no_snapshot: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(".").load(path)?,
        None => GeneratorConfig::small_world(),
    };
    if let Some(seed) = cli.seed {
        config.random_seed = seed;
    }
    if let Some(radius) = cli.radius {
        config.map.radius = radius;
    }
    if let Some(output) = cli.output {
        config.snapshot.output_dir = output;
    }
    if cli.no_snapshot {
        config.snapshot.enabled = false;
    }

    logging::init(&config.logging.level);

    let world = WorldGeneratorBuilder::from_config(&config)
        .build()
        .generate()
        .with_context(|| format!("Failed to generate world '{}'", config.name))?;

    println!(
        "World '{}' (seed {}, radius {}): {} cells in {} areas, {} merges",
        world.name(),
        world.seed(),
        world.map().radius(),
        world.map().total_cells(),
        world.map().area_count(),
        world.merge_count()
    );
    for (biome, count) in world.biome_counts() {
        println!("  {biome:?}: {count}");
    }

    if config.snapshot.enabled {
        let path = SnapshotWriter::new(&config.snapshot.output_dir).write(&world)?;
        println!("Snapshot written to {}", path.display());
    }
    Ok(())
}
