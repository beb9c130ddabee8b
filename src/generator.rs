//! Generation pipeline: carve, build graph, color, merge.

use thiserror::Error;

use crate::biome::BiomeCatalog;
use crate::config::GeneratorConfig;
use crate::graph::{AreaGraph, GraphError};
use crate::lottery::{Lottery, LotteryError};
use crate::map::{carve_areas, DistanceTier, HexMap, MapError, MergeTierPolicy, TierPolicy};
use crate::rng::{RngManager, CARVE_STREAM, COLORING_STREAM, SIZE_STREAM};
use crate::world::World;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Lottery(#[from] LotteryError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub name: String,
    pub seed: u64,
    pub radius: u32,
}

pub struct WorldGeneratorBuilder {
    settings: GeneratorSettings,
    area_sizes: Vec<(usize, usize)>,
    biomes: BiomeCatalog,
    merge_policy: MergeTierPolicy,
    tier_policy: Box<dyn TierPolicy>,
}

impl WorldGeneratorBuilder {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            area_sizes: vec![(1, 30), (2, 50), (3, 42), (4, 17)],
            biomes: BiomeCatalog::builtin(),
            merge_policy: MergeTierPolicy::default(),
            tier_policy: Box::new(DistanceTier),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        let settings = GeneratorSettings {
            name: config.name.clone(),
            seed: config.random_seed,
            radius: config.map.radius,
        };
        Self::new(settings)
            .with_area_sizes(
                config
                    .map
                    .area_sizes
                    .iter()
                    .map(|size| (size.capacity, size.tickets)),
            )
            .with_biomes(config.biome_catalog())
            .with_merge_policy(config.merge.tier_policy)
    }

    /// `(capacity, tickets)` pairs for the area-size lottery.
    pub fn with_area_sizes(mut self, sizes: impl IntoIterator<Item = (usize, usize)>) -> Self {
        self.area_sizes = sizes.into_iter().collect();
        self
    }

    pub fn with_biomes(mut self, biomes: BiomeCatalog) -> Self {
        self.biomes = biomes;
        self
    }

    pub fn with_merge_policy(mut self, policy: MergeTierPolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn with_tier_policy(mut self, policy: impl TierPolicy + 'static) -> Self {
        self.tier_policy = Box::new(policy);
        self
    }

    pub fn build(self) -> WorldGenerator {
        WorldGenerator {
            settings: self.settings,
            area_sizes: self.area_sizes,
            biomes: self.biomes,
            merge_policy: self.merge_policy,
            tier_policy: self.tier_policy,
        }
    }
}

pub struct WorldGenerator {
    settings: GeneratorSettings,
    area_sizes: Vec<(usize, usize)>,
    biomes: BiomeCatalog,
    merge_policy: MergeTierPolicy,
    tier_policy: Box<dyn TierPolicy>,
}

impl WorldGenerator {
    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Runs the whole pipeline. Each call starts from fresh streams, so the
    /// same settings always produce the same world.
    pub fn generate(&self) -> Result<World, GenerationError> {
        let mut rng = RngManager::new(self.settings.seed);

        let mut sizes = Lottery::with_rng(rng.fork(SIZE_STREAM));
        for &(capacity, tickets) in &self.area_sizes {
            sizes.enter(capacity, tickets)?;
        }

        let mut map = HexMap::new(self.settings.radius);
        let carved = carve_areas(
            &mut map,
            &mut sizes,
            self.tier_policy.as_ref(),
            &mut rng.stream(CARVE_STREAM),
        )?;

        let mut graph = AreaGraph::build(&map, &self.biomes);
        graph.color(&mut rng.stream(COLORING_STREAM))?;

        let groups = graph.merge_groups()?;
        for group in &groups {
            let merged = map.merge_areas(&group.members, group.color, self.merge_policy)?;
            let tier = map
                .area(merged)
                .ok_or(MapError::UnknownArea(merged))?
                .tier()
                .ok_or(MapError::Untiered(merged))?;
            tracing::debug!(
                target: "hexworld::generator",
                merged = merged.raw(),
                members = group.members.len(),
                biome = ?group.color,
                tier,
                "generator.merge"
            );
            graph.replace_nodes(group, merged, tier)?;
        }

        for (id, biome) in graph.colors() {
            map.set_biome(id, biome)?;
        }

        tracing::info!(
            target: "hexworld::generator",
            name = %self.settings.name,
            seed = self.settings.seed,
            radius = self.settings.radius,
            cells = map.total_cells(),
            carved,
            merges = groups.len(),
            areas = map.area_count(),
            "generator.complete"
        );

        Ok(World::new(
            self.settings.name.clone(),
            self.settings.seed,
            map,
            graph,
            groups.len(),
        ))
    }
}
