use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::biome::BiomeType;
use crate::graph::AreaGraph;
use crate::hex::Coords;
use crate::map::{Area, AreaId, HexMap};

/// A finished generation run: the carved map and its colored area graph.
#[derive(Debug, Clone)]
pub struct World {
    name: String,
    seed: u64,
    map: HexMap,
    graph: AreaGraph,
    merge_count: usize,
}

impl World {
    pub fn new(name: String, seed: u64, map: HexMap, graph: AreaGraph, merge_count: usize) -> Self {
        Self {
            name,
            seed,
            map,
            graph,
            merge_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn map(&self) -> &HexMap {
        &self.map
    }

    pub fn graph(&self) -> &AreaGraph {
        &self.graph
    }

    /// Number of same-biome groups folded into single areas.
    pub fn merge_count(&self) -> usize {
        self.merge_count
    }

    pub fn biome_at(&self, coords: Coords) -> Option<BiomeType> {
        self.map.area_of(coords).and_then(Area::biome)
    }

    /// Areas per biome, in biome order.
    pub fn biome_counts(&self) -> Vec<(BiomeType, usize)> {
        BiomeType::ALL
            .into_iter()
            .map(|biome| {
                let count = self
                    .map
                    .areas()
                    .filter(|area| area.biome() == Some(biome))
                    .count();
                (biome, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let cells = self
            .map
            .cells()
            .map(|cell| CellSnapshot {
                coords: cell.coords(),
                area: cell.area().map(AreaId::raw),
            })
            .collect();
        let areas = self
            .map
            .areas()
            .map(|area| AreaSnapshot {
                id: area.id().raw(),
                capacity: area.capacity(),
                tier: area.tier(),
                biome: area.biome(),
                cells: area.cells().to_vec(),
            })
            .collect();
        let edges = self
            .graph
            .nodes()
            .flat_map(|node| {
                node.edges()
                    .iter()
                    .filter(move |other| node.id() < **other)
                    .map(move |other| (node.id().raw(), other.raw()))
            })
            .collect();

        WorldSnapshot {
            name: self.name.clone(),
            seed: self.seed,
            radius: self.map.radius(),
            generated_at: Utc::now(),
            cells,
            areas,
            edges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub name: String,
    pub seed: u64,
    pub radius: u32,
    pub generated_at: DateTime<Utc>,
    pub cells: Vec<CellSnapshot>,
    pub areas: Vec<AreaSnapshot>,
    /// Each graph edge once, lower id first.
    pub edges: Vec<(u64, u64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub coords: Coords,
    pub area: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSnapshot {
    pub id: u64,
    pub capacity: usize,
    pub tier: Option<u32>,
    pub biome: Option<BiomeType>,
    pub cells: Vec<Coords>,
}
