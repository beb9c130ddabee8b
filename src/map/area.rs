use std::fmt;

use serde::{Deserialize, Serialize};

use crate::biome::BiomeType;
use crate::hex::Coords;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaId(u64);

impl AreaId {
    pub fn raw(self) -> u64 {
        self.0
    }

    pub(crate) fn from_raw(raw: u64) -> Self {
        AreaId(raw)
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "area#{}", self.0)
    }
}

/// A contiguous, capacity-bounded group of cells.
///
/// Cells are kept in carve order; the first cell is the seed the area grew
/// from. Membership changes go through [`crate::map::HexMap`] so the cell
/// back-references stay in sync.
#[derive(Debug, Clone)]
pub struct Area {
    id: AreaId,
    capacity: usize,
    cells: Vec<Coords>,
    tier: Option<u32>,
    biome: Option<BiomeType>,
}

impl Area {
    pub(crate) fn new(id: AreaId, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            cells: Vec::with_capacity(capacity),
            tier: None,
            biome: None,
        }
    }

    pub fn id(&self) -> AreaId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cells(&self) -> &[Coords] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cells.len() >= self.capacity
    }

    pub fn seed_cell(&self) -> Option<Coords> {
        self.cells.first().copied()
    }

    pub fn tier(&self) -> Option<u32> {
        self.tier
    }

    pub fn biome(&self) -> Option<BiomeType> {
        self.biome
    }

    pub(crate) fn push_cell(&mut self, coords: Coords) -> bool {
        if self.is_full() {
            return false;
        }
        self.cells.push(coords);
        true
    }

    pub(crate) fn set_tier(&mut self, tier: u32) {
        self.tier = Some(tier);
    }

    pub(crate) fn set_biome(&mut self, biome: BiomeType) {
        self.biome = Some(biome);
    }

    pub(crate) fn absorb(id: AreaId, parts: Vec<Area>) -> Self {
        let capacity = parts.iter().map(|area| area.capacity).sum();
        let mut merged = Area::new(id, capacity);
        for part in parts {
            merged.cells.extend(part.cells);
        }
        merged
    }
}

/// How the tier of a merged area is derived from its constituents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeTierPolicy {
    #[default]
    Max,
    Min,
    /// Tier of the first constituent in merge order.
    First,
}

impl MergeTierPolicy {
    pub fn combine(self, tiers: &[u32]) -> Option<u32> {
        match self {
            MergeTierPolicy::Max => tiers.iter().copied().max(),
            MergeTierPolicy::Min => tiers.iter().copied().min(),
            MergeTierPolicy::First => tiers.first().copied(),
        }
    }
}
