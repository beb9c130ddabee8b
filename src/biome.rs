//! Biome types and the tier ranges they may appear in.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeType {
    Meadow,
    Forest,
    Swamp,
    Desert,
    Tundra,
    Mountains,
    Badlands,
    Volcanic,
}

impl BiomeType {
    pub const ALL: [BiomeType; 8] = [
        BiomeType::Meadow,
        BiomeType::Forest,
        BiomeType::Swamp,
        BiomeType::Desert,
        BiomeType::Tundra,
        BiomeType::Mountains,
        BiomeType::Badlands,
        BiomeType::Volcanic,
    ];
}

impl CatalogKey for BiomeType {
    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn name(self) -> &'static str {
        match self {
            BiomeType::Meadow => "Meadow",
            BiomeType::Forest => "Forest",
            BiomeType::Swamp => "Swamp",
            BiomeType::Desert => "Desert",
            BiomeType::Tundra => "Tundra",
            BiomeType::Mountains => "Mountains",
            BiomeType::Badlands => "Badlands",
            BiomeType::Volcanic => "Volcanic",
        }
    }
}

/// Inclusive tier range a biome is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiomeInfo {
    pub min_tier: u32,
    pub max_tier: u32,
}

impl BiomeInfo {
    pub fn new(min_tier: u32, max_tier: u32) -> Self {
        Self { min_tier, max_tier }
    }

    /// Valid from `min_tier` upward without limit.
    pub fn from_tier(min_tier: u32) -> Self {
        Self::new(min_tier, u32::MAX)
    }

    pub fn contains(&self, tier: u32) -> bool {
        (self.min_tier..=self.max_tier).contains(&tier)
    }
}

/// Which biomes may color an area of a given tier.
pub trait BiomeValidity {
    fn valid_biomes_for_tier(&self, tier: u32) -> BTreeSet<BiomeType>;
}

impl<F> BiomeValidity for F
where
    F: Fn(u32) -> BTreeSet<BiomeType>,
{
    fn valid_biomes_for_tier(&self, tier: u32) -> BTreeSet<BiomeType> {
        self(tier)
    }
}

pub type BiomeCatalog = Catalog<BiomeType, BiomeInfo>;

impl BiomeCatalog {
    /// Default tier ranges. Every tier has at least two valid biomes.
    pub fn builtin() -> Self {
        [
            (BiomeType::Meadow, BiomeInfo::new(0, 2)),
            (BiomeType::Forest, BiomeInfo::new(0, 5)),
            (BiomeType::Swamp, BiomeInfo::new(2, 7)),
            (BiomeType::Desert, BiomeInfo::new(3, 9)),
            (BiomeType::Tundra, BiomeInfo::from_tier(5)),
            (BiomeType::Mountains, BiomeInfo::from_tier(6)),
            (BiomeType::Badlands, BiomeInfo::from_tier(8)),
            (BiomeType::Volcanic, BiomeInfo::from_tier(10)),
        ]
        .into_iter()
        .collect()
    }
}

impl BiomeValidity for BiomeCatalog {
    fn valid_biomes_for_tier(&self, tier: u32) -> BTreeSet<BiomeType> {
        self.iter()
            .filter(|(_, info)| info.contains(tier))
            .map(|(biome, _)| biome)
            .collect()
    }
}
