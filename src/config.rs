//! Generator configuration, loaded from YAML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::biome::{BiomeCatalog, BiomeInfo, BiomeType};
use crate::map::MergeTierPolicy;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub name: String,
    pub random_seed: u64,
    pub map: MapConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    /// Overrides the built-in biome ranges when present.
    #[serde(default)]
    pub biomes: Option<Vec<BiomeConfig>>,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub radius: u32,
    #[serde(default = "default_area_sizes")]
    pub area_sizes: Vec<AreaSizeConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSizeConfig {
    pub capacity: usize,
    pub tickets: usize,
}

fn default_area_sizes() -> Vec<AreaSizeConfig> {
    [(1, 30), (2, 50), (3, 42), (4, 17)]
        .into_iter()
        .map(|(capacity, tickets)| AreaSizeConfig { capacity, tickets })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default)]
    pub tier_policy: MergeTierPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiomeConfig {
    pub biome: BiomeType,
    #[serde(default)]
    pub min_tier: u32,
    #[serde(default = "default_max_tier")]
    pub max_tier: u32,
}

fn default_max_tier() -> u32 {
    u32::MAX
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_snapshot_enabled")]
    pub enabled: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

fn default_snapshot_enabled() -> bool {
    true
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            enabled: default_snapshot_enabled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: GeneratorConfig =
            serde_yaml::from_str(text).context("Failed to parse generator config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize generator config")
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_yaml()?)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.area_sizes.is_empty() {
            return Err(ConfigError::Validation(
                "map.area_sizes must list at least one capacity".to_string(),
            ));
        }
        for size in &self.map.area_sizes {
            if size.capacity == 0 {
                return Err(ConfigError::Validation(
                    "area capacity must be at least 1".to_string(),
                ));
            }
            if size.tickets == 0 {
                return Err(ConfigError::Validation(format!(
                    "capacity {} has no tickets",
                    size.capacity
                )));
            }
        }
        if let Some(biomes) = &self.biomes {
            if biomes.is_empty() {
                return Err(ConfigError::Validation(
                    "biomes, when given, must not be empty".to_string(),
                ));
            }
            if let Some(inverted) = biomes.iter().find(|entry| entry.min_tier > entry.max_tier) {
                return Err(ConfigError::Validation(format!(
                    "biome {:?} has min_tier {} above max_tier {}",
                    inverted.biome, inverted.min_tier, inverted.max_tier
                )));
            }
        }
        Ok(())
    }

    pub fn biome_catalog(&self) -> BiomeCatalog {
        match &self.biomes {
            Some(biomes) => biomes
                .iter()
                .map(|entry| (entry.biome, BiomeInfo::new(entry.min_tier, entry.max_tier)))
                .collect(),
            None => BiomeCatalog::builtin(),
        }
    }

    /// Radius 4 map with the default size table.
    pub fn small_world() -> Self {
        Self {
            name: "small_world".to_string(),
            random_seed: 7,
            map: MapConfig {
                radius: 4,
                area_sizes: default_area_sizes(),
            },
            merge: MergeConfig::default(),
            biomes: None,
            snapshot: SnapshotConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<GeneratorConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        GeneratorConfig::from_yaml(&data)
            .with_context(|| format!("Failed to load {}", path.display()))
    }
}
