use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::world::{World, WorldSnapshot};

/// Writes world snapshots as pretty JSON under `<output_dir>/<name>/`.
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, name: &str, seed: u64) -> PathBuf {
        self.output_dir
            .join(name)
            .join(format!("world_{seed}.json"))
    }

    pub fn write(&self, world: &World) -> Result<PathBuf> {
        let path = self.path_for(world.name(), world.seed());
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&world.snapshot())
            .context("Failed to serialize world snapshot")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        tracing::info!(
            target: "hexworld::snapshot",
            path = %path.display(),
            "snapshot.written"
        );
        Ok(path)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<WorldSnapshot> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
