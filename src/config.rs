// src/config.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

pub const DEFAULT_SEAL_MATERIAL: &str = "TOOLS/TOOLSNODRAW";

/// Everything a generation run needs. Missing keys in a config file fall
/// back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    /// How many pool tiles to place between the start and the finale.
    pub tile_count: usize,
    /// How many of the newest doors are offered to each placement. 0 means all.
    pub tail_length: usize,
    pub style: String,
    pub tiles_root: PathBuf,
    pub output_dir: PathBuf,
    /// Defaults to `map-<seed>`.
    pub output_name: Option<String>,
    pub seal_material: String,
    pub navmesh_script: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            seed: 42,
            tile_count: 5,
            tail_length: 3,
            style: "dev".to_string(),
            tiles_root: PathBuf::from("tiles"),
            output_dir: PathBuf::from("output"),
            output_name: None,
            seal_material: DEFAULT_SEAL_MATERIAL.to_string(),
            navmesh_script: None,
            report: None,
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn tail(&self) -> Option<usize> {
        (self.tail_length > 0).then_some(self.tail_length)
    }

    /// Directory holding the tiles of the configured style.
    pub fn tile_dir(&self) -> PathBuf {
        self.tiles_root.join(&self.style)
    }

    pub fn output_name(&self) -> String {
        self.output_name
            .clone()
            .unwrap_or_else(|| format!("map-{}", self.seed))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.vmf", self.output_name()))
    }
}
