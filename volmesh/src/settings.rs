use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use volmesh_util::Region;
use volmesh_voxels::VolumeConfig;

use crate::primitive::ShapeConfig;

/// Everything needed to build and walk a test volume.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub volume: VolumeConfig,
    /// Drawn in order, so later shapes overwrite earlier ones.
    #[serde(default)]
    pub shapes: Vec<ShapeConfig>,
    /// Region to walk. Defaults to the whole volume.
    #[serde(default)]
    pub region: Option<Region>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading settings from {:?}", path);
        let file = std::fs::File::open(path).context("Opening settings file")?;
        serde_yaml::from_reader(file).context("Parsing settings file")
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("Parsing settings file")
    }
}
