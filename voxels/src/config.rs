use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Dimensions of a volume, as read from settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Side length of the whole (cubic) volume in voxels.
    #[serde(default = "VolumeConfig::default_side_length")]
    pub side_length: u32,
    /// Side length of each block in voxels. Must be a power of two dividing `side_length`.
    #[serde(default = "VolumeConfig::default_block_side_length")]
    pub block_side_length: u32,
}

impl VolumeConfig {
    pub fn default_side_length() -> u32 {
        128
    }

    pub fn default_block_side_length() -> u32 {
        16
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("Parsing volume config")
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            side_length: Self::default_side_length(),
            block_side_length: Self::default_block_side_length(),
        }
    }
}
