//! Block-partitioned voxel volumes and cursors for walking them.
//!
pub mod config;
mod core;
mod cursor;
pub mod gradient;
pub mod index_utils;
pub mod neighbours;
mod update;
mod volume;

pub use crate::{
    config::VolumeConfig,
    core::{Block, Material, Voxel},
    cursor::{VolumeCursor, VolumeCursorMut},
    index_utils::{BlockShape, VolumeLayout},
    neighbours::{NeighbourTable, Offset},
    update::{VolumeDelta, VolumeUpdater},
    volume::{Volume, VolumeSummary},
};
