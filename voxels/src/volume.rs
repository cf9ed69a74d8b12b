use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{bail, Result};
use cgmath::{Point3, Vector3};

use volmesh_util::Region;

use crate::{
    config::VolumeConfig,
    core::{Block, Voxel},
    cursor::{VolumeCursor, VolumeCursorMut},
    index_utils::{BlockShape, VolumeLayout},
};

/// A cubic grid of voxels, split into blocks of equal size.
///
/// Blocks are reference counted. A freshly created volume shares a single empty block between
/// every slot of the block table, and a write to a shared block clones it first. Cloning a
/// `Volume` is therefore cheap: the clone shares every block with the original until one of them
/// is written to.
#[derive(Clone)]
pub struct Volume<V> {
    layout: VolumeLayout,
    /// Block table, indexed by `bx + by * n + bz * n * n` where `n` is the number of blocks
    /// along each side.
    blocks: Vec<Arc<Block<V>>>,
    empty_block: Arc<Block<V>>,
}

#[derive(Debug, PartialEq)]
pub struct VolumeSummary {
    pub count_total: usize,
    pub count_occupied: usize,
    pub count_blocks: usize,
    pub count_unique_blocks: usize,
    pub pct_occupied: f64,
    pub byte_size: usize,
}

impl<V: Voxel> Volume<V> {
    /// Creates an empty volume `side_length` voxels wide, split into blocks `block_side_length`
    /// voxels wide.
    pub fn new(side_length: u32, block_side_length: u32) -> Result<Self> {
        let shape = BlockShape::from_side_length(block_side_length)?;
        let layout = VolumeLayout::new(side_length, shape)?;

        let empty_block = Arc::new(Block::empty(shape));
        let blocks = vec![empty_block.clone(); layout.block_count()];

        log::debug!(
            "Created volume of side {} with {} blocks of side {}",
            side_length,
            layout.block_count(),
            block_side_length
        );

        Ok(Volume {
            layout,
            blocks,
            empty_block,
        })
    }

    pub fn from_config(config: &VolumeConfig) -> Result<Self> {
        Self::new(config.side_length, config.block_side_length)
    }

    #[inline]
    pub fn layout(&self) -> VolumeLayout {
        self.layout
    }

    #[inline]
    pub fn block_shape(&self) -> BlockShape {
        self.layout.shape()
    }

    #[inline]
    pub fn side_length(&self) -> i32 {
        self.layout.side_length()
    }

    #[inline]
    pub fn block_side_length(&self) -> i32 {
        self.layout.shape().side_length()
    }

    #[inline]
    pub fn block_side_power(&self) -> u32 {
        self.layout.shape().power()
    }

    #[inline]
    pub fn blocks_per_side(&self) -> i32 {
        self.layout.blocks_per_side()
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The region containing every voxel of the volume.
    pub fn enclosing_region(&self) -> Region {
        let last = self.side_length() - 1;
        Region::from_coords(0, 0, 0, last, last, last)
    }

    #[inline]
    pub fn contains_point(&self, p: Point3<i32>) -> bool {
        self.layout.contains_point(p)
    }

    /// Index into the block table of the block containing `p`. The position is only checked in
    /// debug builds; callers are responsible for staying inside the volume.
    #[inline]
    pub fn block_index_for(&self, p: Point3<i32>) -> usize {
        self.layout.block_index_for(p)
    }

    #[inline]
    pub fn block(&self, block_index: usize) -> &Block<V> {
        &self.blocks[block_index]
    }

    /// Mutable access to a block. If the block is shared with another slot or another volume it
    /// is cloned first, so the returned block is only reachable through this slot.
    #[inline]
    pub fn block_mut(&mut self, block_index: usize) -> &mut Block<V> {
        Arc::make_mut(&mut self.blocks[block_index])
    }

    #[inline]
    pub(crate) fn block_data(&self, block_index: usize) -> &[V] {
        self.blocks[block_index].voxels()
    }

    /// True if a write to this block would have to clone it first.
    pub fn is_block_shared(&self, block_index: usize) -> bool {
        Arc::strong_count(&self.blocks[block_index]) > 1
    }

    /// Number of distinct block allocations referenced by the block table.
    pub fn unique_block_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| Arc::as_ptr(block) as usize)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Returns the voxel at the given position.
    ///
    /// Panics if the position lies outside the volume. Use `try_voxel_at` for a fallible
    /// version.
    #[inline]
    pub fn voxel_at(&self, p: Point3<i32>) -> V {
        assert!(
            self.contains_point(p),
            "voxel position {:?} is outside volume of side {}",
            p,
            self.side_length()
        );
        let (block, local) = self.layout.shape().split(p);
        let block_index = self.layout.block_index_of_block(block);
        self.blocks[block_index].voxel_at_index(self.layout.shape().pack(local))
    }

    pub fn try_voxel_at(&self, p: Point3<i32>) -> Result<V> {
        if !self.contains_point(p) {
            bail!(
                "voxel position ({}, {}, {}) is outside volume of side {}",
                p.x,
                p.y,
                p.z,
                self.side_length()
            );
        }
        Ok(self.voxel_at(p))
    }

    /// Sets the value of a voxel at the given point.
    ///
    /// Panics if the position lies outside the volume. Use `try_set_voxel_at` for a fallible
    /// version.
    #[inline]
    pub fn set_voxel_at(&mut self, p: Point3<i32>, value: V) {
        assert!(
            self.contains_point(p),
            "voxel position {:?} is outside volume of side {}",
            p,
            self.side_length()
        );
        let (block, local) = self.layout.shape().split(p);
        let block_index = self.layout.block_index_of_block(block);
        let index = self.layout.shape().pack(local);
        self.block_mut(block_index).set_voxel_at_index(index, value);
    }

    pub fn try_set_voxel_at(&mut self, p: Point3<i32>, value: V) -> Result<()> {
        if !self.contains_point(p) {
            bail!(
                "voxel position ({}, {}, {}) is outside volume of side {}",
                p.x,
                p.y,
                p.z,
                self.side_length()
            );
        }
        self.set_voxel_at(p, value);
        Ok(())
    }

    /// A read cursor over the whole volume, positioned at the origin.
    pub fn cursor(&self) -> VolumeCursor<'_, V> {
        VolumeCursor::new(self)
    }

    /// A read cursor restricted to `region` and positioned at its first voxel.
    pub fn cursor_in_region(&self, region: Region) -> VolumeCursor<'_, V> {
        VolumeCursor::with_region(self, region)
    }

    /// A write cursor over the whole volume, positioned at the origin.
    pub fn cursor_mut(&mut self) -> VolumeCursorMut<'_, V> {
        VolumeCursorMut::new(self)
    }

    pub fn cursor_mut_in_region(&mut self, region: Region) -> VolumeCursorMut<'_, V> {
        VolumeCursorMut::with_region(self, region)
    }

    /// At every voxel position within the given region, replace the existing voxel using the
    /// given function. Positions outside the volume are skipped. Blocks are visited one at a
    /// time, and a block left entirely empty goes back to sharing the volume's empty block.
    pub fn replace_voxels<E, F>(&mut self, region: Region, mut replace_voxel: F) -> Result<(), E>
    where
        F: FnMut(Point3<i32>, V) -> Result<V, E>,
    {
        let region = match region.intersection(self.enclosing_region()) {
            Some(region) => region,
            None => return Ok(()),
        };

        let shape = self.layout.shape();
        let side = shape.side_length();
        let block_region = region.quantize(side);

        for block_pos in block_region.iter_points() {
            let block_start = shape.block_origin(block_pos);
            let block_voxels = Region::from_size(block_start, Vector3::new(side, side, side));
            let touched = match block_voxels.intersection(region) {
                Some(touched) => touched,
                None => continue,
            };

            let block_index = self.layout.block_index_of_block(block_pos);
            let block = self.block_mut(block_index);

            for voxel_pos in touched.iter_points() {
                let index = shape.pack(voxel_pos - (block_start - Point3::new(0, 0, 0)));
                let new_voxel = replace_voxel(voxel_pos, block.voxel_at_index(index))?;
                block.set_voxel_at_index(index, new_voxel);
            }

            if block.is_uniform() && block.voxel_at_index(0) == V::default() {
                self.blocks[block_index] = self.empty_block.clone();
            }
        }

        Ok(())
    }

    /// Sets every voxel within `region` to `value`.
    pub fn fill_region(&mut self, region: Region, value: V) {
        let result: Result<(), Infallible> = self.replace_voxels(region, |_, _| Ok(value));
        result.unwrap_or_else(|never| match never {})
    }

    /// Sets every voxel within `region` to the value computed from its position.
    pub fn fill_with<F>(&mut self, region: Region, mut voxel_for: F)
    where
        F: FnMut(Point3<i32>) -> V,
    {
        let result: Result<(), Infallible> = self.replace_voxels(region, |p, _| Ok(voxel_for(p)));
        result.unwrap_or_else(|never| match never {})
    }

    /// Visits every voxel in the volume exactly once, block by block.
    pub fn iter_voxels(&self) -> impl Iterator<Item = (Point3<i32>, V)> + '_ {
        let layout = self.layout;
        self.blocks
            .iter()
            .enumerate()
            .flat_map(move |(block_index, block)| {
                let origin = layout.shape().block_origin(layout.block_coords(block_index));
                block
                    .voxels()
                    .iter()
                    .enumerate()
                    .map(move |(index, &voxel)| {
                        let local = layout.shape().unpack(index);
                        (origin + (local - Point3::new(0, 0, 0)), voxel)
                    })
            })
    }

    pub fn debug_summary(&self) -> VolumeSummary {
        let side = self.side_length() as usize;
        let count_total = side * side * side;
        let count_occupied = self
            .blocks
            .iter()
            .map(|block| block.count_occupied())
            .sum::<usize>();
        let count_unique_blocks = self.unique_block_count();

        VolumeSummary {
            count_total,
            count_occupied,
            count_blocks: self.block_count(),
            count_unique_blocks,
            pct_occupied: (count_occupied as f64 / count_total as f64) * 100.0,
            byte_size: std::mem::size_of::<V>()
                * self.layout.shape().voxel_count()
                * count_unique_blocks,
        }
    }
}
