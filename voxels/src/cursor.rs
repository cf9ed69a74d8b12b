//! Stateful traversal of a volume.
//!
//! A cursor caches the block and flat voxel index of its current position, so stepping to the
//! next voxel and reading the 26 neighbours of the current voxel are usually a handful of
//! integer operations. The address is only re-derived from scratch when the cursor crosses a
//! block or region boundary.
//!
//! The cursor holds `(block index, voxel index)` rather than a reference into a block, and reads
//! go through the volume's block table every time. A `VolumeCursor` borrows the volume
//! immutably, so the block table cannot change under it; a `VolumeCursorMut` is the only way to
//! write through a cursor.

use cgmath::Point3;

use volmesh_util::Region;

use crate::{
    core::Voxel,
    index_utils::VolumeLayout,
    neighbours::{NeighbourTable, Offset},
    volume::Volume,
};

/// Read-only cursor over a volume.
#[derive(Clone)]
pub struct VolumeCursor<'a, V> {
    volume: &'a Volume<V>,
    state: CursorState,
}

/// Cursor which can also write the voxel under it. Use `as_cursor` to peek at neighbours or
/// compute gradients.
pub struct VolumeCursorMut<'a, V> {
    volume: &'a mut Volume<V>,
    state: CursorState,
}

#[derive(Debug, Clone)]
struct CursorState {
    layout: VolumeLayout,
    table: NeighbourTable,

    region: Region,
    region_first_block: Point3<i32>,
    region_last_block: Point3<i32>,

    pos: Point3<i32>,
    block: Point3<i32>,
    local: Point3<i32>,
    block_index: usize,
    voxel_index: usize,

    valid: bool,
}

impl CursorState {
    fn new(layout: VolumeLayout, enclosing: Region) -> Self {
        let mut state = CursorState {
            layout,
            table: NeighbourTable::new(layout.shape()),
            region: enclosing,
            region_first_block: Point3::new(0, 0, 0),
            region_last_block: Point3::new(0, 0, 0),
            pos: Point3::new(0, 0, 0),
            block: Point3::new(0, 0, 0),
            local: Point3::new(0, 0, 0),
            block_index: 0,
            voxel_index: 0,
            valid: true,
        };
        state.set_valid_region(enclosing, enclosing);
        state
    }

    fn set_valid_region(&mut self, region: Region, enclosing: Region) {
        let power = self.layout.shape().power();

        match region.intersection(enclosing) {
            Some(region) => {
                self.region = region;
                self.region_first_block = Point3::new(
                    region.lower().x >> power,
                    region.lower().y >> power,
                    region.lower().z >> power,
                );
                self.region_last_block = Point3::new(
                    region.upper().x >> power,
                    region.upper().y >> power,
                    region.upper().z >> power,
                );
            }
            None => {
                self.region = Region::INVERTED;
                self.valid = false;
            }
        }
    }

    fn set_position(&mut self, p: Point3<i32>) {
        assert!(
            self.layout.contains_point(p),
            "cursor position {:?} is outside volume of side {}",
            p,
            self.layout.side_length()
        );

        let shape = self.layout.shape();
        let (block, local) = shape.split(p);

        self.pos = p;
        self.block = block;
        self.local = local;
        self.block_index = self.layout.block_index_of_block(block);
        self.voxel_index = shape.pack(local);
        self.valid = self.region.is_valid() && self.region.contains_point(p, 0);
    }

    fn move_forward_in_region(&mut self) {
        debug_assert!(self.valid, "cursor moved past the end of its region");

        let shape = self.layout.shape();
        let side = shape.side_length();
        let lower = self.region.lower();
        let upper = self.region.upper();
        let block_origin = shape.block_origin(self.block);

        self.pos.x += 1;
        self.local.x += 1;
        self.voxel_index += 1;
        if self.local.x < side && self.pos.x <= upper.x {
            return;
        }

        self.pos.x = lower.x.max(block_origin.x);
        self.local.x = self.pos.x - block_origin.x;
        self.pos.y += 1;
        self.local.y += 1;
        if self.local.y < side && self.pos.y <= upper.y {
            self.voxel_index = shape.pack(self.local);
            return;
        }

        self.pos.y = lower.y.max(block_origin.y);
        self.local.y = self.pos.y - block_origin.y;
        self.pos.z += 1;
        self.local.z += 1;
        if self.local.z < side && self.pos.z <= upper.z {
            self.voxel_index = shape.pack(self.local);
            return;
        }

        // We've left the current block. Find the next one in the region, x fastest.
        self.block.x += 1;
        if self.block.x > self.region_last_block.x {
            self.block.x = self.region_first_block.x;
            self.block.y += 1;
            if self.block.y > self.region_last_block.y {
                self.block.y = self.region_first_block.y;
                self.block.z += 1;
                if self.block.z > self.region_last_block.z {
                    self.valid = false;
                    return;
                }
            }
        }

        let block_origin = shape.block_origin(self.block);
        self.pos = Point3::new(
            lower.x.max(block_origin.x),
            lower.y.max(block_origin.y),
            lower.z.max(block_origin.z),
        );
        self.local = self.pos - (block_origin - Point3::new(0, 0, 0));
        self.block_index = self.layout.block_index_of_block(self.block);
        self.voxel_index = shape.pack(self.local);
    }
}

impl<'a, V: Voxel> VolumeCursor<'a, V> {
    /// A cursor positioned at the origin, allowed to traverse the whole volume.
    pub fn new(volume: &'a Volume<V>) -> Self {
        VolumeCursor {
            volume,
            state: CursorState::new(volume.layout(), volume.enclosing_region()),
        }
    }

    /// A cursor restricted to `region` and positioned at its first voxel. If the region does
    /// not overlap the volume the cursor starts out invalid.
    pub fn with_region(volume: &'a Volume<V>, region: Region) -> Self {
        let mut cursor = Self::new(volume);
        cursor.set_valid_region(region);
        if cursor.state.region.is_valid() {
            cursor.set_position(cursor.state.region.lower());
        }
        cursor
    }

    #[inline]
    pub fn volume(&self) -> &'a Volume<V> {
        self.volume
    }

    /// Restricts traversal to `region`, cropped to the volume. Does not move the cursor; call
    /// `set_position` to enter the region.
    pub fn set_valid_region(&mut self, region: Region) {
        self.state
            .set_valid_region(region, self.volume.enclosing_region());
    }

    /// The region being traversed, after cropping to the volume. Not valid if the requested
    /// region did not overlap the volume.
    #[inline]
    pub fn valid_region(&self) -> Region {
        self.state.region
    }

    /// Moves the cursor to an absolute position, recomputing its cached address. The cursor is
    /// valid afterwards iff the position lies inside the valid region.
    ///
    /// Panics if the position lies outside the volume.
    #[inline]
    pub fn set_position(&mut self, p: Point3<i32>) {
        self.state.set_position(p);
    }

    #[inline]
    pub fn position(&self) -> Point3<i32> {
        self.state.pos
    }

    /// Advances to the next voxel of the region. Voxels are visited block by block, with blocks
    /// and the voxels inside each block both in x-fastest, z-slowest order. After the last voxel
    /// the cursor becomes invalid; it must not be advanced again.
    #[inline]
    pub fn move_forward_in_region(&mut self) {
        self.state.move_forward_in_region();
    }

    /// False once the cursor has stepped past the last voxel of its region.
    #[inline]
    pub fn is_valid_for_region(&self) -> bool {
        self.state.valid
    }

    #[inline]
    pub fn block_index(&self) -> usize {
        self.state.block_index
    }

    #[inline]
    pub fn voxel_index(&self) -> usize {
        self.state.voxel_index
    }

    /// The voxel under the cursor.
    #[inline]
    pub fn voxel(&self) -> V {
        self.volume
            .block_data(self.state.block_index)[self.state.voxel_index]
    }

    /// Reads a neighbour of the current voxel. When the neighbour lies in the current block it
    /// is read directly from the block's data; otherwise the read goes through the checked
    /// `Volume::voxel_at`, which panics if the neighbour is outside the volume.
    #[inline]
    pub fn peek(&self, offset: Offset) -> V {
        match self.state.table.same_block_stride(self.state.local, offset) {
            Some(stride) => {
                let index = (self.state.voxel_index as isize + stride) as usize;
                self.volume.block_data(self.state.block_index)[index]
            }
            None => self.volume.voxel_at(self.state.pos + offset.to_vec()),
        }
    }

    /// True if `peek(offset)` would be served from the current block without an address
    /// lookup.
    #[inline]
    pub fn peek_takes_fast_path(&self, offset: Offset) -> bool {
        self.state
            .table
            .same_block_stride(self.state.local, offset)
            .is_some()
    }

    /// True if the cursor is at least `margin` voxels away from every face of the volume.
    #[inline]
    pub fn is_within_margin(&self, margin: i32) -> bool {
        let last = self.volume.side_length() - 1 - margin;
        let p = self.state.pos;
        p.x >= margin && p.x <= last && p.y >= margin && p.y <= last && p.z >= margin && p.z <= last
    }
}

impl<'a, V: Voxel> VolumeCursorMut<'a, V> {
    pub fn new(volume: &'a mut Volume<V>) -> Self {
        let state = CursorState::new(volume.layout(), volume.enclosing_region());
        VolumeCursorMut { volume, state }
    }

    pub fn with_region(volume: &'a mut Volume<V>, region: Region) -> Self {
        let mut cursor = Self::new(volume);
        cursor.set_valid_region(region);
        if cursor.state.region.is_valid() {
            cursor.set_position(cursor.state.region.lower());
        }
        cursor
    }

    pub fn set_valid_region(&mut self, region: Region) {
        self.state
            .set_valid_region(region, self.volume.enclosing_region());
    }

    #[inline]
    pub fn valid_region(&self) -> Region {
        self.state.region
    }

    #[inline]
    pub fn set_position(&mut self, p: Point3<i32>) {
        self.state.set_position(p);
    }

    #[inline]
    pub fn position(&self) -> Point3<i32> {
        self.state.pos
    }

    #[inline]
    pub fn move_forward_in_region(&mut self) {
        self.state.move_forward_in_region();
    }

    #[inline]
    pub fn is_valid_for_region(&self) -> bool {
        self.state.valid
    }

    #[inline]
    pub fn voxel(&self) -> V {
        self.volume
            .block_data(self.state.block_index)[self.state.voxel_index]
    }

    /// Writes the voxel under the cursor. A block shared with another volume is cloned first;
    /// the cursor addresses blocks by index so it follows the clone automatically.
    #[inline]
    pub fn set_voxel(&mut self, value: V) {
        self.volume
            .block_mut(self.state.block_index)
            .set_voxel_at_index(self.state.voxel_index, value);
    }

    /// A read cursor at the same position, for neighbour and gradient queries.
    pub fn as_cursor(&self) -> VolumeCursor<'_, V> {
        VolumeCursor {
            volume: &*self.volume,
            state: self.state.clone(),
        }
    }
}

#[cfg(test)]
mod tests;
