use cgmath::{Point3, Vector3};

use crate::index_utils::BlockShape;

/// One of the 27 positions in the 3x3x3 neighbourhood of a voxel, including the voxel itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    dx: i8,
    dy: i8,
    dz: i8,
}

impl Offset {
    pub const CENTER: Offset = Offset::raw(0, 0, 0);
    pub const NEG_X: Offset = Offset::raw(-1, 0, 0);
    pub const POS_X: Offset = Offset::raw(1, 0, 0);
    pub const NEG_Y: Offset = Offset::raw(0, -1, 0);
    pub const POS_Y: Offset = Offset::raw(0, 1, 0);
    pub const NEG_Z: Offset = Offset::raw(0, 0, -1);
    pub const POS_Z: Offset = Offset::raw(0, 0, 1);

    /// The six face-adjacent offsets.
    pub const FACES: [Offset; 6] = [
        Offset::NEG_X,
        Offset::POS_X,
        Offset::NEG_Y,
        Offset::POS_Y,
        Offset::NEG_Z,
        Offset::POS_Z,
    ];

    const fn raw(dx: i8, dy: i8, dz: i8) -> Self {
        Offset { dx, dy, dz }
    }

    /// Each component must be -1, 0 or 1.
    pub fn new(dx: i32, dy: i32, dz: i32) -> Self {
        assert!(
            (-1..=1).contains(&dx) && (-1..=1).contains(&dy) && (-1..=1).contains(&dz),
            "neighbour offset ({}, {}, {}) out of range",
            dx,
            dy,
            dz
        );
        Offset::raw(dx as i8, dy as i8, dz as i8)
    }

    /// Inverse of `index`.
    pub fn from_index(index: usize) -> Self {
        assert!(index < 27);
        let index = index as i32;
        Offset::new(index % 3 - 1, (index / 3) % 3 - 1, index / 9 - 1)
    }

    /// Position of this offset in the 3x3x3 neighbourhood, x fastest. The centre is 13.
    #[inline]
    pub fn index(self) -> usize {
        ((self.dz + 1) * 9 + (self.dy + 1) * 3 + (self.dx + 1)) as usize
    }

    #[inline]
    pub fn dx(self) -> i32 {
        self.dx as i32
    }

    #[inline]
    pub fn dy(self) -> i32 {
        self.dy as i32
    }

    #[inline]
    pub fn dz(self) -> i32 {
        self.dz as i32
    }

    #[inline]
    pub fn to_vec(self) -> Vector3<i32> {
        Vector3::new(self.dx(), self.dy(), self.dz())
    }

    /// All 27 offsets, z slowest and x fastest.
    pub fn all() -> impl Iterator<Item = Offset> {
        (0..27).map(Offset::from_index)
    }

    /// The 26 offsets other than the centre, z slowest and x fastest.
    pub fn neighbours() -> impl Iterator<Item = Offset> {
        Offset::all().filter(|&offset| offset != Offset::CENTER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    stride: isize,
    /// Inclusive range of local coordinates from which the neighbour is in the same block.
    min_local: Point3<i32>,
    max_local: Point3<i32>,
}

/// Precomputed flat-array strides and same-block tests for every neighbour offset, for one block
/// shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighbourTable {
    entries: [Entry; 27],
}

impl NeighbourTable {
    pub fn new(shape: BlockShape) -> Self {
        let strides = shape.strides();
        let last = shape.side_length() - 1;

        // a step of -1 needs room below, a step of +1 needs room above
        let min_for = |d: i32| if d < 0 { 1 } else { 0 };
        let max_for = |d: i32| if d > 0 { last - 1 } else { last };

        let mut entries = [Entry {
            stride: 0,
            min_local: Point3::new(0, 0, 0),
            max_local: Point3::new(last, last, last),
        }; 27];

        for offset in Offset::all() {
            let (dx, dy, dz) = (offset.dx(), offset.dy(), offset.dz());
            entries[offset.index()] = Entry {
                stride: dx as isize * strides.x + dy as isize * strides.y + dz as isize * strides.z,
                min_local: Point3::new(min_for(dx), min_for(dy), min_for(dz)),
                max_local: Point3::new(max_for(dx), max_for(dy), max_for(dz)),
            };
        }

        NeighbourTable { entries }
    }

    /// If the neighbour at `offset` of the voxel at `local` lies in the same block, returns the
    /// distance between the two voxels in the block's flat array.
    #[inline]
    pub fn same_block_stride(&self, local: Point3<i32>, offset: Offset) -> Option<isize> {
        let entry = &self.entries[offset.index()];
        if local.x >= entry.min_local.x
            && local.x <= entry.max_local.x
            && local.y >= entry.min_local.y
            && local.y <= entry.max_local.y
            && local.z >= entry.min_local.z
            && local.z <= entry.max_local.z
        {
            Some(entry.stride)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_index() {
        assert_eq!(Offset::CENTER.index(), 13);
        assert_eq!(Offset::new(-1, -1, -1).index(), 0);
        assert_eq!(Offset::new(1, 1, 1).index(), 26);

        for (i, offset) in Offset::all().enumerate() {
            assert_eq!(offset.index(), i);
            assert_eq!(Offset::from_index(i), offset);
        }

        assert_eq!(Offset::neighbours().count(), 26);
        assert!(Offset::neighbours().all(|o| o != Offset::CENTER));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_offset_range() {
        Offset::new(2, 0, 0);
    }

    #[test]
    fn test_table() {
        let shape = BlockShape::from_power(2);
        let table = NeighbourTable::new(shape);

        let interior = Point3::new(1, 2, 1);
        for offset in Offset::all() {
            let expected = offset.dx() as isize + offset.dy() as isize * 4 + offset.dz() as isize * 16;
            assert_eq!(table.same_block_stride(interior, offset), Some(expected));
        }

        let corner = Point3::new(0, 3, 0);
        assert_eq!(table.same_block_stride(corner, Offset::CENTER), Some(0));
        assert_eq!(table.same_block_stride(corner, Offset::NEG_X), None);
        assert_eq!(table.same_block_stride(corner, Offset::POS_X), Some(1));
        assert_eq!(table.same_block_stride(corner, Offset::POS_Y), None);
        assert_eq!(table.same_block_stride(corner, Offset::NEG_Y), Some(-4));
        assert_eq!(table.same_block_stride(corner, Offset::new(1, -1, 1)), Some(1 - 4 + 16));
        assert_eq!(table.same_block_stride(corner, Offset::new(1, -1, -1)), None);
    }
}
