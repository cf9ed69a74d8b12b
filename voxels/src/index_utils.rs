use anyhow::{bail, Result};
use cgmath::{Point3, Vector3};

/// Describes the cubic shape of a block. The side length is always a power of two so that
/// global coordinates can be split into block and local coordinates with shifts and masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockShape {
    power: u32,
}

/// Everything needed to map a global voxel position to a block and a voxel inside it. This is
/// `Copy` so that it can be held alongside a mutable borrow of the block storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VolumeLayout {
    side_length: i32,
    blocks_per_side: i32,
    shape: BlockShape,
}

impl BlockShape {
    /// Largest supported block side power. A block of side 2^10 already holds 2^30 voxels.
    pub const MAX_POWER: u32 = 10;

    #[inline]
    pub fn from_power(power: u32) -> Self {
        assert!(power <= Self::MAX_POWER, "block side power {} too large", power);
        BlockShape { power }
    }

    pub fn from_side_length(side_length: u32) -> Result<Self> {
        if side_length == 0 || !side_length.is_power_of_two() {
            bail!(
                "block side length must be a non-zero power of two, got {}",
                side_length
            );
        }
        let power = side_length.trailing_zeros();
        if power > Self::MAX_POWER {
            bail!("block side length {} is too large", side_length);
        }
        Ok(BlockShape { power })
    }

    #[inline]
    pub const fn power(self) -> u32 {
        self.power
    }

    #[inline]
    pub const fn side_length(self) -> i32 {
        1 << self.power
    }

    #[inline]
    pub const fn voxel_count(self) -> usize {
        1 << (3 * self.power)
    }

    /// Distance in the flat voxel array between neighbours along x, y and z.
    #[inline]
    pub const fn strides(self) -> Vector3<isize> {
        Vector3 {
            x: 1,
            y: 1 << self.power,
            z: 1 << (2 * self.power),
        }
    }

    #[inline]
    pub fn contains_local(self, p: Point3<i32>) -> bool {
        let side = self.side_length();
        p.x >= 0 && p.x < side && p.y >= 0 && p.y < side && p.z >= 0 && p.z < side
    }

    /// Flat index of a local position. The position is not checked outside debug builds.
    #[inline]
    pub fn pack(self, local: Point3<i32>) -> usize {
        debug_assert!(self.contains_local(local));
        local.x as usize
            + ((local.y as usize) << self.power)
            + ((local.z as usize) << (2 * self.power))
    }

    #[inline]
    pub fn unpack(self, index: usize) -> Point3<i32> {
        assert!(index < self.voxel_count());
        let mask = (1 << self.power) - 1;
        Point3 {
            x: (index & mask) as i32,
            y: ((index >> self.power) & mask) as i32,
            z: (index >> (2 * self.power)) as i32,
        }
    }

    /// From a global position, return the coordinates of the block containing it and the
    /// position of the voxel within that block.
    #[inline]
    pub fn split(self, p: Point3<i32>) -> (Point3<i32>, Point3<i32>) {
        let block = Point3::new(p.x >> self.power, p.y >> self.power, p.z >> self.power);
        let mask = self.side_length() - 1;
        let local = Point3::new(p.x & mask, p.y & mask, p.z & mask);
        (block, local)
    }

    /// Global position of the first voxel of the given block.
    #[inline]
    pub fn block_origin(self, block: Point3<i32>) -> Point3<i32> {
        Point3::new(
            block.x << self.power,
            block.y << self.power,
            block.z << self.power,
        )
    }
}

impl VolumeLayout {
    /// Largest supported volume side length, chosen so that a position plus or minus a few
    /// voxels never overflows.
    pub const MAX_SIDE_LENGTH: u32 = 1 << 20;

    pub fn new(side_length: u32, shape: BlockShape) -> Result<Self> {
        let block_side = shape.side_length() as u32;
        if side_length == 0 || side_length % block_side != 0 {
            bail!(
                "volume side length {} must be a non-zero multiple of the block side length {}",
                side_length,
                block_side
            );
        }
        if side_length > Self::MAX_SIDE_LENGTH {
            bail!(
                "volume side length {} exceeds the maximum of {}",
                side_length,
                Self::MAX_SIDE_LENGTH
            );
        }

        Ok(VolumeLayout {
            side_length: side_length as i32,
            blocks_per_side: (side_length / block_side) as i32,
            shape,
        })
    }

    #[inline]
    pub fn side_length(self) -> i32 {
        self.side_length
    }

    #[inline]
    pub fn blocks_per_side(self) -> i32 {
        self.blocks_per_side
    }

    #[inline]
    pub fn block_count(self) -> usize {
        let n = self.blocks_per_side as usize;
        n * n * n
    }

    #[inline]
    pub fn shape(self) -> BlockShape {
        self.shape
    }

    #[inline]
    pub fn contains_point(self, p: Point3<i32>) -> bool {
        let side = self.side_length;
        p.x >= 0 && p.x < side && p.y >= 0 && p.y < side && p.z >= 0 && p.z < side
    }

    /// Index into the block table of the block with the given block coordinates.
    #[inline]
    pub fn block_index_of_block(self, block: Point3<i32>) -> usize {
        let n = self.blocks_per_side as usize;
        block.x as usize + block.y as usize * n + block.z as usize * n * n
    }

    /// Index into the block table of the block containing `p`. No bounds check is performed
    /// outside debug builds.
    #[inline]
    pub fn block_index_for(self, p: Point3<i32>) -> usize {
        debug_assert!(self.contains_point(p), "{:?} is outside the volume", p);
        let (block, _) = self.shape.split(p);
        self.block_index_of_block(block)
    }

    #[inline]
    pub fn block_coords(self, block_index: usize) -> Point3<i32> {
        assert!(block_index < self.block_count());
        let n = self.blocks_per_side as usize;
        Point3 {
            x: (block_index % n) as i32,
            y: ((block_index / n) % n) as i32,
            z: (block_index / (n * n)) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_shape() {
        let shape = BlockShape::from_side_length(16).unwrap();
        assert_eq!(shape.power(), 4);
        assert_eq!(shape.side_length(), 16);
        assert_eq!(shape.voxel_count(), 4096);
        assert_eq!(shape.strides(), Vector3::new(1, 16, 256));

        assert!(BlockShape::from_side_length(0).is_err());
        assert!(BlockShape::from_side_length(12).is_err());
        assert!(BlockShape::from_side_length(1).is_ok());
    }

    #[test]
    fn test_pack_unpack() {
        let shape = BlockShape::from_power(4);
        assert_eq!(shape.pack(Point3::new(0, 0, 0)), 0);
        assert_eq!(shape.pack(Point3::new(7, 3, 0)), 7 + 3 * 16);
        assert_eq!(shape.pack(Point3::new(5, 4, 12)), 5 + 4 * 16 + 12 * 256);

        for &p in &[
            Point3::new(0, 0, 0),
            Point3::new(7, 3, 0),
            Point3::new(15, 15, 15),
            Point3::new(1, 14, 9),
        ] {
            assert_eq!(shape.unpack(shape.pack(p)), p);
        }
    }

    #[test]
    fn test_split() {
        let shape = BlockShape::from_power(4);
        assert_eq!(
            shape.split(Point3::new(37, 132, 60)),
            (Point3::new(2, 8, 3), Point3::new(5, 4, 12))
        );
        assert_eq!(shape.block_origin(Point3::new(2, 8, 3)), Point3::new(32, 128, 48));
    }

    #[test]
    fn test_layout() {
        let shape = BlockShape::from_power(3);
        assert!(VolumeLayout::new(20, shape).is_err());
        assert!(VolumeLayout::new(0, shape).is_err());

        let layout = VolumeLayout::new(32, shape).unwrap();
        assert_eq!(layout.blocks_per_side(), 4);
        assert_eq!(layout.block_count(), 64);

        assert!(layout.contains_point(Point3::new(31, 0, 31)));
        assert!(!layout.contains_point(Point3::new(32, 0, 0)));
        assert!(!layout.contains_point(Point3::new(0, -1, 0)));

        let index = layout.block_index_for(Point3::new(9, 17, 31));
        assert_eq!(index, 1 + 2 * 4 + 3 * 16);
        assert_eq!(layout.block_coords(index), Point3::new(1, 2, 3));
    }
}
