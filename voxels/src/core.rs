use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::index_utils::BlockShape;

/// A value stored in a single voxel.
///
/// Surface extraction and gradient estimation only care whether a voxel is occupied. The
/// default value of every voxel type must be empty, because freshly created volumes are filled
/// with it.
pub trait Voxel: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// Binary interpretation of the voxel: `false` means empty, `true` means occupied.
    fn is_occupied(self) -> bool;
}

macro_rules! impl_voxel_int {
    ($($type:ty),*) => {
        $(
            impl Voxel for $type {
                #[inline]
                fn is_occupied(self) -> bool {
                    self > 0
                }
            }
        )*
    };
}

impl_voxel_int!(u8, u16, u32, i8, i16, i32);

impl Voxel for f32 {
    #[inline]
    fn is_occupied(self) -> bool {
        self > 0.0
    }
}

/// A voxel holding a material id. Material 0 is air; every other material is solid.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct Material(u16);

impl Material {
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn from_u16(val: u16) -> Self {
        Material(val)
    }

    pub fn air() -> Self {
        Material(0)
    }

    pub fn to_u16(self) -> u16 {
        self.0
    }
}

impl Voxel for Material {
    #[inline]
    fn is_occupied(self) -> bool {
        !self.is_empty()
    }
}

/// A cubic chunk of voxels stored contiguously. Volumes are split into blocks to help with cache
/// locality: voxels that are close to each other in space, and are in the same block, should be
/// in the same cache line.
#[derive(Clone, PartialEq)]
pub struct Block<V> {
    /* Memory layout (if block side were 4, showing the first two z-levels)
     z-level 0
       x - >
     y 0  1  2  3
     | 4  5  6  7
     v 8  9  10 11
       12 13 14 15

     z-level 1
       x - >
     y 16 17 18 19
     | ...
     */
    shape: BlockShape,
    voxels: Box<[V]>,
}

impl<V: Voxel> Block<V> {
    /// Creates a block filled with the default (empty) voxel.
    pub fn empty(shape: BlockShape) -> Self {
        Self::filled(shape, V::default())
    }

    pub fn filled(shape: BlockShape, value: V) -> Self {
        Block {
            shape,
            voxels: vec![value; shape.voxel_count()].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn shape(&self) -> BlockShape {
        self.shape
    }

    #[inline]
    pub fn side_length(&self) -> i32 {
        self.shape.side_length()
    }

    #[inline]
    pub fn voxel_at(&self, local: Point3<i32>) -> V {
        assert!(
            self.shape.contains_local(local),
            "local position {:?} is outside block of side {}",
            local,
            self.side_length()
        );
        self.voxels[self.shape.pack(local)]
    }

    #[inline]
    pub fn set_voxel_at(&mut self, local: Point3<i32>, value: V) {
        assert!(
            self.shape.contains_local(local),
            "local position {:?} is outside block of side {}",
            local,
            self.side_length()
        );
        self.voxels[self.shape.pack(local)] = value;
    }

    #[inline]
    pub fn voxel_at_index(&self, index: usize) -> V {
        self.voxels[index]
    }

    #[inline]
    pub fn set_voxel_at_index(&mut self, index: usize, value: V) {
        self.voxels[index] = value;
    }

    #[inline]
    pub fn voxels(&self) -> &[V] {
        &self.voxels
    }

    pub fn fill(&mut self, value: V) {
        for voxel in self.voxels.iter_mut() {
            *voxel = value;
        }
    }

    /// True if every voxel in the block has the same value.
    pub fn is_uniform(&self) -> bool {
        match self.voxels.first() {
            Some(&first) => self.voxels.iter().all(|&v| v == first),
            None => true,
        }
    }

    pub fn count_occupied(&self) -> usize {
        self.voxels.iter().filter(|v| v.is_occupied()).count()
    }
}

impl<V: Voxel> std::fmt::Debug for Block<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = self.side_length();
        writeln!(f, "Block {{")?;
        for z in 0..side {
            writeln!(f, "z={}", z)?;
            for y in 0..side {
                for x in 0..side {
                    let ix = self.shape.pack(Point3::new(x, y, z));
                    write!(f, "{:?} ", self.voxels[ix])?;
                }
                writeln!(f)?;
            }
        }
        write!(f, "}}")
    }
}
