//! Surface normal estimation from binary occupancy around a cursor.
//!
//! Every estimator thresholds voxel values to occupied / empty before differencing. The plain
//! methods use `Voxel::is_occupied`; the `_with` variants take an explicit predicate. Near the
//! faces of the volume, where the stencil would read outside it, each estimator returns a zero
//! vector instead.

use cgmath::{Point3, Vector3, Zero};

use crate::{core::Voxel, cursor::VolumeCursor, neighbours::Offset};

/// Sobel kernel, indexed `[dz + 1][dy + 1][dx + 1]`.
pub const SOBEL_WEIGHTS: [[[i32; 3]; 3]; 3] = [
    [[2, 3, 2], [3, 6, 3], [2, 3, 2]],
    [[3, 6, 3], [6, 0, 6], [3, 6, 3]],
    [[2, 3, 2], [3, 6, 3], [2, 3, 2]],
];

/// Radius of the cube averaged for each tap of the averaged central difference.
pub const AVERAGING_RADIUS: i32 = 2;

impl<'a, V: Voxel> VolumeCursor<'a, V> {
    pub fn central_difference_gradient(&self) -> Vector3<i32> {
        self.central_difference_gradient_with(V::is_occupied)
    }

    /// Difference of the occupancy of the two face neighbours along each axis, positive minus
    /// negative. Zero within one voxel of the volume boundary.
    pub fn central_difference_gradient_with<F>(&self, occupied: F) -> Vector3<i32>
    where
        F: Fn(V) -> bool,
    {
        if !self.is_within_margin(1) {
            return Vector3::zero();
        }

        let occ = |offset| occupied(self.peek(offset)) as i32;
        Vector3::new(
            occ(Offset::POS_X) - occ(Offset::NEG_X),
            occ(Offset::POS_Y) - occ(Offset::NEG_Y),
            occ(Offset::POS_Z) - occ(Offset::NEG_Z),
        )
    }

    pub fn averaged_central_difference_gradient(&self) -> Vector3<f32> {
        self.averaged_central_difference_gradient_with(V::is_occupied)
    }

    /// Like `central_difference_gradient`, but each tap is the occupied fraction of a
    /// `5 x 5 x 5` cube around the face neighbour. The cubes reach three voxels from the cursor,
    /// so this is zero within three voxels of the volume boundary.
    pub fn averaged_central_difference_gradient_with<F>(&self, occupied: F) -> Vector3<f32>
    where
        F: Fn(V) -> bool,
    {
        if !self.is_within_margin(AVERAGING_RADIUS + 1) {
            return Vector3::zero();
        }

        let p = self.position();
        let tap = |offset: Offset| {
            self.averaged_voxel_at_with(p + offset.to_vec(), AVERAGING_RADIUS, &occupied)
        };
        Vector3::new(
            tap(Offset::POS_X) - tap(Offset::NEG_X),
            tap(Offset::POS_Y) - tap(Offset::NEG_Y),
            tap(Offset::POS_Z) - tap(Offset::NEG_Z),
        )
    }

    pub fn sobel_gradient(&self) -> Vector3<i32> {
        self.sobel_gradient_with(V::is_occupied)
    }

    /// Weighted sum over the 26 neighbours of `offset * weight` for each occupied neighbour.
    /// Zero within one voxel of the volume boundary.
    pub fn sobel_gradient_with<F>(&self, occupied: F) -> Vector3<i32>
    where
        F: Fn(V) -> bool,
    {
        if !self.is_within_margin(1) {
            return Vector3::zero();
        }

        let mut gradient = Vector3::zero();
        for offset in Offset::neighbours() {
            if occupied(self.peek(offset)) {
                let weight = SOBEL_WEIGHTS[(offset.dz() + 1) as usize][(offset.dy() + 1) as usize]
                    [(offset.dx() + 1) as usize];
                gradient += offset.to_vec() * weight;
            }
        }
        gradient
    }

    pub fn averaged_voxel_at(&self, p: Point3<i32>, size: i32) -> f32 {
        self.averaged_voxel_at_with(p, size, V::is_occupied)
    }

    /// Fraction of occupied voxels in the cube of side `2 * size + 1` centred on `p`. Every
    /// sample goes through `Volume::voxel_at`, so the cube must lie inside the volume.
    pub fn averaged_voxel_at_with<F>(&self, p: Point3<i32>, size: i32, occupied: F) -> f32
    where
        F: Fn(V) -> bool,
    {
        let volume = self.volume();
        let mut count = 0u32;
        for z in p.z - size..=p.z + size {
            for y in p.y - size..=p.y + size {
                for x in p.x - size..=p.x + size {
                    if occupied(volume.voxel_at(Point3::new(x, y, z))) {
                        count += 1;
                    }
                }
            }
        }

        let side = (2 * size + 1) as f32;
        count as f32 / (side * side * side)
    }
}
