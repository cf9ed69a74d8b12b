use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::DivDown;

/// An axis-aligned box of integer points. Both corners are inclusive, so a region whose lower
/// and upper corners are equal contains exactly one voxel.
///
/// A region whose upper corner is below its lower corner on any axis is not valid (see
/// [`Region::is_valid`]). Such regions are legal values and are used as "empty" sentinels, e.g.
/// [`Region::INVERTED`] is the natural starting point for [`Region::accumulate_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Region {
    lower: Point3<i32>,
    upper: Point3<i32>,
}

impl Default for Region {
    fn default() -> Self {
        Region::new(Point3::new(0, 0, 0), Point3::new(0, 0, 0))
    }
}

impl Region {
    /// The lower corner is as low as possible and the upper corner as high as possible.
    pub const MAX: Region = Region {
        lower: Point3 {
            x: i32::MIN,
            y: i32::MIN,
            z: i32::MIN,
        },
        upper: Point3 {
            x: i32::MAX,
            y: i32::MAX,
            z: i32::MAX,
        },
    };

    /// The lower corner is as high as possible and the upper corner as low as possible.
    pub const INVERTED: Region = Region {
        lower: Point3 {
            x: i32::MAX,
            y: i32::MAX,
            z: i32::MAX,
        },
        upper: Point3 {
            x: i32::MIN,
            y: i32::MIN,
            z: i32::MIN,
        },
    };

    #[inline]
    pub const fn new(lower: Point3<i32>, upper: Point3<i32>) -> Self {
        Region { lower, upper }
    }

    #[inline]
    pub const fn from_coords(
        lower_x: i32,
        lower_y: i32,
        lower_z: i32,
        upper_x: i32,
        upper_y: i32,
        upper_z: i32,
    ) -> Self {
        Region {
            lower: Point3 {
                x: lower_x,
                y: lower_y,
                z: lower_z,
            },
            upper: Point3 {
                x: upper_x,
                y: upper_y,
                z: upper_z,
            },
        }
    }

    /// A region starting at `lower` which is `size` voxels wide in each dimension. Every
    /// component of `size` must be at least 1.
    #[inline]
    pub fn from_size(lower: Point3<i32>, size: Vector3<i32>) -> Self {
        assert!(size.x >= 1 && size.y >= 1 && size.z >= 1);
        Region::new(lower, lower + size - Vector3::new(1, 1, 1))
    }

    #[inline]
    pub fn lower(self) -> Point3<i32> {
        self.lower
    }

    #[inline]
    pub fn upper(self) -> Point3<i32> {
        self.upper
    }

    #[inline]
    pub fn set_lower(&mut self, lower: Point3<i32>) {
        self.lower = lower;
    }

    #[inline]
    pub fn set_upper(&mut self, upper: Point3<i32>) {
        self.upper = upper;
    }

    /// True if the upper corner is at least as great as the lower corner on every axis.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.upper.x >= self.lower.x && self.upper.y >= self.lower.y && self.upper.z >= self.lower.z
    }

    /// Size of the region counted in cells, i.e. the distance between the corners.
    #[inline]
    pub fn dimensions_in_cells(self) -> Vector3<i32> {
        self.upper - self.lower
    }

    /// Size of the region counted in voxels. Because both corners are inclusive this is one more
    /// than the size in cells.
    #[inline]
    pub fn dimensions_in_voxels(self) -> Vector3<i32> {
        self.dimensions_in_cells() + Vector3::new(1, 1, 1)
    }

    #[inline]
    pub fn width_in_voxels(self) -> i32 {
        self.dimensions_in_voxels().x
    }

    #[inline]
    pub fn height_in_voxels(self) -> i32 {
        self.dimensions_in_voxels().y
    }

    #[inline]
    pub fn depth_in_voxels(self) -> i32 {
        self.dimensions_in_voxels().z
    }

    /// Number of voxels in the region, or zero if it is not valid.
    #[inline]
    pub fn volume_in_voxels(self) -> u64 {
        if !self.is_valid() {
            return 0;
        }
        let dims = self.dimensions_in_voxels();
        dims.x as u64 * dims.y as u64 * dims.z as u64
    }

    #[inline]
    pub fn contains_point_in_x(self, x: i32, boundary: i32) -> bool {
        x <= self.upper.x - boundary && x >= self.lower.x + boundary
    }

    #[inline]
    pub fn contains_point_in_y(self, y: i32, boundary: i32) -> bool {
        y <= self.upper.y - boundary && y >= self.lower.y + boundary
    }

    #[inline]
    pub fn contains_point_in_z(self, z: i32, boundary: i32) -> bool {
        z <= self.upper.z - boundary && z >= self.lower.z + boundary
    }

    /// Tests whether the point lies inside the region, after the region has been shrunk by
    /// `boundary` on every side.
    #[inline]
    pub fn contains_point(self, point: Point3<i32>, boundary: i32) -> bool {
        self.contains_point_in_x(point.x, boundary)
            && self.contains_point_in_y(point.y, boundary)
            && self.contains_point_in_z(point.z, boundary)
    }

    /// True if the given region is fully contained within self.
    #[inline]
    pub fn contains_region(self, other: Region) -> bool {
        self.contains_point(other.lower, 0) && self.contains_point(other.upper, 0)
    }

    /// Enlarges the region so that it contains the given point.
    #[inline]
    pub fn accumulate_point(&mut self, point: Point3<i32>) {
        self.lower.x = self.lower.x.min(point.x);
        self.lower.y = self.lower.y.min(point.y);
        self.lower.z = self.lower.z.min(point.z);
        self.upper.x = self.upper.x.max(point.x);
        self.upper.y = self.upper.y.max(point.y);
        self.upper.z = self.upper.z.max(point.z);
    }

    /// Enlarges the region so that it contains the given region. Invalid regions are ignored.
    #[inline]
    pub fn accumulate(&mut self, other: Region) {
        if !other.is_valid() {
            return;
        }
        self.accumulate_point(other.lower);
        self.accumulate_point(other.upper);
    }

    /// Crops the extents of self so that they lie within `other`. The result is not valid if the
    /// two regions do not overlap.
    #[inline]
    pub fn crop_to(&mut self, other: Region) {
        self.lower.x = self.lower.x.max(other.lower.x);
        self.lower.y = self.lower.y.max(other.lower.y);
        self.lower.z = self.lower.z.max(other.lower.z);
        self.upper.x = self.upper.x.min(other.upper.x);
        self.upper.y = self.upper.y.min(other.upper.y);
        self.upper.z = self.upper.z.min(other.upper.z);
    }

    /// The overlap of two regions, or `None` if they do not intersect.
    #[inline]
    pub fn intersection(self, other: Region) -> Option<Region> {
        let mut result = self;
        result.crop_to(other);
        if result.is_valid() {
            Some(result)
        } else {
            None
        }
    }

    #[inline]
    pub fn grow(&mut self, amount: i32) {
        self.grow_by(Vector3::new(amount, amount, amount));
    }

    #[inline]
    pub fn grow_by(&mut self, amount: Vector3<i32>) {
        self.lower -= amount;
        self.upper += amount;
    }

    #[inline]
    pub fn shrink(&mut self, amount: i32) {
        self.shrink_by(Vector3::new(amount, amount, amount));
    }

    #[inline]
    pub fn shrink_by(&mut self, amount: Vector3<i32>) {
        self.lower += amount;
        self.upper -= amount;
    }

    /// Moves both corners by the given amount.
    #[inline]
    pub fn shift(&mut self, amount: Vector3<i32>) {
        self.lower += amount;
        self.upper += amount;
    }

    #[inline]
    pub fn shift_lower_corner(&mut self, amount: Vector3<i32>) {
        self.lower += amount;
    }

    #[inline]
    pub fn shift_upper_corner(&mut self, amount: Vector3<i32>) {
        self.upper += amount;
    }

    /// Returns the region of quanta touched by `self` when space is divided into cubes of side
    /// `quantum`. The result is given in units of quanta.
    #[inline]
    pub fn quantize(self, quantum: i32) -> Region {
        assert!(quantum > 0);
        Region {
            lower: Point3::new(
                self.lower.x.div_down(quantum),
                self.lower.y.div_down(quantum),
                self.lower.z.div_down(quantum),
            ),
            upper: Point3::new(
                self.upper.x.div_down(quantum),
                self.upper.y.div_down(quantum),
                self.upper.z.div_down(quantum),
            ),
        }
    }

    /// The inverse of `quantize`: the voxel region covered by a region measured in quanta.
    #[inline]
    pub fn scale_up(self, quantum: i32) -> Region {
        assert!(quantum > 0);
        Region {
            lower: self.lower * quantum,
            upper: Point3::new(
                self.upper.x * quantum + quantum - 1,
                self.upper.y * quantum + quantum - 1,
                self.upper.z * quantum + quantum - 1,
            ),
        }
    }

    /// Visits every point in the region, x fastest and z slowest. Yields nothing if the region
    /// is not valid.
    #[inline]
    pub fn iter_points(self) -> impl Iterator<Item = Point3<i32>> {
        let lower = self.lower;
        let upper = self.upper;

        (lower.z..=upper.z).flat_map(move |z| {
            (lower.y..=upper.y)
                .flat_map(move |y| (lower.x..=upper.x).map(move |x| Point3 { x, y, z }))
        })
    }

    /// Visits every point in the region, one cube of side `quantum` at a time. Cubes are visited
    /// in the same order as `iter_points`, and points within each cube likewise. Writers which
    /// store data in blocks of side `quantum` touch each block in one run.
    pub fn iter_points_aligned(self, quantum: i32) -> impl Iterator<Item = Point3<i32>> {
        let region = self;
        let quanta = if self.is_valid() {
            self.quantize(quantum)
        } else {
            Region::INVERTED
        };

        quanta.iter_points().flat_map(move |q| {
            let cube = Region::from_coords(q.x, q.y, q.z, q.x, q.y, q.z).scale_up(quantum);
            cube.intersection(region)
                .into_iter()
                .flat_map(Region::iter_points)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_points_aligned() {
        let region = Region::from_coords(-3, 1, 0, 5, 2, 0);
        let points: Vec<_> = region.iter_points_aligned(4).collect();
        assert_eq!(points.len() as u64, region.volume_in_voxels());

        // x = -3 .. -1 lie in the first cube, 0 .. 3 in the second and 4 .. 5 in the third
        assert_eq!(&points[..6], &[
            Point3::new(-3, 1, 0),
            Point3::new(-2, 1, 0),
            Point3::new(-1, 1, 0),
            Point3::new(-3, 2, 0),
            Point3::new(-2, 2, 0),
            Point3::new(-1, 2, 0),
        ]);
        assert_eq!(points[6], Point3::new(0, 1, 0));

        let mut sorted = points.clone();
        sorted.sort_by_key(|p| (p.z, p.y, p.x));
        assert_eq!(sorted, region.iter_points().collect::<Vec<_>>());

        assert_eq!(Region::INVERTED.iter_points_aligned(4).count(), 0);
    }

    #[test]
    fn test_dimensions() {
        let region = Region::from_coords(1, 2, 3, 4, 4, 3);
        assert!(region.is_valid());
        assert_eq!(region.dimensions_in_cells(), Vector3::new(3, 2, 0));
        assert_eq!(region.dimensions_in_voxels(), Vector3::new(4, 3, 1));
        assert_eq!(region.volume_in_voxels(), 12);

        assert_eq!(
            Region::from_size(Point3::new(1, 2, 3), Vector3::new(4, 3, 1)),
            region
        );

        assert!(!Region::INVERTED.is_valid());
        assert_eq!(Region::INVERTED.volume_in_voxels(), 0);
        assert!(Region::MAX.is_valid());
        assert_eq!(Region::default().volume_in_voxels(), 1);
    }

    #[test]
    fn test_contains_point() {
        let region = Region::from_coords(0, 0, 0, 7, 7, 7);
        assert!(region.contains_point(Point3::new(0, 0, 0), 0));
        assert!(region.contains_point(Point3::new(7, 7, 7), 0));
        assert!(!region.contains_point(Point3::new(8, 7, 7), 0));
        assert!(!region.contains_point(Point3::new(-1, 0, 0), 0));

        assert!(!region.contains_point(Point3::new(0, 3, 3), 1));
        assert!(region.contains_point(Point3::new(1, 3, 6), 1));
        assert!(!region.contains_point(Point3::new(1, 3, 7), 1));

        assert!(region.contains_region(Region::from_coords(2, 2, 2, 7, 3, 4)));
        assert!(!region.contains_region(Region::from_coords(2, 2, 2, 8, 3, 4)));
    }

    #[test]
    fn test_accumulate() {
        let mut region = Region::INVERTED;
        region.accumulate_point(Point3::new(3, -1, 2));
        assert_eq!(region, Region::from_coords(3, -1, 2, 3, -1, 2));

        region.accumulate_point(Point3::new(0, 5, 2));
        assert_eq!(region, Region::from_coords(0, -1, 2, 3, 5, 2));

        region.accumulate(Region::INVERTED);
        assert_eq!(region, Region::from_coords(0, -1, 2, 3, 5, 2));

        region.accumulate(Region::from_coords(10, 0, 0, 11, 1, 1));
        assert_eq!(region, Region::from_coords(0, -1, 0, 11, 5, 2));
    }

    #[test]
    fn test_crop_and_intersection() {
        let mut region = Region::from_coords(-4, -4, -4, 20, 20, 20);
        region.crop_to(Region::from_coords(0, 0, 0, 15, 15, 15));
        assert_eq!(region, Region::from_coords(0, 0, 0, 15, 15, 15));

        let a = Region::from_coords(0, 0, 0, 3, 3, 3);
        let b = Region::from_coords(4, 0, 0, 8, 3, 3);
        assert_eq!(a.intersection(b), None);
        assert_eq!(
            a.intersection(Region::from_coords(3, 1, -2, 9, 9, 1)),
            Some(Region::from_coords(3, 1, 0, 3, 3, 1))
        );
    }

    #[test]
    fn test_grow_shrink_shift() {
        let mut region = Region::from_coords(2, 2, 2, 5, 5, 5);
        region.grow(1);
        assert_eq!(region, Region::from_coords(1, 1, 1, 6, 6, 6));
        region.shrink_by(Vector3::new(1, 2, 0));
        assert_eq!(region, Region::from_coords(2, 3, 1, 5, 4, 6));
        region.shift(Vector3::new(-2, 0, 1));
        assert_eq!(region, Region::from_coords(0, 3, 2, 3, 4, 7));
        region.shift_lower_corner(Vector3::new(1, 1, 1));
        region.shift_upper_corner(Vector3::new(0, 0, -5));
        assert_eq!(region, Region::from_coords(1, 4, 3, 3, 4, 2));
        assert!(!region.is_valid());
    }

    #[test]
    fn test_quantize() {
        let region = Region::from_coords(-15, -3, 17, -1, 30, 31);
        assert_eq!(region.quantize(16), Region::from_coords(-1, -1, 1, -1, 1, 1));
        assert_eq!(
            Region::from_coords(1, 0, 2, 1, 1, 2).scale_up(4),
            Region::from_coords(4, 0, 8, 7, 7, 11)
        );
    }

    #[test]
    fn test_iter_points() {
        let points: Vec<_> = Region::from_coords(0, 0, 0, 1, 1, 1).iter_points().collect();
        assert_eq!(
            points,
            vec![
                Point3::new(0, 0, 0),
                Point3::new(1, 0, 0),
                Point3::new(0, 1, 0),
                Point3::new(1, 1, 0),
                Point3::new(0, 0, 1),
                Point3::new(1, 0, 1),
                Point3::new(0, 1, 1),
                Point3::new(1, 1, 1),
            ]
        );

        assert_eq!(Region::INVERTED.iter_points().count(), 0);
    }
}
