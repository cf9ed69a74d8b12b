use std::collections::HashSet;

use cgmath::{Point3, Vector3};

use volmesh_util::Region;

use crate::{core::Voxel, volume::Volume};

/// The set of blocks written to since the delta was last cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeDelta {
    pub modified_blocks: HashSet<Point3<i32>>,
}

/// Writes voxels into a volume while recording which blocks were touched.
pub struct VolumeUpdater<'a, V> {
    volume: &'a mut Volume<V>,
    updated_state: &'a mut VolumeDelta,
}

impl VolumeDelta {
    pub fn empty() -> Self {
        Self {
            modified_blocks: HashSet::new(),
        }
    }

    pub fn clear(&mut self) {
        self.modified_blocks.clear();
    }

    pub fn record_block_update(&mut self, block_pos: Point3<i32>) {
        self.modified_blocks.insert(block_pos);
    }

    pub fn update_from(&mut self, other: VolumeDelta) {
        self.modified_blocks.extend(other.modified_blocks);
    }

    pub fn is_empty(&self) -> bool {
        self.modified_blocks.is_empty()
    }

    /// The voxel regions covered by each modified block, in z, y, x order. These are the
    /// regions that need to be extracted again.
    pub fn dirty_regions<V: Voxel>(&self, volume: &Volume<V>) -> Vec<Region> {
        let shape = volume.block_shape();
        let side = shape.side_length();

        let mut blocks: Vec<_> = self.modified_blocks.iter().cloned().collect();
        blocks.sort_by_key(|p| (p.z, p.y, p.x));

        blocks
            .into_iter()
            .map(|block| Region::from_size(shape.block_origin(block), Vector3::new(side, side, side)))
            .collect()
    }
}

impl Default for VolumeDelta {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, V: Voxel> VolumeUpdater<'a, V> {
    pub fn new(volume: &'a mut Volume<V>, updated_state: &'a mut VolumeDelta) -> Self {
        Self {
            volume,
            updated_state,
        }
    }

    #[inline]
    pub fn volume(&self) -> &Volume<V> {
        self.volume
    }

    /// Panics if the position is outside the volume.
    #[inline]
    pub fn set_voxel(&mut self, point: Point3<i32>, voxel: V) {
        self.volume.set_voxel_at(point, voxel);
        let (block_pos, _) = self.volume.block_shape().split(point);
        self.updated_state.record_block_update(block_pos);
    }

    /// Set multiple voxels in one pass. Can be more efficient than many calls of `set_voxel` if
    /// the input iterator has good block locality (multiple voxels in the same block follow each
    /// other directly).
    ///
    /// Panics if any position is outside the volume.
    pub fn set_voxels<I>(&mut self, set_voxels: I)
    where
        I: IntoIterator<Item = (Point3<i32>, V)>,
    {
        let layout = self.volume.layout();
        let shape = layout.shape();
        let mut current: Option<(Point3<i32>, usize)> = None;

        for (point, voxel) in set_voxels {
            assert!(
                layout.contains_point(point),
                "voxel position {:?} is outside volume of side {}",
                point,
                layout.side_length()
            );
            let (block_pos, local) = shape.split(point);

            // Only do one set insert and one block index computation when we start a run of
            // voxels in a new block.
            let block_index = match current {
                Some((pos, index)) if pos == block_pos => index,
                _ => {
                    let index = layout.block_index_of_block(block_pos);
                    self.updated_state.record_block_update(block_pos);
                    current = Some((block_pos, index));
                    index
                }
            };

            self.volume
                .block_mut(block_index)
                .set_voxel_at_index(shape.pack(local), voxel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updater_records_blocks() {
        let mut volume = Volume::<u8>::new(32, 8).unwrap();
        let mut delta = VolumeDelta::empty();
        assert!(delta.is_empty());

        {
            let mut updater = VolumeUpdater::new(&mut volume, &mut delta);
            updater.set_voxel(Point3::new(3, 3, 3), 1);
            updater.set_voxel(Point3::new(4, 3, 3), 1);
            updater.set_voxels(
                (10..20).map(|x| (Point3::new(x, 30, 0), 2)),
            );
        }

        assert_eq!(volume.voxel_at(Point3::new(3, 3, 3)), 1);
        assert_eq!(volume.voxel_at(Point3::new(17, 30, 0)), 2);
        assert_eq!(volume.voxel_at(Point3::new(20, 30, 0)), 0);

        let expected: HashSet<_> = vec![
            Point3::new(0, 0, 0),
            Point3::new(1, 3, 0),
            Point3::new(2, 3, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(delta.modified_blocks, expected);

        assert_eq!(
            delta.dirty_regions(&volume),
            vec![
                Region::from_coords(0, 0, 0, 7, 7, 7),
                Region::from_coords(8, 24, 0, 15, 31, 7),
                Region::from_coords(16, 24, 0, 23, 31, 7),
            ]
        );
    }

    #[test]
    fn test_delta_merge() {
        let mut a = VolumeDelta::empty();
        a.record_block_update(Point3::new(0, 1, 0));

        let mut b = VolumeDelta::default();
        b.record_block_update(Point3::new(0, 1, 0));
        b.record_block_update(Point3::new(2, 2, 2));

        a.update_from(b);
        assert_eq!(a.modified_blocks.len(), 2);

        a.clear();
        assert!(a.is_empty());
    }

    #[test]
    #[should_panic(expected = "outside volume")]
    fn test_set_voxels_outside_volume() {
        let mut volume = Volume::<u8>::new(16, 8).unwrap();
        let mut delta = VolumeDelta::empty();
        let mut updater = VolumeUpdater::new(&mut volume, &mut delta);
        updater.set_voxels(vec![(Point3::new(0, 0, 0), 1), (Point3::new(0, 0, 16), 1)]);
    }
}
