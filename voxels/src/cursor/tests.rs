use super::*;

use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_volume(side: u32, block_side: u32, seed: u64) -> Volume<u8> {
    let mut volume = Volume::new(side, block_side).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let region = volume.enclosing_region();
    volume.fill_with(region, |_| {
        if rng.gen_range(0, 10) < 3 {
            rng.gen_range(1, 255)
        } else {
            0
        }
    });
    volume
}

fn visit_all(cursor: &mut VolumeCursor<u8>) -> Vec<Point3<i32>> {
    let mut visited = Vec::new();
    while cursor.is_valid_for_region() {
        visited.push(cursor.position());
        cursor.move_forward_in_region();
    }
    visited
}

#[test]
fn test_peek_matches_voxel_at() {
    let volume = random_volume(16, 4, 3);
    let mut cursor = volume.cursor();
    let mut fast_count = 0;
    let mut slow_count = 0;

    for p in Region::from_coords(1, 1, 1, 14, 14, 14).iter_points() {
        cursor.set_position(p);
        assert_eq!(cursor.voxel(), volume.voxel_at(p));
        assert_eq!(cursor.block_index(), volume.block_index_for(p));

        for offset in Offset::all() {
            assert_eq!(
                cursor.peek(offset),
                volume.voxel_at(p + offset.to_vec()),
                "peek {:?} from {:?}",
                offset,
                p
            );
            if cursor.peek_takes_fast_path(offset) {
                fast_count += 1;
            } else {
                slow_count += 1;
            }
        }
    }

    // both paths were exercised
    assert!(fast_count > 0);
    assert!(slow_count > 0);
}

#[test]
fn test_region_visited_exactly_once() {
    let volume = Volume::<u8>::new(16, 4).unwrap();
    let region = Region::from_coords(3, 5, 2, 13, 9, 11);
    let mut cursor = volume.cursor_in_region(region);

    let visited = visit_all(&mut cursor);
    assert_eq!(visited.len() as u64, region.volume_in_voxels());

    let unique: HashSet<_> = visited.iter().cloned().collect();
    assert_eq!(unique.len(), visited.len());
    assert_eq!(unique, region.iter_points().collect::<HashSet<_>>());
    assert!(!cursor.is_valid_for_region());
}

#[test]
fn test_scanline_order_within_block() {
    let volume = Volume::<u8>::new(8, 4).unwrap();
    let region = Region::from_coords(1, 1, 1, 2, 3, 2);
    let mut cursor = volume.cursor_in_region(region);

    let visited = visit_all(&mut cursor);
    assert_eq!(visited, region.iter_points().collect::<Vec<_>>());
}

#[test]
fn test_block_major_order() {
    let volume = Volume::<u8>::new(8, 4).unwrap();
    let mut cursor = volume.cursor_in_region(Region::from_coords(2, 0, 0, 5, 1, 0));

    let visited = visit_all(&mut cursor);
    assert_eq!(
        visited,
        vec![
            Point3::new(2, 0, 0),
            Point3::new(3, 0, 0),
            Point3::new(2, 1, 0),
            Point3::new(3, 1, 0),
            Point3::new(4, 0, 0),
            Point3::new(5, 0, 0),
            Point3::new(4, 1, 0),
            Point3::new(5, 1, 0),
        ]
    );
}

#[test]
fn test_whole_volume_traversal() {
    let volume = random_volume(16, 8, 11);
    let mut cursor = volume.cursor();
    let mut count = 0;
    let mut occupied = 0;

    while cursor.is_valid_for_region() {
        assert_eq!(cursor.voxel(), volume.voxel_at(cursor.position()));
        if cursor.voxel() != 0 {
            occupied += 1;
        }
        count += 1;
        cursor.move_forward_in_region();
    }

    assert_eq!(count, 16 * 16 * 16);
    assert_eq!(occupied, volume.debug_summary().count_occupied);
}

#[test]
fn test_small_region_takes_fast_path() {
    let volume = random_volume(8, 4, 5);
    let mut cursor = volume.cursor_in_region(Region::from_coords(1, 1, 1, 2, 2, 2));

    let mut visits = 0;
    while cursor.is_valid_for_region() {
        for offset in Offset::all() {
            assert!(cursor.peek_takes_fast_path(offset));
            let index = (cursor.voxel_index() as isize
                + offset.dx() as isize
                + offset.dy() as isize * 4
                + offset.dz() as isize * 16) as usize;
            assert_eq!(
                cursor.peek(offset),
                volume.block(cursor.block_index()).voxel_at_index(index)
            );
        }
        visits += 1;
        cursor.move_forward_in_region();
    }
    assert_eq!(visits, 8);
}

#[test]
fn test_empty_and_cropped_regions() {
    let volume = Volume::<u8>::new(8, 4).unwrap();

    let cursor = volume.cursor_in_region(Region::INVERTED);
    assert!(!cursor.is_valid_for_region());

    let cursor = volume.cursor_in_region(Region::from_coords(20, 20, 20, 30, 30, 30));
    assert!(!cursor.is_valid_for_region());

    let mut cursor = volume.cursor_in_region(Region::from_coords(-2, -2, -2, 1, 1, 1));
    assert_eq!(cursor.valid_region(), Region::from_coords(0, 0, 0, 1, 1, 1));
    assert_eq!(visit_all(&mut cursor).len(), 8);
}

#[test]
fn test_set_position_validity() {
    let volume = Volume::<u8>::new(16, 4).unwrap();
    let mut cursor = volume.cursor_in_region(Region::from_coords(4, 4, 4, 7, 7, 7));
    assert!(cursor.is_valid_for_region());
    assert_eq!(cursor.position(), Point3::new(4, 4, 4));

    cursor.set_position(Point3::new(0, 5, 5));
    assert!(!cursor.is_valid_for_region());

    cursor.set_position(Point3::new(6, 7, 5));
    assert!(cursor.is_valid_for_region());

    // repositioning does not change the region
    cursor.set_valid_region(Region::from_coords(0, 0, 0, 3, 3, 3));
    assert_eq!(cursor.position(), Point3::new(6, 7, 5));
    cursor.set_position(Point3::new(0, 0, 0));
    assert_eq!(visit_all(&mut cursor).len(), 64);
}

#[test]
#[should_panic(expected = "outside volume")]
fn test_set_position_outside_volume() {
    let volume = Volume::<u8>::new(8, 4).unwrap();
    let mut cursor = volume.cursor();
    cursor.set_position(Point3::new(3, 8, 0));
}

#[test]
#[should_panic(expected = "outside volume")]
fn test_peek_outside_volume() {
    let volume = Volume::<u8>::new(8, 4).unwrap();
    let cursor = volume.cursor();
    cursor.peek(Offset::NEG_X);
}

#[test]
fn test_cursor_mut_writes() {
    let mut volume = Volume::<u8>::new(16, 4).unwrap();
    let snapshot = volume.clone();
    let region = Region::from_coords(2, 3, 1, 9, 6, 12);

    {
        let mut cursor = volume.cursor_mut_in_region(region);
        while cursor.is_valid_for_region() {
            let p = cursor.position();
            cursor.set_voxel((p.x + p.y + p.z) as u8 + 1);
            assert_eq!(cursor.voxel(), (p.x + p.y + p.z) as u8 + 1);

            if p.x < 9 {
                assert_eq!(cursor.as_cursor().peek(Offset::POS_X), 0);
            }
            cursor.move_forward_in_region();
        }
    }

    for p in volume.enclosing_region().iter_points() {
        let expected = if region.contains_point(p, 0) {
            (p.x + p.y + p.z) as u8 + 1
        } else {
            0
        };
        assert_eq!(volume.voxel_at(p), expected);
        assert_eq!(snapshot.voxel_at(p), 0);
    }
}
