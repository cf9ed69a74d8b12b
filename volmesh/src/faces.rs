use std::collections::HashMap;

use anyhow::{bail, Result};
use cgmath::{Point3, Vector3};

use volmesh_types::{CubicVertex, Index, Mesh};
use volmesh_util::Region;
use volmesh_voxels::{Material, Offset, Volume};

/// Builds a mesh with one quad for every face of an occupied voxel in `region` whose neighbour
/// across that face is empty or outside the volume. Vertices at the same corner with the same
/// material are shared.
///
/// Vertex positions are relative to the lower corner of the region, so the region may be at
/// most 255 voxels wide.
pub fn extract_faces(volume: &Volume<Material>, region: Region) -> Result<Mesh<CubicVertex<u16>>> {
    let region = match region.intersection(volume.enclosing_region()) {
        Some(region) => region,
        None => return Ok(Mesh::new()),
    };
    let dims = region.dimensions_in_voxels();
    if dims.x > 255 || dims.y > 255 || dims.z > 255 {
        bail!(
            "region {:?} is too large for cubic vertices, at most 255 voxels per side",
            region
        );
    }

    let mut mesh = Mesh::new();
    mesh.set_region(region);
    let mut corner_indices: HashMap<(Point3<i32>, u16), Index> = HashMap::new();
    let origin = region.lower() - Point3::new(0, 0, 0);

    let mut cursor = volume.cursor_in_region(region);
    while cursor.is_valid_for_region() {
        let voxel = cursor.voxel();
        if voxel.is_empty() {
            cursor.move_forward_in_region();
            continue;
        }

        for &offset in &Offset::FACES {
            let neighbour = cursor.position() + offset.to_vec();
            if volume.contains_point(neighbour) && !cursor.peek(offset).is_empty() {
                continue;
            }

            let local = cursor.position() - origin;
            let mut quad = [0; 4];
            for (slot, corner) in quad.iter_mut().zip(face_corners(local, offset).iter()) {
                let key = (*corner, voxel.to_u16());
                *slot = *corner_indices.entry(key).or_insert_with(|| {
                    mesh.add_vertex(CubicVertex::new(
                        Point3::new(corner.x as u8, corner.y as u8, corner.z as u8),
                        voxel.to_u16(),
                    ))
                });
            }

            mesh.add_triangle(quad[0], quad[1], quad[2]);
            mesh.add_triangle(quad[0], quad[2], quad[3]);
        }

        cursor.move_forward_in_region();
    }

    Ok(mesh)
}

/// Corners of one face of the voxel at `p`, counter-clockwise seen from outside. Corner
/// coordinates count voxel corners, so the voxel at `p` spans `p` to `p + 1`.
fn face_corners(p: Point3<i32>, offset: Offset) -> [Point3<i32>; 4] {
    let normal = offset.to_vec();
    let (u, v) = if normal.x != 0 {
        (Vector3::unit_y(), Vector3::unit_z())
    } else if normal.y != 0 {
        (Vector3::unit_z(), Vector3::unit_x())
    } else {
        (Vector3::unit_x(), Vector3::unit_y())
    };

    let base = p + Vector3::new(normal.x.max(0), normal.y.max(0), normal.z.max(0));
    let corners = [base, base + u, base + u + v, base + v];
    if normal.x + normal.y + normal.z > 0 {
        corners
    } else {
        [corners[0], corners[3], corners[2], corners[1]]
    }
}
