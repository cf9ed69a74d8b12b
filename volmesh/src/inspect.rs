use cgmath::InnerSpace;

use volmesh_util::{convert_vec, Region};
use volmesh_voxels::{Material, Offset, Volume, VolumeCursor};

/// Statistics gathered by walking a region of a volume with a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectReport {
    pub visited: usize,
    pub occupied: usize,
    /// Occupied voxels with at least one empty face neighbour. Faces on the boundary of the
    /// volume count as empty.
    pub surface: usize,
    pub peeks: usize,
    pub fast_peeks: usize,
    pub mean_central_difference: f64,
    pub mean_sobel: f64,
}

impl InspectReport {
    pub fn fast_peek_ratio(&self) -> f64 {
        if self.peeks == 0 {
            0.0
        } else {
            self.fast_peeks as f64 / self.peeks as f64
        }
    }
}

pub fn inspect(volume: &Volume<Material>, region: Region) -> InspectReport {
    let mut report = InspectReport {
        visited: 0,
        occupied: 0,
        surface: 0,
        peeks: 0,
        fast_peeks: 0,
        mean_central_difference: 0.0,
        mean_sobel: 0.0,
    };
    let mut central_sum = 0.0;
    let mut sobel_sum = 0.0;

    let mut cursor = volume.cursor_in_region(region);
    while cursor.is_valid_for_region() {
        report.visited += 1;

        if cursor.voxel().is_empty() {
            cursor.move_forward_in_region();
            continue;
        }
        report.occupied += 1;

        if is_surface(&cursor, &mut report) {
            report.surface += 1;
            let central = cursor.central_difference_gradient();
            let sobel = cursor.sobel_gradient();
            central_sum += convert_vec!(central, f64).magnitude();
            sobel_sum += convert_vec!(sobel, f64).magnitude();
        }

        cursor.move_forward_in_region();
    }

    if report.surface > 0 {
        report.mean_central_difference = central_sum / report.surface as f64;
        report.mean_sobel = sobel_sum / report.surface as f64;
    }

    report
}

fn is_surface(cursor: &VolumeCursor<Material>, report: &mut InspectReport) -> bool {
    let volume = cursor.volume();
    let mut surface = false;

    for &offset in &Offset::FACES {
        if !volume.contains_point(cursor.position() + offset.to_vec()) {
            surface = true;
            continue;
        }

        report.peeks += 1;
        if cursor.peek_takes_fast_path(offset) {
            report.fast_peeks += 1;
        }
        if cursor.peek(offset).is_empty() {
            surface = true;
        }
    }

    surface
}
