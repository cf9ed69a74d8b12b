use std::path::PathBuf;

use anyhow::Result;
use log::{debug, error, info};
use structopt::StructOpt;

use volmesh_types::decode;
use volmesh_util::Region;
use volmesh_voxels::{Material, Volume, VolumeDelta, VolumeUpdater};

mod faces;
mod inspect;
mod primitive;
mod settings;

use primitive::Shape;
use settings::Settings;

#[derive(Debug, StructOpt)]
struct Opts {
    #[structopt(short, long)]
    settings: PathBuf,
    #[structopt(subcommand)]
    action: Action,
}

#[derive(Debug, StructOpt)]
enum Action {
    /// Walk the region with a cursor and report occupancy and gradient statistics.
    Inspect,
    /// Draw the shapes through an updater and report which regions need re-extracting.
    EditReport,
    /// Build a face mesh of the region and run the mesh cleanup passes on it.
    Mesh,
}

fn run(opt: Opts) -> Result<()> {
    let settings = Settings::load(&opt.settings)?;
    let mut volume = Volume::<Material>::from_config(&settings.volume)?;
    let shape = Shape::from_config(&settings.shapes);

    let mut delta = VolumeDelta::empty();
    shape.draw(&mut VolumeUpdater::new(&mut volume, &mut delta));
    info!("Built volume: {:?}", volume.debug_summary());

    let region = settings.region.unwrap_or_else(|| volume.enclosing_region());

    match &opt.action {
        Action::Inspect => run_inspect(&volume, region),
        Action::EditReport => run_edit_report(&volume, &delta),
        Action::Mesh => run_mesh(&volume, region),
    }
}

fn run_inspect(volume: &Volume<Material>, region: Region) -> Result<()> {
    let report = inspect::inspect(volume, region);
    info!("Visited {} voxels in {:?}", report.visited, region);
    info!(
        "Occupied: {}, surface: {}",
        report.occupied, report.surface
    );
    info!(
        "Fast path peeks: {} of {} ({:.1}%)",
        report.fast_peeks,
        report.peeks,
        report.fast_peek_ratio() * 100.0
    );
    info!(
        "Mean surface gradient magnitude: central difference {:.3}, sobel {:.3}",
        report.mean_central_difference, report.mean_sobel
    );
    Ok(())
}

fn run_edit_report(volume: &Volume<Material>, delta: &VolumeDelta) -> Result<()> {
    let dirty = delta.dirty_regions(volume);
    info!(
        "{} of {} blocks modified",
        dirty.len(),
        volume.block_count()
    );
    for region in &dirty {
        debug!("Dirty: {:?}", region);
    }
    Ok(())
}

fn run_mesh(volume: &Volume<Material>, region: Region) -> Result<()> {
    let mut mesh = faces::extract_faces(volume, region)?;
    info!(
        "Extracted {} vertices, {} triangles",
        mesh.no_of_vertices(),
        mesh.no_of_triangles()
    );

    mesh.remove_degenerate_tris();
    mesh.remove_unused_vertices();

    let decoded = decode(&mesh);
    info!(
        "Decoded mesh: {} vertices, {} triangles, {} uniform, {} on material boundaries",
        decoded.no_of_vertices(),
        decoded.no_of_triangles(),
        decoded.no_of_uniform_triangles(),
        decoded.no_of_non_uniform_triangles()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    match run(Opts::from_args()) {
        Ok(()) => (),
        Err(end_error) => {
            for error in end_error.chain() {
                error!("{}", error);
                error!("========");
            }
        }
    }
}
