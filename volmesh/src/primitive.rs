use cgmath::{InnerSpace, Point3};
use serde::{Deserialize, Serialize};

use volmesh_util::{convert_point, Region};
use volmesh_voxels::{Material, VolumeUpdater};

pub trait Primitive {
    /// Returns true if the given point is within the shape.
    fn test(&self, point: Point3<f64>) -> bool;

    /// Returns the smallest region of voxels containing the shape.
    fn bounds(&self) -> Region;

    /// Writes `fill` to every voxel of the volume whose position lies within the shape.
    fn draw(&self, voxels: &mut VolumeUpdater<Material>, fill: Material) {
        let block_side = voxels.volume().block_side_length();
        let region = match self.bounds().intersection(voxels.volume().enclosing_region()) {
            Some(region) => region,
            None => return,
        };

        voxels.set_voxels(
            region
                .iter_points_aligned(block_side)
                .filter(|p| self.test(convert_point!(p, f64)))
                .zip(std::iter::repeat(fill)),
        );
    }
}

pub struct Cuboid {
    pub lower: Point3<f64>,
    pub upper: Point3<f64>,
}

pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

/// A primitive as written in a settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveConfig {
    Sphere { center: Point3<f64>, radius: f64 },
    Cuboid { lower: Point3<f64>, upper: Point3<f64> },
}

/// A primitive together with the material it is drawn with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeConfig {
    pub material: u16,
    pub primitive: PrimitiveConfig,
}

pub struct ShapeComponent {
    pub fill: Material,
    pub primitive: Box<dyn Primitive>,
}

pub struct Shape {
    components: Vec<ShapeComponent>,
}

impl Shape {
    pub fn new(components: Vec<ShapeComponent>) -> Self {
        Self { components }
    }

    pub fn from_config(configs: &[ShapeConfig]) -> Self {
        Self::new(
            configs
                .iter()
                .map(|config| ShapeComponent {
                    fill: Material::from_u16(config.material),
                    primitive: config.primitive.to_primitive(),
                })
                .collect(),
        )
    }

    pub fn components(&self) -> &[ShapeComponent] {
        self.components.as_slice()
    }

    /// Draws every component in order, so later components overwrite earlier ones.
    pub fn draw(&self, voxels: &mut VolumeUpdater<Material>) {
        for component in &self.components {
            component.primitive.draw(voxels, component.fill);
        }
    }
}

impl PrimitiveConfig {
    pub fn to_primitive(&self) -> Box<dyn Primitive> {
        match *self {
            PrimitiveConfig::Sphere { center, radius } => Box::new(Sphere { center, radius }),
            PrimitiveConfig::Cuboid { lower, upper } => Box::new(Cuboid { lower, upper }),
        }
    }
}

impl Primitive for Cuboid {
    fn test(&self, point: Point3<f64>) -> bool {
        point.x >= self.lower.x
            && point.x <= self.upper.x
            && point.y >= self.lower.y
            && point.y <= self.upper.y
            && point.z >= self.lower.z
            && point.z <= self.upper.z
    }

    fn bounds(&self) -> Region {
        round_bounds(self.lower, self.upper)
    }
}

impl Primitive for Sphere {
    fn test(&self, point: Point3<f64>) -> bool {
        (point - self.center).magnitude2() < self.radius * self.radius
    }

    fn bounds(&self) -> Region {
        let r = self.radius;
        round_bounds(
            Point3::new(self.center.x - r, self.center.y - r, self.center.z - r),
            Point3::new(self.center.x + r, self.center.y + r, self.center.z + r),
        )
    }
}

fn round_bounds(lower: Point3<f64>, upper: Point3<f64>) -> Region {
    Region::new(
        Point3::new(
            lower.x.floor() as i32,
            lower.y.floor() as i32,
            lower.z.floor() as i32,
        ),
        Point3::new(
            upper.x.ceil() as i32,
            upper.y.ceil() as i32,
            upper.z.ceil() as i32,
        ),
    )
}
