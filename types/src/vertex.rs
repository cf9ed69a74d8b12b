use cgmath::{InnerSpace, Point3, Vector3, Zero};
use serde::{Deserialize, Serialize};

/// A vertex ready for consumption by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex<D> {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub data: D,
}

/// Compact vertex emitted by cubic extraction. Positions are on the voxel grid, so they fit in a
/// byte per axis and carry no normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubicVertex<D> {
    pub encoded_position: Point3<u8>,
    pub data: D,
}

/// Compact vertex emitted by marching cubes. The position is fixed point with 8 fractional bits
/// and the normal is octahedron-encoded into 16 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarchingCubesVertex<D> {
    pub encoded_position: Point3<u16>,
    pub encoded_normal: u16,
    pub data: D,
}

/// Vertex types which can be expanded into a `Vertex`.
pub trait DecodeVertex {
    type Data;

    fn decode(&self) -> Vertex<Self::Data>;
}

/// Vertex types which carry a material, used to tell apart triangles lying inside one material
/// from triangles on the boundary between materials.
pub trait HasMaterial {
    type Material: PartialEq;

    fn material(&self) -> Self::Material;
}

impl<D: Copy> DecodeVertex for Vertex<D> {
    type Data = D;

    fn decode(&self) -> Vertex<D> {
        *self
    }
}

impl<D: Copy> CubicVertex<D> {
    pub fn new(position: Point3<u8>, data: D) -> Self {
        CubicVertex {
            encoded_position: position,
            data,
        }
    }
}

impl<D: Copy> DecodeVertex for CubicVertex<D> {
    type Data = D;

    /// Encoded positions are shifted up by half a voxel so that they are never negative.
    fn decode(&self) -> Vertex<D> {
        let p = self.encoded_position;
        Vertex {
            position: Point3::new(p.x as f32 - 0.5, p.y as f32 - 0.5, p.z as f32 - 0.5),
            normal: Vector3::zero(),
            data: self.data,
        }
    }
}

impl<D: Copy> MarchingCubesVertex<D> {
    const FRACTIONAL_SCALE: f32 = 256.0;

    /// Panics in debug builds if the position is negative or at least 256 on any axis.
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, data: D) -> Self {
        let encode = |v: f32| {
            debug_assert!(
                (0.0..256.0).contains(&v),
                "marching cubes vertex coordinate {} out of range",
                v
            );
            (v * Self::FRACTIONAL_SCALE).round() as u16
        };

        MarchingCubesVertex {
            encoded_position: Point3::new(encode(position.x), encode(position.y), encode(position.z)),
            encoded_normal: encode_normal(normal),
            data,
        }
    }
}

impl<D: Copy> DecodeVertex for MarchingCubesVertex<D> {
    type Data = D;

    fn decode(&self) -> Vertex<D> {
        let p = self.encoded_position;
        let scale = Self::FRACTIONAL_SCALE;
        Vertex {
            position: Point3::new(p.x as f32 / scale, p.y as f32 / scale, p.z as f32 / scale),
            normal: decode_normal(self.encoded_normal),
            data: self.data,
        }
    }
}

impl<D: Copy + PartialEq> HasMaterial for Vertex<D> {
    type Material = D;

    fn material(&self) -> D {
        self.data
    }
}

impl<D: Copy + PartialEq> HasMaterial for CubicVertex<D> {
    type Material = D;

    fn material(&self) -> D {
        self.data
    }
}

impl<D: Copy + PartialEq> HasMaterial for MarchingCubesVertex<D> {
    type Material = D;

    fn material(&self) -> D {
        self.data
    }
}

#[inline]
fn sign(v: f32) -> f32 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Packs a normal into 16 bits using an octahedral projection: x in the high byte, y in the low
/// byte. A zero vector is encoded as +z.
pub fn encode_normal(normal: Vector3<f32>) -> u16 {
    let l1 = normal.x.abs() + normal.y.abs() + normal.z.abs();
    if l1 == 0.0 {
        return encode_normal(Vector3::unit_z());
    }

    let mut x = normal.x / l1;
    let mut y = normal.y / l1;
    if normal.z < 0.0 {
        let (fx, fy) = (x, y);
        x = (1.0 - fy.abs()) * sign(fx);
        y = (1.0 - fx.abs()) * sign(fy);
    }

    let to_byte = |v: f32| (((v + 1.0) * 0.5 * 255.0).round() as u16).min(255);
    (to_byte(x) << 8) | to_byte(y)
}

/// Inverse of `encode_normal`. The result has unit length.
pub fn decode_normal(encoded: u16) -> Vector3<f32> {
    let from_byte = |b: u16| b as f32 / 255.0 * 2.0 - 1.0;
    let mut x = from_byte((encoded >> 8) & 0xFF);
    let mut y = from_byte(encoded & 0xFF);
    let z = 1.0 - x.abs() - y.abs();

    if z < 0.0 {
        let (fx, fy) = (x, y);
        x = (1.0 - fy.abs()) * sign(fx);
        y = (1.0 - fx.abs()) * sign(fy);
    }

    Vector3::new(x, y, z).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_decode() {
        let vertex = CubicVertex::new(Point3::new(3, 0, 255), 7u8);
        let decoded = vertex.decode();
        assert_eq!(decoded.position, Point3::new(2.5, -0.5, 254.5));
        assert_eq!(decoded.normal, Vector3::zero());
        assert_eq!(decoded.data, 7);
    }

    #[test]
    fn test_marching_cubes_position() {
        let vertex = MarchingCubesVertex::new(Point3::new(1.5, 0.25, 17.0), Vector3::unit_x(), ());
        assert_eq!(vertex.encoded_position, Point3::new(384, 64, 17 * 256));
        assert_eq!(vertex.decode().position, Point3::new(1.5, 0.25, 17.0));
    }

    #[test]
    fn test_normal_encoding() {
        let normals = [
            Vector3::unit_x(),
            -Vector3::unit_y(),
            Vector3::unit_z(),
            -Vector3::unit_z(),
            Vector3::new(1.0, 1.0, 1.0).normalize(),
            Vector3::new(-0.3, 0.2, -0.9).normalize(),
            Vector3::new(0.6, -0.8, 0.0),
        ];

        for &normal in &normals {
            let decoded = decode_normal(encode_normal(normal));
            assert!((decoded.magnitude() - 1.0).abs() < 1e-4);
            assert!(
                decoded.dot(normal) > 0.99,
                "{:?} decoded as {:?}",
                normal,
                decoded
            );
        }

        assert_eq!(
            encode_normal(Vector3::zero()),
            encode_normal(Vector3::unit_z())
        );
    }
}
