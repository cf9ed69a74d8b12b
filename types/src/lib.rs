//! Mesh containers and vertex formats produced by surface extraction.
pub mod mesh;
pub mod vertex;

pub use mesh::{decode, Index, LodRecord, Mesh};
pub use vertex::{CubicVertex, DecodeVertex, HasMaterial, MarchingCubesVertex, Vertex};
