use serde::{Deserialize, Serialize};

use volmesh_util::Region;

use crate::vertex::{DecodeVertex, HasMaterial, Vertex};

pub type Index = u32;

/// A level of detail: the half-open range `[begin, end)` of the index sequence holding its
/// triangles. Both ends are multiples of 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodRecord {
    pub begin: usize,
    pub end: usize,
}

/// Indexed triangle mesh as built up by surface extraction.
///
/// Vertices are not deduplicated: every `add_vertex` call creates a new vertex. Callers must only
/// pass indices of existing vertices to `add_triangle`; this is only checked in debug builds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mesh<V> {
    vertices: Vec<V>,
    indices: Vec<Index>,
    region: Region,
    lod_records: Vec<LodRecord>,
}

impl<V> Default for Mesh<V> {
    fn default() -> Self {
        Mesh {
            vertices: Vec::new(),
            indices: Vec::new(),
            region: Region::INVERTED,
            lod_records: Vec::new(),
        }
    }
}

impl<V> Mesh<V> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Vertex data can be edited in place. The number of vertices cannot change this way, so
    /// the indices stay valid.
    #[inline]
    pub fn vertices_mut(&mut self) -> &mut [V] {
        &mut self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    /// The volume region this mesh was extracted from.
    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    #[inline]
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    #[inline]
    pub fn lod_records(&self) -> &[LodRecord] {
        &self.lod_records
    }

    pub fn add_lod_record(&mut self, record: LodRecord) {
        debug_assert!(record.begin <= record.end && record.end <= self.indices.len());
        debug_assert!(record.begin % 3 == 0 && record.end % 3 == 0);
        self.lod_records.push(record);
    }

    #[inline]
    pub fn no_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn no_of_indices(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn no_of_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.lod_records.clear();
    }

    /// Appends a vertex and returns its index.
    #[inline]
    pub fn add_vertex(&mut self, vertex: V) -> Index {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as Index
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: Index, i1: Index, i2: Index) {
        debug_assert!(
            (i0.max(i1).max(i2) as usize) < self.vertices.len(),
            "triangle ({}, {}, {}) refers to a vertex past the end of the mesh",
            i0,
            i1,
            i2
        );
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Index; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Number of triangles which do not refer to three distinct vertices.
    pub fn no_of_degenerate_tris(&self) -> usize {
        self.triangles().filter(|&tri| is_degenerate(tri)).count()
    }

    /// Removes degenerate triangles, keeping the others in order. Vertices are left alone, so
    /// some may no longer be used. LOD records are shrunk to cover the same surviving
    /// triangles.
    pub fn remove_degenerate_tris(&mut self) {
        let triangle_count = self.no_of_triangles();

        // kept_before[t] is the number of surviving triangles before triangle t
        let mut kept_before = Vec::with_capacity(triangle_count + 1);
        let mut kept = 0;
        let mut write = 0;
        for t in 0..triangle_count {
            kept_before.push(kept);
            let tri = [
                self.indices[3 * t],
                self.indices[3 * t + 1],
                self.indices[3 * t + 2],
            ];
            if !is_degenerate(tri) {
                self.indices[write..write + 3].copy_from_slice(&tri);
                write += 3;
                kept += 1;
            }
        }
        kept_before.push(kept);
        self.indices.truncate(write);

        for record in &mut self.lod_records {
            record.begin = kept_before[record.begin / 3] * 3;
            record.end = kept_before[record.end / 3] * 3;
        }

        log::debug!(
            "Removed {} degenerate triangles, {} remain",
            triangle_count - kept,
            kept
        );
    }

    /// Removes vertices which no triangle refers to and renumbers the indices to match. The
    /// surviving vertices keep their original relative order, and the index sequence keeps its
    /// length, so LOD records remain valid.
    pub fn remove_unused_vertices(&mut self) {
        let vertex_count = self.vertices.len();

        let mut used = vec![false; vertex_count];
        for &index in &self.indices {
            used[index as usize] = true;
        }

        let mut new_index = vec![0 as Index; vertex_count];
        let mut next = 0;
        for (old, &is_used) in used.iter().enumerate() {
            if is_used {
                new_index[old] = next;
                next += 1;
            }
        }

        let mut old = 0;
        self.vertices.retain(|_| {
            let keep = used[old];
            old += 1;
            keep
        });

        for index in &mut self.indices {
            *index = new_index[*index as usize];
        }

        log::debug!(
            "Removed {} unused vertices, {} remain",
            vertex_count - self.vertices.len(),
            self.vertices.len()
        );
    }
}

impl<V: Clone> Mesh<V> {
    /// Combine another mesh into this one, resulting in a mesh that is the union of the two.
    pub fn union_from(&mut self, other: &Mesh<V>) {
        let start_index = self.vertices.len() as Index;
        let start_offset = self.indices.len();

        self.vertices.extend(other.vertices.iter().cloned());
        self.indices
            .extend(other.indices.iter().cloned().map(|ix| start_index + ix));
        self.lod_records
            .extend(other.lod_records.iter().map(|record| LodRecord {
                begin: record.begin + start_offset,
                end: record.end + start_offset,
            }));
        self.region.accumulate(other.region);
    }

    /// Combine two meshes, creating a mesh that is the union of the two.
    pub fn union(lhs: &Mesh<V>, rhs: &Mesh<V>) -> Mesh<V> {
        let mut result = lhs.clone();
        result.union_from(rhs);
        result
    }
}

impl<V: HasMaterial> Mesh<V> {
    /// Number of triangles whose three vertices all have the same material.
    pub fn no_of_uniform_triangles(&self) -> usize {
        self.triangles()
            .filter(|&tri| self.is_uniform(tri))
            .count()
    }

    /// Number of triangles on a boundary between materials.
    pub fn no_of_non_uniform_triangles(&self) -> usize {
        self.no_of_triangles() - self.no_of_uniform_triangles()
    }

    fn is_uniform(&self, [i0, i1, i2]: [Index; 3]) -> bool {
        let m0 = self.vertices[i0 as usize].material();
        m0 == self.vertices[i1 as usize].material() && m0 == self.vertices[i2 as usize].material()
    }
}

#[inline]
fn is_degenerate([i0, i1, i2]: [Index; 3]) -> bool {
    i0 == i1 || i1 == i2 || i0 == i2
}

/// Produces a mesh of decoded vertices with the same triangles, region and LOD records.
pub fn decode<E: DecodeVertex>(mesh: &Mesh<E>) -> Mesh<Vertex<E::Data>> {
    Mesh {
        vertices: mesh.vertices.iter().map(DecodeVertex::decode).collect(),
        indices: mesh.indices.clone(),
        region: mesh.region,
        lod_records: mesh.lod_records.clone(),
    }
}
