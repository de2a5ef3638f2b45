//! Heightfield triangulation
//!
//! [`HeightfieldMeshBuilder`] samples a noise field over a fixed-size grid
//! and produces an indexed triangle mesh with per-vertex colors. A LOD
//! factor selects the sampling stride, trading vertex density for build
//! cost while keeping the chunk's world footprint constant.

use glam::{Vec2, Vec3};

use crate::config::TerrainConfig;
use crate::terrain::noise::{NoiseField, NormalizeMode};
use crate::terrain::ramp::{ColorGradient, HeightCurve};

/// Vertices per side of a full-detail chunk.
///
/// Chosen so that `MAP_CHUNK_SIZE - 1 = 120` is divisible by every supported
/// simplification stride (1, 2, 4, 6, 8, 10, 12).
pub const MAP_CHUNK_SIZE: usize = 121;

/// Sampling stride for a LOD factor: full detail at 0, otherwise `lod * 2`.
pub fn simplification_step(lod: u32) -> usize {
    if lod == 0 { 1 } else { lod as usize * 2 }
}

/// Mesh buffers produced by a single build request.
///
/// Populated once during the build and then handed off by value; the
/// consumer either caches it in a LOD slot or discards it.
#[derive(Clone, Debug)]
pub struct MeshData {
    /// Vertex positions relative to `anchor`
    pub vertices: Vec<Vec3>,
    /// Triangle index triples, counter-clockwise winding
    pub triangles: Vec<u32>,
    /// Per-vertex RGBA colors, parallel to `vertices`
    pub colors: Vec<[f32; 4]>,
    /// World-space position the mesh was built relative to
    pub anchor: Vec3,
}

impl MeshData {
    fn with_resolution(vertices_per_side: usize, anchor: Vec3) -> Self {
        let quads = (vertices_per_side - 1) * (vertices_per_side - 1);
        Self {
            vertices: Vec::with_capacity(vertices_per_side * vertices_per_side),
            triangles: Vec::with_capacity(quads * 6),
            colors: Vec::with_capacity(vertices_per_side * vertices_per_side),
            anchor,
        }
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.triangles.push(a);
        self.triangles.push(b);
        self.triangles.push(c);
    }

    /// Vertices per side this mesh was built at
    pub fn vertices_per_side(&self) -> usize {
        (self.vertices.len() as f64).sqrt() as usize
    }
}

/// Converts sampled height grids into triangulated, colored meshes.
///
/// Holds only immutable generation parameters, so a single builder is shared
/// across background build threads.
pub struct HeightfieldMeshBuilder {
    field: NoiseField,
    normalize_mode: NormalizeMode,
    height_curve: HeightCurve,
    color_gradient: ColorGradient,
    max_color_distance: f32,
}

impl HeightfieldMeshBuilder {
    pub fn new(config: &TerrainConfig) -> Self {
        Self {
            field: NoiseField::new(config.noise.clone()),
            normalize_mode: config.normalize_mode,
            height_curve: config.height_curve.clone(),
            color_gradient: config.color_gradient.clone(),
            max_color_distance: config.max_color_distance,
        }
    }

    /// Access the underlying noise field
    pub fn field(&self) -> &NoiseField {
        &self.field
    }

    /// Build the mesh for a chunk anchored at `anchor`, simplified by `lod`.
    ///
    /// The stride must divide `MAP_CHUNK_SIZE - 1`; configurations are
    /// validated up front so this holds for every dispatched build.
    pub fn build_mesh(&self, anchor: Vec3, lod: u32) -> MeshData {
        let step = simplification_step(lod);
        let vps = (MAP_CHUNK_SIZE - 1) / step + 1;

        let mut mesh = MeshData::with_resolution(vps, anchor);

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;

        // Pass 1: raw heights plus triangulation. Two CCW triangles per
        // quad; the last row and column only contribute vertices.
        let mut index: u32 = 0;
        for z in (0..MAP_CHUNK_SIZE).step_by(step) {
            for x in (0..MAP_CHUNK_SIZE).step_by(step) {
                let h = self.field.sample(x as f32 + anchor.x, z as f32 + anchor.z);
                min = min.min(h);
                max = max.max(h);

                mesh.vertices.push(Vec3::new(x as f32, h, z as f32));

                if x < MAP_CHUNK_SIZE - 1 && z < MAP_CHUNK_SIZE - 1 {
                    mesh.push_triangle(index, index + vps as u32, index + 1);
                    mesh.push_triangle(index + vps as u32, index + vps as u32 + 1, index + 1);
                }

                index += 1;
            }
        }

        // Pass 2: normalize elevations, remap through the response curve,
        // scale to the final amplitude. Local mode needs the whole grid's
        // min/max, which is why this cannot fuse with pass 1.
        let amplitude = self.field.params().amplitude;
        for v in &mut mesh.vertices {
            let normalized = self.field.normalize(v.y, min, max, self.normalize_mode);
            v.y = self.height_curve.sample(normalized) * amplitude;
        }

        // Pass 3: vertex colors keyed by horizontal world distance from the
        // origin. Independent of chunk boundaries, so banding stays
        // continuous across adjacent chunks.
        for v in &mesh.vertices {
            let world = Vec2::new(v.x + anchor.x, v.z + anchor.z);
            let t = world.length() / self.max_color_distance;
            mesh.colors.push(self.color_gradient.sample(t));
        }

        mesh
    }
}
