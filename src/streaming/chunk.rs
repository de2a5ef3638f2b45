//! Per-chunk LOD cache and visibility state

use glam::{Vec2, Vec3};

use crate::math::Aabb2;
use crate::streaming::lod::{select_lod_index, LodLevel};
use crate::streaming::pipeline::MeshPipeline;
use crate::terrain::mesh::MeshData;

/// Chunk coordinate on the terrain grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Cache entry for one LOD of one chunk.
///
/// States: Empty (nothing yet) -> Requested (build in flight) -> Ready
/// (`has_mesh`). Entries never transition back; eviction is chunk-granular,
/// and chunks themselves persist for the process lifetime.
#[derive(Clone, Debug, Default)]
pub struct LodMeshSlot {
    pub mesh: Option<MeshData>,
    pub requested: bool,
    pub has_mesh: bool,
}

/// Result of one chunk evaluation pass
#[derive(Clone, Copy, Debug)]
pub struct ChunkUpdate {
    pub visible: bool,
    /// The displayed mesh changed this pass and the render side should
    /// re-upload it.
    pub display_changed: bool,
}

/// A fixed-size square region of terrain with per-LOD mesh caching
pub struct TerrainChunk {
    pub coord: ChunkCoord,
    /// Bounding rectangle in viewer space (unscaled world units)
    bounds: Aabb2,
    /// World-space anchor meshes are built relative to
    anchor: Vec3,
    slots: Vec<LodMeshSlot>,
    /// Index into the detail-level table of the mesh currently shown
    pub displayed_lod: Option<usize>,
    pub visible: bool,
}

impl TerrainChunk {
    /// Create the chunk at `coord`. `extent` is the world-unit footprint of
    /// one chunk (grid cells per side), `terrain_scale` the global scale
    /// applied to mesh anchors.
    pub fn new(coord: ChunkCoord, extent: f32, terrain_scale: f32, lod_count: usize) -> Self {
        let position = Vec2::new(coord.x as f32, coord.z as f32) * extent;

        Self {
            coord,
            bounds: Aabb2::from_center_half_extent(position, Vec2::splat(extent * 0.5)),
            anchor: Vec3::new(position.x, 0.0, position.y) * terrain_scale,
            slots: vec![LodMeshSlot::default(); lod_count],
            displayed_lod: None,
            visible: false,
        }
    }

    /// World-space anchor position
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Inspect one LOD cache slot
    pub fn slot(&self, lod_index: usize) -> &LodMeshSlot {
        &self.slots[lod_index]
    }

    /// The mesh currently selected for display, if any
    pub fn displayed_mesh(&self) -> Option<&MeshData> {
        self.displayed_lod
            .and_then(|index| self.slots[index].mesh.as_ref())
    }

    /// Re-evaluate visibility and LOD selection against the viewer.
    ///
    /// Visible chunks pick the LOD index for their distance; if it differs
    /// from what is displayed, a cached mesh is swapped in immediately,
    /// otherwise a build is dispatched unless one is already in flight for
    /// that slot.
    pub fn update(
        &mut self,
        viewer_pos: Vec2,
        max_view_distance: f32,
        levels: &[LodLevel],
        pipeline: &mut MeshPipeline,
    ) -> ChunkUpdate {
        let distance = self.bounds.distance(viewer_pos);
        let visible = distance <= max_view_distance;
        let mut display_changed = false;

        if visible {
            let lod_index = select_lod_index(distance, levels);

            if self.displayed_lod != Some(lod_index) {
                let slot = &mut self.slots[lod_index];

                if slot.has_mesh {
                    self.displayed_lod = Some(lod_index);
                    display_changed = true;
                } else if !slot.requested
                    && pipeline.request_build(self.coord, lod_index, levels[lod_index].lod, self.anchor)
                {
                    slot.requested = true;
                }
            }
        }

        self.visible = visible;
        ChunkUpdate { visible, display_changed }
    }

    /// Cache a delivered mesh in its LOD slot.
    ///
    /// Deliveries for chunks that have since left the visible set land here
    /// too; the mesh simply waits in the cache until the chunk is relevant
    /// again.
    pub fn receive_mesh(&mut self, lod_index: usize, mesh: MeshData) {
        let slot = &mut self.slots[lod_index];
        slot.mesh = Some(mesh);
        slot.has_mesh = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainConfig;
    use crate::terrain::mesh::HeightfieldMeshBuilder;

    fn levels() -> Vec<LodLevel> {
        vec![
            LodLevel { lod: 0, distance_threshold: 100.0 },
            LodLevel { lod: 2, distance_threshold: 300.0 },
        ]
    }

    fn pipeline() -> MeshPipeline {
        MeshPipeline::new(HeightfieldMeshBuilder::new(&TerrainConfig::default()))
    }

    fn mesh_for(pipeline: &MeshPipeline, chunk: &TerrainChunk, lod: u32) -> MeshData {
        pipeline.builder().build_mesh(chunk.anchor(), lod)
    }

    #[test]
    fn test_new_chunk_is_empty() {
        let chunk = TerrainChunk::new(ChunkCoord::new(1, -2), 120.0, 1.0, 2);

        assert_eq!(chunk.displayed_lod, None);
        assert!(!chunk.visible);
        assert!(chunk.displayed_mesh().is_none());
        for i in 0..2 {
            assert!(!chunk.slot(i).requested);
            assert!(!chunk.slot(i).has_mesh);
        }
    }

    #[test]
    fn test_anchor_scaled_by_terrain_scale() {
        let chunk = TerrainChunk::new(ChunkCoord::new(1, 0), 120.0, 2.0, 1);
        assert_eq!(chunk.anchor(), Vec3::new(240.0, 0.0, 0.0));
    }

    #[test]
    fn test_update_requests_missing_lod() {
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), 120.0, 1.0, 2);
        let mut pipeline = pipeline();
        let levels = levels();

        let update = chunk.update(Vec2::ZERO, 300.0, &levels, &mut pipeline);
        assert!(update.visible);
        assert!(!update.display_changed);
        assert!(chunk.slot(0).requested);
        assert!(pipeline.is_pending(chunk.coord, 0));

        // A second pass while the build is in flight must not re-dispatch.
        chunk.update(Vec2::ZERO, 300.0, &levels, &mut pipeline);
        assert_eq!(pipeline.pending_count(), 1);
    }

    #[test]
    fn test_update_swaps_cached_mesh() {
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), 120.0, 1.0, 2);
        let mut pipeline = pipeline();
        let levels = levels();

        let mesh = mesh_for(&pipeline, &chunk, 0);
        chunk.receive_mesh(0, mesh);

        let update = chunk.update(Vec2::ZERO, 300.0, &levels, &mut pipeline);
        assert!(update.display_changed);
        assert_eq!(chunk.displayed_lod, Some(0));
        assert!(chunk.displayed_mesh().is_some());
        assert_eq!(pipeline.pending_count(), 0);
    }

    #[test]
    fn test_out_of_range_chunk_hidden() {
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), 120.0, 1.0, 2);
        let mut pipeline = pipeline();

        let update = chunk.update(Vec2::new(5000.0, 0.0), 300.0, &levels(), &mut pipeline);
        assert!(!update.visible);
        assert!(!chunk.visible);
        // Invisible chunks never dispatch builds.
        assert_eq!(pipeline.pending_count(), 0);
    }

    #[test]
    fn test_coarser_lod_at_distance() {
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), 120.0, 1.0, 2);
        let mut pipeline = pipeline();
        let levels = levels();

        let coarse = mesh_for(&pipeline, &chunk, 2);
        chunk.receive_mesh(1, coarse);

        // Bounds edge is 60 from center; viewer at x=310 is 250 out -> slot 1.
        let update = chunk.update(Vec2::new(310.0, 0.0), 300.0, &levels, &mut pipeline);
        assert!(update.visible);
        assert!(update.display_changed);
        assert_eq!(chunk.displayed_lod, Some(1));
    }

    #[test]
    fn test_stale_mesh_cached_while_hidden() {
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), 120.0, 1.0, 2);
        let mut pipeline = pipeline();

        // Deliver a mesh while the chunk is far outside the view range.
        let mesh = mesh_for(&pipeline, &chunk, 0);
        chunk.receive_mesh(0, mesh);
        let update = chunk.update(Vec2::new(5000.0, 0.0), 300.0, &levels(), &mut pipeline);

        assert!(!update.visible);
        assert!(!update.display_changed);
        assert!(chunk.slot(0).has_mesh);
        assert_eq!(chunk.displayed_lod, None);
    }
}
