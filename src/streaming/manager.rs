//! Viewer-centered chunk streaming
//!
//! [`ChunkStreamingManager`] owns the chunk registry and the build pipeline.
//! Each tick it drains finished meshes into their chunks, and, once the
//! viewer has moved past a hysteresis threshold, rescans the square of
//! coordinates inside the view distance, lazily creating chunks and driving
//! every touched chunk's visibility and LOD selection.
//!
//! All state except the pipeline's completion buffer is owned and mutated by
//! the thread calling `tick`; drained results are applied synchronously in
//! completion order.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::config::TerrainConfig;
use crate::core::types::Result;
use crate::streaming::chunk::{ChunkCoord, TerrainChunk};
use crate::streaming::pipeline::MeshPipeline;
use crate::terrain::mesh::{HeightfieldMeshBuilder, MeshData, MAP_CHUNK_SIZE};

/// Per-tick viewer state, passed in explicitly (no global viewer position)
#[derive(Clone, Copy, Debug)]
pub struct ViewerContext {
    /// Viewer position in world space
    pub position: Vec3,
}

impl ViewerContext {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }
}

/// A chunk whose displayed mesh changed this tick.
///
/// The render side reacts by fetching the mesh via
/// [`ChunkStreamingManager::displayed_mesh`] and re-uploading its buffers
/// (normals are the uploader's concern).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayUpdate {
    pub coord: ChunkCoord,
    pub lod_index: usize,
}

/// Maintains the viewer-centered set of active chunks
pub struct ChunkStreamingManager {
    config: TerrainConfig,
    pipeline: MeshPipeline,
    chunks: HashMap<ChunkCoord, TerrainChunk>,
    /// Chunks marked visible by the most recent evaluation pass
    visible: Vec<ChunkCoord>,
    /// Viewer position at the last full rescan
    last_eval_pos: Option<Vec2>,
    max_view_distance: f32,
    chunks_in_view: i32,
    /// World-unit footprint of one chunk
    extent: f32,
}

impl ChunkStreamingManager {
    /// Create a manager from a validated configuration.
    ///
    /// Fails fast on malformed configuration (empty or non-increasing LOD
    /// table, stride mismatch, non-positive scales); none of those are
    /// recoverable at runtime.
    pub fn new(config: TerrainConfig) -> Result<Self> {
        config.validate()?;

        let extent = (MAP_CHUNK_SIZE - 1) as f32;
        let max_view_distance = config
            .detail_levels
            .last()
            .map(|level| level.distance_threshold)
            .unwrap_or_default();
        let chunks_in_view = (max_view_distance / extent).round() as i32;

        log::info!(
            "chunk streaming: view distance {max_view_distance}, {} LOD levels, \
             scan radius {chunks_in_view} chunks",
            config.detail_levels.len()
        );

        let builder = HeightfieldMeshBuilder::new(&config);

        Ok(Self {
            config,
            pipeline: MeshPipeline::new(builder),
            chunks: HashMap::new(),
            visible: Vec::new(),
            last_eval_pos: None,
            max_view_distance,
            chunks_in_view,
            extent,
        })
    }

    /// Advance the streaming state by one tick.
    ///
    /// Drains every completed background build, then rescans the visible
    /// set if the viewer moved more than the movement threshold since the
    /// last scan (the first tick always scans). Returns the display swaps
    /// the render side needs to apply.
    pub fn tick(&mut self, viewer: &ViewerContext) -> Vec<DisplayUpdate> {
        let viewer_pos =
            Vec2::new(viewer.position.x, viewer.position.z) / self.config.terrain_scale;

        let mut updates = Vec::new();

        // Deliver finished meshes first so a mesh that arrived for the
        // currently desired LOD swaps in on this very tick.
        for result in self.pipeline.drain_ready() {
            let Some(chunk) = self.chunks.get_mut(&result.coord) else {
                // Chunks are never removed from the registry, so every
                // delivery has a home.
                log::warn!("dropping mesh for unknown chunk {:?}", result.coord);
                continue;
            };

            chunk.receive_mesh(result.lod_index, result.mesh);

            let was_visible = chunk.visible;
            let update = chunk.update(
                viewer_pos,
                self.max_view_distance,
                &self.config.detail_levels,
                &mut self.pipeline,
            );

            if update.visible && !was_visible {
                self.visible.push(result.coord);
            }
            if update.display_changed {
                if let Some(lod_index) = chunk.displayed_lod {
                    updates.push(DisplayUpdate { coord: result.coord, lod_index });
                }
            }
        }

        let threshold_sq = self.config.movement_threshold * self.config.movement_threshold;
        let needs_scan = match self.last_eval_pos {
            None => true,
            Some(previous) => previous.distance_squared(viewer_pos) > threshold_sq,
        };

        if needs_scan {
            self.last_eval_pos = Some(viewer_pos);
            self.update_visible_chunks(viewer_pos, &mut updates);
        }

        updates
    }

    /// Full visibility pass: hide last pass's chunks, then recompute the
    /// square of coordinates within the view distance.
    fn update_visible_chunks(&mut self, viewer_pos: Vec2, updates: &mut Vec<DisplayUpdate>) {
        // Visibility is cleared and recomputed every cycle, never left
        // stale: chunks the scan no longer touches stay hidden.
        for coord in std::mem::take(&mut self.visible) {
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.visible = false;
            }
        }

        let current_x = (viewer_pos.x / self.extent).round() as i32;
        let current_z = (viewer_pos.y / self.extent).round() as i32;

        for z_offset in -self.chunks_in_view..=self.chunks_in_view {
            for x_offset in -self.chunks_in_view..=self.chunks_in_view {
                let coord = ChunkCoord::new(current_x + x_offset, current_z + z_offset);

                let chunk = self.chunks.entry(coord).or_insert_with(|| {
                    log::debug!("creating terrain chunk {coord:?}");
                    TerrainChunk::new(
                        coord,
                        self.extent,
                        self.config.terrain_scale,
                        self.config.detail_levels.len(),
                    )
                });

                let update = chunk.update(
                    viewer_pos,
                    self.max_view_distance,
                    &self.config.detail_levels,
                    &mut self.pipeline,
                );

                if update.visible {
                    self.visible.push(coord);
                }
                if update.display_changed {
                    if let Some(lod_index) = chunk.displayed_lod {
                        updates.push(DisplayUpdate { coord, lod_index });
                    }
                }
            }
        }
    }

    /// Look up a chunk by coordinate
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    /// The mesh a chunk currently displays, if it has one
    pub fn displayed_mesh(&self, coord: ChunkCoord) -> Option<&MeshData> {
        self.chunks.get(&coord).and_then(TerrainChunk::displayed_mesh)
    }

    /// Chunks marked visible by the latest evaluation
    pub fn visible_chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.visible.iter().filter_map(|coord| self.chunks.get(coord))
    }

    /// Total chunks ever created (the registry grows monotonically)
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Builds currently in flight
    pub fn pending_builds(&self) -> usize {
        self.pipeline.pending_count()
    }

    /// Active configuration
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }
}
