//! Chunk paging, LOD selection, and the background mesh-build pipeline

pub mod chunk;
pub mod lod;
pub mod manager;
pub mod pipeline;

pub use chunk::{ChunkCoord, LodMeshSlot, TerrainChunk};
pub use lod::{select_lod_index, validate_detail_levels, LodLevel};
pub use manager::{ChunkStreamingManager, DisplayUpdate, ViewerContext};
pub use pipeline::{MeshPipeline, MeshResult};
