//! Procedural heightfield generation

pub mod mesh;
pub mod noise;
pub mod ramp;

pub use mesh::{HeightfieldMeshBuilder, MeshData, MAP_CHUNK_SIZE};
pub use noise::{NoiseField, NoiseParams, NormalizeMode};
pub use ramp::{ColorGradient, HeightCurve, Lerp, Ramp};
