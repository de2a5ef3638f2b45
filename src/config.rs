//! Construction-time configuration for the terrain system
//!
//! Everything is supplied up front; there is no runtime reconfiguration
//! surface. [`TerrainConfig::validate`] performs every fatal startup check
//! (the streaming manager refuses to construct on failure).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::streaming::lod::{validate_detail_levels, LodLevel};
use crate::terrain::noise::{NoiseParams, NormalizeMode};
use crate::terrain::ramp::{ColorGradient, HeightCurve};

/// Full configuration for noise synthesis, meshing, and streaming
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Noise synthesis parameters
    pub noise: NoiseParams,
    /// Elevation normalization policy
    pub normalize_mode: NormalizeMode,
    /// Response curve applied to normalized heights before amplitude scaling
    pub height_curve: HeightCurve,
    /// Vertex color gradient keyed by normalized distance from the origin
    pub color_gradient: ColorGradient,
    /// Reference distance at which the color gradient saturates
    pub max_color_distance: f32,
    /// Global scale applied to chunk anchors; viewer positions are divided
    /// by it before any distance test
    pub terrain_scale: f32,
    /// Viewer movement (in scaled units) required to trigger a visibility
    /// rescan
    pub movement_threshold: f32,
    /// Ordered LOD table; the last threshold is the maximum view distance
    pub detail_levels: Vec<LodLevel>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            noise: NoiseParams::default(),
            normalize_mode: NormalizeMode::default(),
            height_curve: HeightCurve::default(),
            color_gradient: ColorGradient::default(),
            max_color_distance: 1000.0,
            terrain_scale: 1.0,
            movement_threshold: 25.0,
            detail_levels: vec![
                LodLevel { lod: 0, distance_threshold: 100.0 },
                LodLevel { lod: 1, distance_threshold: 250.0 },
                LodLevel { lod: 2, distance_threshold: 400.0 },
            ],
        }
    }
}

impl TerrainConfig {
    /// Check every fatal configuration constraint.
    ///
    /// Frequencies are deliberately not checked here; non-positive values
    /// are clamped at noise-field construction instead.
    pub fn validate(&self) -> Result<()> {
        if self.noise.amplitude <= 0.0 {
            return Err(Error::InvalidConfig("amplitude must be positive".into()));
        }
        if self.noise.octaves == 0 {
            return Err(Error::InvalidConfig("octave count must be at least 1".into()));
        }
        if self.noise.persistence <= 0.0 || self.noise.lacunarity <= 0.0 {
            return Err(Error::InvalidConfig(
                "persistence and lacunarity must be positive".into(),
            ));
        }
        if self.noise.global_height_scale <= 0.0 {
            return Err(Error::InvalidConfig("global height scale must be positive".into()));
        }
        if self.terrain_scale <= 0.0 {
            return Err(Error::InvalidConfig("terrain scale must be positive".into()));
        }
        if self.max_color_distance <= 0.0 {
            return Err(Error::InvalidConfig("max color distance must be positive".into()));
        }
        if self.movement_threshold < 0.0 {
            return Err(Error::InvalidConfig("movement threshold must not be negative".into()));
        }
        // Deserialization accepts an empty key list; sampling one panics on
        // a build thread, so catch it here.
        if self.height_curve.is_empty() {
            return Err(Error::InvalidConfig("height curve must have at least one key".into()));
        }
        if self.color_gradient.is_empty() {
            return Err(Error::InvalidConfig("color gradient must have at least one key".into()));
        }

        validate_detail_levels(&self.detail_levels)
    }

    /// Parse and validate a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
