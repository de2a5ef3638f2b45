//! Seeded multi-octave noise evaluation
//!
//! [`NoiseField`] layers Perlin octaves into a scalar heightfield. Each
//! octave samples at a seeded coordinate offset so the layers stay
//! decorrelated while remaining fully reproducible for a given seed.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Frequencies at or below zero are clamped to this instead of erroring.
const MIN_FREQUENCY: f32 = 1e-4;

/// Octave offsets are drawn from this range, matching the coordinate span
/// over which the permutation-based noise stays well distributed.
const OFFSET_RANGE: f32 = 10_000.0;

/// Parameters controlling noise synthesis
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub seed: u32,
    /// Base x frequency. Value 1 is no change.
    pub frequency_x: f32,
    /// Base z frequency. Value 1 is no change.
    pub frequency_z: f32,
    /// Vertical scale of the generated terrain.
    pub amplitude: f32,
    /// Number of detail layers summed together (>= 1).
    pub octaves: u32,
    /// Amplitude falloff per octave.
    pub persistence: f32,
    /// Frequency gain per octave.
    pub lacunarity: f32,
    /// Divisor applied to the max-possible-height sum in Global
    /// normalization. Tunable; larger values push normalized heights up.
    pub global_height_scale: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency_x: 0.3,
            frequency_z: 0.3,
            amplitude: 1.0,
            octaves: 1,
            persistence: 1.0,
            lacunarity: 1.0,
            global_height_scale: 13.0,
        }
    }
}

/// Height normalization policy
///
/// `Local` remaps each sampled grid against its own min/max, which maximizes
/// contrast but gives no seam guarantee between independently built chunks.
/// `Global` remaps against the analytic maximum possible height so adjacent
/// chunks agree along shared borders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    #[default]
    Local,
    Global,
}

/// Simple deterministic RNG for octave offsets
struct OffsetRng {
    state: u64,
}

impl OffsetRng {
    fn new(seed: u64) -> Self {
        Self { state: seed.wrapping_add(1) }
    }

    fn next_u32(&mut self) -> u32 {
        // PCG-like state update
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let mut h = (self.state >> 32) as u32;
        h = h.wrapping_mul(0x45d9f3b);
        h ^= h >> 16;
        h = h.wrapping_mul(0x45d9f3b);
        h ^= h >> 16;
        h
    }

    fn next_float(&mut self) -> f32 {
        (self.next_u32() as f32) / (u32::MAX as f32)
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_float() * (max - min)
    }
}

/// Multi-octave coherent-noise evaluator
pub struct NoiseField {
    params: NoiseParams,
    perlin: Perlin,
    octave_offsets: Vec<Vec2>,
}

impl NoiseField {
    /// Create a new noise field. Non-positive frequencies are clamped to a
    /// small epsilon rather than rejected.
    pub fn new(mut params: NoiseParams) -> Self {
        if params.frequency_x <= 0.0 {
            params.frequency_x = MIN_FREQUENCY;
        }
        if params.frequency_z <= 0.0 {
            params.frequency_z = MIN_FREQUENCY;
        }

        let perlin = Perlin::new(params.seed);

        // Octave 0 stays unshifted; later octaves are decorrelated through
        // seeded coordinate offsets so the same seed reproduces the field.
        let mut rng = OffsetRng::new(params.seed as u64);
        let mut octave_offsets = Vec::with_capacity(params.octaves.max(1) as usize);
        octave_offsets.push(Vec2::ZERO);
        for _ in 1..params.octaves {
            let x = rng.range(-OFFSET_RANGE, OFFSET_RANGE);
            let z = rng.range(-OFFSET_RANGE, OFFSET_RANGE);
            octave_offsets.push(Vec2::new(x, z));
        }

        Self { params, perlin, octave_offsets }
    }

    /// Get noise parameters (with frequencies already clamped)
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Seeded per-octave coordinate offsets; index 0 is always zero.
    pub fn octave_offsets(&self) -> &[Vec2] {
        &self.octave_offsets
    }

    /// Sample the accumulated height at world position (x, z).
    ///
    /// Octave `i` contributes `perlin((x + off_i) * fx * lac^i,
    /// (z + off_i) * fz * lac^i) * amplitude * persistence^i`, with the
    /// Perlin primitive yielding values in [-1, 1].
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let mut height = 0.0f32;

        for (i, offset) in self.octave_offsets.iter().enumerate() {
            let gain = self.params.lacunarity.powi(i as i32);
            let nx = ((x + offset.x) * self.params.frequency_x * gain) as f64;
            let nz = ((z + offset.y) * self.params.frequency_z * gain) as f64;

            let noise = self.perlin.get([nx, nz]) as f32;
            height += noise * self.params.amplitude * self.params.persistence.powi(i as i32);
        }

        height
    }

    /// Analytic maximum possible accumulated height:
    /// `amplitude * sum(persistence^i)` over all octaves.
    pub fn max_possible_height(&self) -> f32 {
        let mut max = 0.0f32;
        for i in 0..self.params.octaves {
            max += self.params.amplitude * self.params.persistence.powi(i as i32);
        }
        max
    }

    /// Remap an accumulated height into [0, 1] under the given policy.
    ///
    /// Local mode inverse-lerps against the grid's observed min/max and is
    /// therefore only meaningful after the whole grid has been sampled.
    /// Global mode divides by the analytic maximum scaled by
    /// `global_height_scale`; the result can exceed [0, 1] and is expected
    /// to be clamped by the response curve downstream.
    pub fn normalize(&self, height: f32, local_min: f32, local_max: f32, mode: NormalizeMode) -> f32 {
        match mode {
            NormalizeMode::Local => inverse_lerp(local_min, local_max, height),
            NormalizeMode::Global => {
                let max_possible = self.max_possible_height();
                (height + self.params.amplitude)
                    / (2.0 * max_possible / self.params.global_height_scale)
            }
        }
    }

    /// Sample a `width` x `depth` grid of normalized heights starting at
    /// `origin`, row-major with x varying fastest.
    pub fn sample_grid(&self, origin: Vec2, width: usize, depth: usize, mode: NormalizeMode) -> Vec<f32> {
        let mut heights = Vec::with_capacity(width * depth);
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;

        for z in 0..depth {
            for x in 0..width {
                let h = self.sample(origin.x + x as f32, origin.y + z as f32);
                min = min.min(h);
                max = max.max(h);
                heights.push(h);
            }
        }

        for h in &mut heights {
            *h = self.normalize(*h, min, max, mode);
        }

        heights
    }
}

/// Inverse linear interpolation clamped to [0, 1]; returns 0 when the range
/// is degenerate.
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_with(octaves: u32, seed: u32) -> NoiseField {
        NoiseField::new(NoiseParams {
            seed,
            octaves,
            persistence: 0.5,
            lacunarity: 2.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = field_with(4, 42);
        let b = field_with(4, 42);

        for z in 0..16 {
            for x in 0..16 {
                let (x, z) = (x as f32 * 3.7, z as f32 * 3.7);
                assert_eq!(a.sample(x, z), b.sample(x, z));
            }
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = field_with(4, 1);
        let b = field_with(4, 2);

        let mut any_diff = false;
        for i in 0..32 {
            let p = i as f32 * 5.3;
            if a.sample(p, p * 0.7) != b.sample(p, p * 0.7) {
                any_diff = true;
                break;
            }
        }
        assert!(any_diff);
    }

    #[test]
    fn test_octave_offsets_seeded() {
        let a = field_with(5, 7);
        let b = field_with(5, 7);
        let c = field_with(5, 8);

        assert_eq!(a.octave_offsets(), b.octave_offsets());
        assert_ne!(a.octave_offsets()[1..], c.octave_offsets()[1..]);
    }

    #[test]
    fn test_first_octave_unshifted() {
        let field = field_with(4, 999);
        assert_eq!(field.octave_offsets()[0], Vec2::ZERO);
        for offset in &field.octave_offsets()[1..] {
            assert!(offset.x.abs() <= 10_000.0);
            assert!(offset.y.abs() <= 10_000.0);
        }
    }

    #[test]
    fn test_frequency_clamped() {
        let field = NoiseField::new(NoiseParams {
            frequency_x: 0.0,
            frequency_z: -3.0,
            ..Default::default()
        });

        assert!(field.params().frequency_x > 0.0);
        assert!(field.params().frequency_z > 0.0);
        assert!(field.sample(12.5, -8.0).is_finite());
    }

    #[test]
    fn test_sample_within_amplitude_bounds() {
        let field = field_with(4, 3);
        let max = field.max_possible_height();

        for i in 0..256 {
            let h = field.sample(i as f32 * 1.31, i as f32 * -0.77);
            assert!(h.abs() <= max + 1e-4);
        }
    }

    #[test]
    fn test_max_possible_height_sum() {
        let field = field_with(3, 0);
        // amplitude 1, persistence 0.5: 1 + 0.5 + 0.25
        assert!((field.max_possible_height() - 1.75).abs() < 1e-6);

        let single = field_with(1, 0);
        assert!((single.max_possible_height() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_local_grid_hits_both_bounds() {
        let field = field_with(4, 42);
        let grid = field.sample_grid(Vec2::ZERO, 32, 32, NormalizeMode::Local);

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &h in &grid {
            assert!((0.0..=1.0).contains(&h));
            min = min.min(h);
            max = max.max(h);
        }
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_global_mode_is_position_pure() {
        // Two grids sharing a border column agree there under Global mode.
        let field = field_with(4, 11);
        let left = field.sample_grid(Vec2::new(0.0, 0.0), 17, 17, NormalizeMode::Global);
        let right = field.sample_grid(Vec2::new(16.0, 0.0), 17, 17, NormalizeMode::Global);

        for z in 0..17 {
            let a = left[z * 17 + 16];
            let b = right[z * 17];
            assert!((a - b).abs() < 1e-6, "seam mismatch at row {z}: {a} vs {b}");
        }
    }

    #[test]
    fn test_inverse_lerp() {
        assert_eq!(inverse_lerp(0.0, 10.0, 5.0), 0.5);
        assert_eq!(inverse_lerp(0.0, 10.0, -5.0), 0.0);
        assert_eq!(inverse_lerp(0.0, 10.0, 15.0), 1.0);
        assert_eq!(inverse_lerp(3.0, 3.0, 3.0), 0.0);
    }
}
