//! Generic keyframe interpolation for artist-supplied remaps.
//!
//! [`Ramp`] provides clamped linear interpolation over sorted `(t, value)`
//! keys. Used for the elevation response curve (remapping normalized heights
//! before amplitude scaling) and for the distance-keyed vertex color
//! gradient.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lerp trait
// ---------------------------------------------------------------------------

/// Trait for types that can be linearly interpolated.
pub trait Lerp: Clone {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for [f32; 4] {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        [
            self[0] + (other[0] - self[0]) * t,
            self[1] + (other[1] - self[1]) * t,
            self[2] + (other[2] - self[2]) * t,
            self[3] + (other[3] - self[3]) * t,
        ]
    }
}

// ---------------------------------------------------------------------------
// Ramp
// ---------------------------------------------------------------------------

/// Keyframe-based remap with clamped ends.
///
/// Keys are `(t, value)` pairs sorted by `t`. Sampling below the first key
/// or above the last returns that end's value, so a ramp keyed over [0, 1]
/// also tolerates out-of-range input (Global-mode normalized heights can
/// exceed 1).
#[derive(Clone, Debug)]
pub struct Ramp<T: Lerp> {
    keys: Vec<(f32, T)>,
}

/// Elevation response curve, [0, 1] -> [0, 1]
pub type HeightCurve = Ramp<f32>;

/// Color gradient keyed by normalized distance, [0, 1] -> RGBA
pub type ColorGradient = Ramp<[f32; 4]>;

impl<T: Lerp> Ramp<T> {
    /// Create a new ramp from unsorted keys. Keys are sorted by t.
    pub fn new(mut keys: Vec<(f32, T)>) -> Self {
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { keys }
    }

    /// Create a constant ramp that always returns the same value.
    pub fn constant(value: T) -> Self {
        Self {
            keys: vec![(0.0, value)],
        }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// A keyless ramp cannot be sampled; construction from deserialized
    /// data must check this before use.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sample the ramp at `t`, clamping outside the key range.
    pub fn sample(&self, t: f32) -> T {
        assert!(!self.keys.is_empty(), "Ramp must have at least one key");

        let n = self.keys.len();
        if n == 1 || t <= self.keys[0].0 {
            return self.keys[0].1.clone();
        }
        if t >= self.keys[n - 1].0 {
            return self.keys[n - 1].1.clone();
        }

        // Find the two keys that bracket t; keys are sorted ascending and
        // the end cases above guarantee a bracket exists.
        let idx = self.keys.iter().position(|k| k.0 > t).unwrap_or(n - 1);
        let (t_a, ref v_a) = self.keys[idx - 1];
        let (t_b, ref v_b) = self.keys[idx];

        let span = t_b - t_a;
        if span < 1e-6 {
            return v_a.clone();
        }
        v_a.lerp(v_b, (t - t_a) / span)
    }
}

impl Default for HeightCurve {
    /// Identity curve: heights pass through unchanged.
    fn default() -> Self {
        Self::new(vec![(0.0, 0.0), (1.0, 1.0)])
    }
}

impl Default for ColorGradient {
    /// Lowland green through rock gray to white at the far reference
    /// distance.
    fn default() -> Self {
        Self::new(vec![
            (0.0, [0.13, 0.55, 0.13, 1.0]),
            (0.6, [0.50, 0.50, 0.50, 1.0]),
            (1.0, [1.00, 1.00, 1.00, 1.0]),
        ])
    }
}

// ---------------------------------------------------------------------------
// Serde support
// ---------------------------------------------------------------------------

impl<T: Lerp + Serialize> Serialize for Ramp<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keys.serialize(serializer)
    }
}

impl<'de, T: Lerp + Deserialize<'de>> Deserialize<'de> for Ramp<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<(f32, T)>::deserialize(deserializer)?;
        Ok(Self::new(keys))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
