//! Distance-based level-of-detail selection
//!
//! A chunk's mesh density is picked from an ordered table of
//! `(lod, distance_threshold)` entries. The scan walks the table from finest
//! to coarsest, advancing past every threshold the viewer distance strictly
//! exceeds; the last entry's threshold doubles as the maximum view distance.

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::terrain::mesh::{simplification_step, MAP_CHUNK_SIZE};

/// One entry of the LOD threshold table
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    /// Simplification factor handed to the mesh builder (0 = full detail)
    pub lod: u32,
    /// Viewer distance up to which this level applies
    pub distance_threshold: f32,
}

/// Select the LOD index for a viewer distance.
///
/// Distance exactly equal to a threshold stays on the finer side; the
/// returned index never exceeds `levels.len() - 1`. Callers are expected to
/// have culled chunks beyond the last threshold already.
pub fn select_lod_index(distance: f32, levels: &[LodLevel]) -> usize {
    let mut index = 0;
    for (i, level) in levels.iter().take(levels.len().saturating_sub(1)).enumerate() {
        if distance > level.distance_threshold {
            index = i + 1;
        } else {
            break;
        }
    }
    index
}

/// Validate a LOD threshold table at startup.
///
/// An empty table, non-increasing thresholds, or a simplification stride
/// that does not evenly divide the chunk grid are all fatal configuration
/// errors; none of them can be recovered from at generation time.
pub fn validate_detail_levels(levels: &[LodLevel]) -> Result<()> {
    if levels.is_empty() {
        return Err(Error::InvalidLodConfig("detail level table is empty".into()));
    }

    let mut previous = 0.0f32;
    for (i, level) in levels.iter().enumerate() {
        if !level.distance_threshold.is_finite() || level.distance_threshold <= previous {
            return Err(Error::InvalidLodConfig(format!(
                "distance thresholds must be strictly increasing and positive \
                 (entry {i}: {} after {previous})",
                level.distance_threshold
            )));
        }
        previous = level.distance_threshold;

        let step = simplification_step(level.lod);
        if (MAP_CHUNK_SIZE - 1) % step != 0 {
            return Err(Error::InvalidLodConfig(format!(
                "LOD factor {} has stride {step}, which does not divide the \
                 chunk grid of {} cells",
                level.lod,
                MAP_CHUNK_SIZE - 1
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels() -> Vec<LodLevel> {
        vec![
            LodLevel { lod: 1, distance_threshold: 100.0 },
            LodLevel { lod: 2, distance_threshold: 300.0 },
            LodLevel { lod: 4, distance_threshold: 600.0 },
        ]
    }

    #[test]
    fn test_select_lod_index() {
        let levels = levels();
        assert_eq!(select_lod_index(0.0, &levels), 0);
        assert_eq!(select_lod_index(50.0, &levels), 0);
        assert_eq!(select_lod_index(250.0, &levels), 1);
        assert_eq!(select_lod_index(450.0, &levels), 2);
        assert_eq!(select_lod_index(10_000.0, &levels), 2);
    }

    #[test]
    fn test_threshold_boundary_stays_fine() {
        // Exactly on a threshold uses the finer side (strict >).
        let levels = levels();
        assert_eq!(select_lod_index(100.0, &levels), 0);
        assert_eq!(select_lod_index(100.001, &levels), 1);
        assert_eq!(select_lod_index(300.0, &levels), 1);
    }

    #[test]
    fn test_monotonic_in_distance() {
        let levels = levels();
        let mut previous = 0;
        for d in 0..700 {
            let index = select_lod_index(d as f32, &levels);
            assert!(index >= previous, "LOD regressed at distance {d}");
            assert!(index < levels.len());
            previous = index;
        }
    }

    #[test]
    fn test_single_level_always_zero() {
        let levels = vec![LodLevel { lod: 0, distance_threshold: 400.0 }];
        assert_eq!(select_lod_index(0.0, &levels), 0);
        assert_eq!(select_lod_index(399.0, &levels), 0);
        assert_eq!(select_lod_index(4000.0, &levels), 0);
    }

    #[test]
    fn test_validate_accepts_good_table() {
        assert!(validate_detail_levels(&levels()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(validate_detail_levels(&[]).is_err());
    }

    #[test]
    fn test_validate_rejects_non_increasing() {
        let levels = vec![
            LodLevel { lod: 0, distance_threshold: 300.0 },
            LodLevel { lod: 1, distance_threshold: 300.0 },
        ];
        assert!(validate_detail_levels(&levels).is_err());

        let levels = vec![
            LodLevel { lod: 0, distance_threshold: 300.0 },
            LodLevel { lod: 1, distance_threshold: 100.0 },
        ];
        assert!(validate_detail_levels(&levels).is_err());
    }

    #[test]
    fn test_validate_rejects_stride_mismatch() {
        // LOD factor 7 has stride 14; 120 % 14 != 0.
        let levels = vec![LodLevel { lod: 7, distance_threshold: 100.0 }];
        assert!(validate_detail_levels(&levels).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let levels = vec![LodLevel { lod: 0, distance_threshold: -5.0 }];
        assert!(validate_detail_levels(&levels).is_err());
    }
}
