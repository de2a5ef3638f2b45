//! Axis-aligned bounding rectangle on the XZ plane

use crate::core::types::Vec2;

/// Axis-aligned bounding rectangle defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb2 {
    /// Create rectangle from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create rectangle from center and half-extents
    pub fn from_center_half_extent(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Get center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Get half-extents
    pub fn half_extent(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Check if point is inside the rectangle
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y
    }

    /// Squared distance from a point to the rectangle (zero inside)
    pub fn distance_squared(&self, p: Vec2) -> f32 {
        let d = (p - self.center()).abs() - self.half_extent();
        d.max(Vec2::ZERO).length_squared()
    }

    /// Distance from a point to the rectangle edge (zero inside)
    pub fn distance(&self, p: Vec2) -> f32 {
        self.distance_squared(p).sqrt()
    }
}
