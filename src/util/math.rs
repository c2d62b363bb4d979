//! Math type re-exports and SCN-specific math utilities.
//!
//! This module re-exports types from `glam` and provides the bounding box
//! used by mesh chunks.

pub use glam::{Vec2, Vec3, Vec4};

use std::fmt;

/// Initial extent of a [`BBox3f::SENTINEL`] box.
///
/// Geometry lying entirely beyond this range yields a box clamped to it.
pub const BOUNDS_SENTINEL: f32 = 9999.0;

/// 3D bounding box with single precision.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox3f {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3f {
    /// Inverted box with finite ±9999 bounds, as written by mesh chunks.
    ///
    /// Stays inverted when no point is added, so an empty mesh writes
    /// `min = 9999`, `max = -9999`, `center = 0`.
    pub const SENTINEL: Self = Self {
        min: Vec3::splat(BOUNDS_SENTINEL),
        max: Vec3::splat(-BOUNDS_SENTINEL),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Build a sentinel-seeded box over a set of points.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut bounds = Self::SENTINEL;
        for p in points {
            bounds.expand_by_point(p);
        }
        bounds
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl Default for BBox3f {
    fn default() -> Self {
        Self::SENTINEL
    }
}

impl fmt::Debug for BBox3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3f({:?} - {:?})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox3f() {
        let mut b = BBox3f::SENTINEL;
        assert!(b.is_empty());

        b.expand_by_point(Vec3::ZERO);
        assert!(!b.is_empty());
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ZERO);

        b.expand_by_point(Vec3::ONE);
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ONE);
        assert_eq!(b.center(), Vec3::splat(0.5));
    }

    #[test]
    fn test_empty_sentinel_center_is_origin() {
        let b = BBox3f::from_points(std::iter::empty());
        assert_eq!(b.min, Vec3::splat(9999.0));
        assert_eq!(b.max, Vec3::splat(-9999.0));
        assert_eq!(b.center(), Vec3::ZERO);
    }

    #[test]
    fn test_sentinel_clamps_far_geometry() {
        // All points beyond +9999: min never drops below the sentinel.
        let b = BBox3f::from_points([Vec3::splat(20000.0), Vec3::splat(30000.0)]);
        assert_eq!(b.min, Vec3::splat(9999.0));
        assert_eq!(b.max, Vec3::splat(30000.0));
    }
}
