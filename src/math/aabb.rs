//! Axis-aligned bounding box over `glam` vectors.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (AABB).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// Empty box (inverted, ready to expand).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new box.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box from an array of points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut result = Self::EMPTY;
        for p in points {
            result.expand_by_point(*p);
        }
        result
    }

    /// Check if the box is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Get the size of the box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Expand to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, point: Vec3) -> &mut Self {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
        self
    }

    /// Union with another box.
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Get the eight corners.
    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Transform by a matrix, returning the box enclosing the transformed corners.
    pub fn transform(&self, m: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let mut result = Self::EMPTY;
        for corner in self.corners() {
            result.expand_by_point(m.transform_point3(corner));
        }
        result
    }

    /// Check if approximately equal.
    pub fn approx_eq(&self, other: &Aabb, epsilon: f32) -> bool {
        self.min.abs_diff_eq(other.min, epsilon) && self.max.abs_diff_eq(other.max, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_size() {
        let b = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.center(), Vec3::ZERO);
        assert_eq!(b.size(), Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_empty_box() {
        let b = Aabb::EMPTY;
        assert!(b.is_empty());
        assert_eq!(b.center(), Vec3::ZERO);
        assert!(b.transform(&Mat4::IDENTITY).is_empty());
    }

    #[test]
    fn test_transform_translation() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let moved = b.transform(&Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));
        assert!(moved.approx_eq(
            &Aabb::new(Vec3::new(-1.0, 4.0, -1.0), Vec3::new(1.0, 6.0, 1.0)),
            1e-5
        ));
    }

    #[test]
    fn test_union() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::splat(-1.0));
        assert_eq!(u.max, Vec3::ONE);
    }
}
