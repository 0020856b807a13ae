//! Axes helper for visualizing coordinate system.

use crate::math::Vec3;
use crate::objects::LineSegments;

/// Helper to visualize the XYZ axes.
#[derive(Debug, Clone, PartialEq)]
pub struct AxesHelper {
    /// Axis length.
    size: f32,
    /// Line geometry.
    lines: LineSegments,
}

impl AxesHelper {
    /// Create a new axes helper with specified size.
    pub fn new(size: f32) -> Self {
        let mut lines = LineSegments::new();
        lines.push_segment(Vec3::ZERO, Vec3::X * size, [1.0, 0.0, 0.0, 1.0]);
        lines.push_segment(Vec3::ZERO, Vec3::Y * size, [0.0, 1.0, 0.0, 1.0]);
        lines.push_segment(Vec3::ZERO, Vec3::Z * size, [0.0, 0.0, 1.0, 1.0]);
        Self { size, lines }
    }

    /// Get the axis length.
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Get the line geometry.
    #[inline]
    pub fn lines(&self) -> &LineSegments {
        &self.lines
    }
}

impl Default for AxesHelper {
    fn default() -> Self {
        Self::new(1.0)
    }
}
