//! Grid helper for visualizing a ground plane.

use crate::math::Vec3;
use crate::objects::LineSegments;

/// Helper to visualize a grid on the XZ plane.
#[derive(Debug, Clone, PartialEq)]
pub struct GridHelper {
    /// Side length.
    size: f32,
    /// Divisions per side.
    divisions: u32,
    /// Line geometry.
    lines: LineSegments,
}

impl GridHelper {
    /// Create a new grid helper.
    ///
    /// # Arguments
    /// * `size` - Total size of the grid (side length)
    /// * `divisions` - Number of divisions per side
    /// * `color1` - Color for the center lines
    /// * `color2` - Color for the other lines
    pub fn new(size: f32, divisions: u32, color1: [f32; 4], color2: [f32; 4]) -> Self {
        let divisions = divisions.max(1);
        let half_size = size / 2.0;
        let step = size / divisions as f32;
        let center = divisions / 2;

        let mut lines = LineSegments::new();
        for i in 0..=divisions {
            let pos = -half_size + (i as f32 * step);
            let color = if i == center { color1 } else { color2 };

            // Parallel to Z
            lines.push_segment(
                Vec3::new(pos, 0.0, -half_size),
                Vec3::new(pos, 0.0, half_size),
                color,
            );
            // Parallel to X
            lines.push_segment(
                Vec3::new(-half_size, 0.0, pos),
                Vec3::new(half_size, 0.0, pos),
                color,
            );
        }

        Self {
            size,
            divisions,
            lines,
        }
    }

    /// Create a simple grid with default colors.
    pub fn simple(size: f32, divisions: u32) -> Self {
        Self::new(
            size,
            divisions,
            [0.27, 0.27, 0.27, 1.0],
            [0.53, 0.53, 0.53, 1.0],
        )
    }

    /// Get the side length.
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Get the number of divisions.
    #[inline]
    pub fn divisions(&self) -> u32 {
        self.divisions
    }

    /// Get the line geometry.
    #[inline]
    pub fn lines(&self) -> &LineSegments {
        &self.lines
    }
}

impl Default for GridHelper {
    fn default() -> Self {
        Self::simple(10.0, 10)
    }
}
