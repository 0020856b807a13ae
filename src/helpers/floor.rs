//! Ground plane that receives shadows under the model.

use crate::math::{Aabb, Color, Vec3};

/// A square floor on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorPlane {
    /// Side length.
    pub size: f32,
    /// Surface color.
    pub color: Color,
    /// Only shadows are drawn, the surface itself is transparent.
    pub shadow_only: bool,
}

impl Default for FloorPlane {
    fn default() -> Self {
        Self::new(100.0, Color::from_hex(0x808080))
    }
}

impl FloorPlane {
    /// Create a new floor.
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            shadow_only: false,
        }
    }

    /// Local bounds.
    pub fn bounding_box(&self) -> Aabb {
        let h = self.size * 0.5;
        Aabb::new(Vec3::new(-h, 0.0, -h), Vec3::new(h, 0.0, h))
    }
}
