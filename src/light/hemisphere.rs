//! Hemisphere light for sky/ground gradient illumination.

use crate::math::Color;

/// Hemisphere light that illuminates with a gradient between sky and ground colors.
///
/// Surfaces facing up receive the sky color, surfaces facing down receive the ground color,
/// and surfaces at an angle receive a blend of both colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    /// Sky color (for surfaces facing up, Y+).
    pub sky_color: Color,
    /// Ground color (for surfaces facing down, Y-).
    pub ground_color: Color,
    /// Light intensity.
    pub intensity: f32,
}

impl Default for HemisphereLight {
    fn default() -> Self {
        Self::new(Color::WHITE, Color::WHITE, 1.0)
    }
}

impl HemisphereLight {
    /// Create a new hemisphere light.
    pub fn new(sky_color: Color, ground_color: Color, intensity: f32) -> Self {
        Self {
            sky_color,
            ground_color,
            intensity,
        }
    }

    /// Get the effective sky color (color * intensity).
    pub fn effective_sky_color(&self) -> Color {
        self.sky_color.multiply_scalar(self.intensity)
    }

    /// Get the effective ground color (color * intensity).
    pub fn effective_ground_color(&self) -> Color {
        self.ground_color.multiply_scalar(self.intensity)
    }
}
