//! Point light (omni-directional).

use super::{Light, LightPlacement, LightType, LightUniform};
use crate::math::Color;

/// Point light emitting in all directions from a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Cutoff distance; 0 means no cutoff.
    pub distance: f32,
    /// Falloff exponent.
    pub decay: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0)
    }
}

impl PointLight {
    /// Create a new point light with no cutoff and linear decay.
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            distance: 0.0,
            decay: 1.0,
        }
    }
}

impl Light for PointLight {
    fn to_uniform(&self, placement: &LightPlacement) -> LightUniform {
        LightUniform {
            position: placement.position.to_array(),
            light_type: LightType::Point as u32,
            color: self.color.to_array(),
            intensity: self.intensity,
            range: self.distance,
            decay: self.decay,
            ..LightUniform::default()
        }
    }
}
