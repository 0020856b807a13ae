//! Directional light (sun-like parallel rays).

use super::{Light, LightPlacement, LightType, LightUniform};
use crate::math::Color;

/// Directional light emitting parallel rays from its position towards its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Shadow depth bias to prevent shadow acne.
    pub shadow_bias: f32,
    /// Shadow normal bias.
    pub shadow_normal_bias: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0)
    }
}

impl DirectionalLight {
    /// Create a new directional light.
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            shadow_bias: 0.005,
            shadow_normal_bias: 0.02,
        }
    }
}

impl Light for DirectionalLight {
    fn to_uniform(&self, placement: &LightPlacement) -> LightUniform {
        LightUniform {
            light_type: LightType::Directional as u32,
            color: self.color.to_array(),
            intensity: self.intensity,
            direction: placement.direction().to_array(),
            range: 0.0,
            ..LightUniform::default()
        }
    }
}
