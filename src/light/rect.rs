//! Rect area light.

use super::{Light, LightPlacement, LightType, LightUniform};
use crate::math::{Color, Vec3};

/// Rectangular area light emitting from a flat panel facing its local -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectAreaLight {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Panel width along local X.
    pub width: f32,
    /// Panel height along local Y.
    pub height: f32,
}

impl Default for RectAreaLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0)
    }
}

impl RectAreaLight {
    /// Create a new 10 x 10 rect light.
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            width: 10.0,
            height: 10.0,
        }
    }

    /// Emitting area.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

impl Light for RectAreaLight {
    fn to_uniform(&self, placement: &LightPlacement) -> LightUniform {
        LightUniform {
            position: placement.position.to_array(),
            light_type: LightType::Rect as u32,
            color: self.color.to_array(),
            intensity: self.intensity,
            direction: (placement.rotation * Vec3::NEG_Z).to_array(),
            tangent: (placement.rotation * Vec3::X).to_array(),
            width: self.width,
            height: self.height,
            ..LightUniform::default()
        }
    }
}
