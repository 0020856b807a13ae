//! Spot light (cone-shaped).

use super::{Light, LightPlacement, LightType, LightUniform};
use crate::math::{consts::PI, Color};

/// Spot light emitting in a cone from its position towards its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Cutoff distance; 0 means no cutoff.
    pub distance: f32,
    /// Falloff exponent.
    pub decay: f32,
    /// Cone half-angle in radians.
    pub angle: f32,
    /// Fraction of the cone that fades out, 0..=1.
    pub penumbra: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0)
    }
}

impl SpotLight {
    /// Create a new spot light with a 60 degree cone and hard edge.
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            distance: 0.0,
            decay: 1.0,
            angle: PI / 3.0,
            penumbra: 0.0,
        }
    }

    /// Cosine of the cone edge.
    #[inline]
    pub fn outer_cone_cos(&self) -> f32 {
        self.angle.cos()
    }

    /// Cosine of the angle where falloff starts.
    #[inline]
    pub fn inner_cone_cos(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra.clamp(0.0, 1.0))).cos()
    }
}

impl Light for SpotLight {
    fn to_uniform(&self, placement: &LightPlacement) -> LightUniform {
        LightUniform {
            position: placement.position.to_array(),
            light_type: LightType::Spot as u32,
            color: self.color.to_array(),
            intensity: self.intensity,
            direction: placement.direction().to_array(),
            range: self.distance,
            decay: self.decay,
            inner_cone_cos: self.inner_cone_cos(),
            outer_cone_cos: self.outer_cone_cos(),
            ..LightUniform::default()
        }
    }
}
