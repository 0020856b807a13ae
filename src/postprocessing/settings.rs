//! Per-effect settings.

use crate::profile::{BloomProfile, BokehProfile, SsaoProfile};

/// Bloom effect settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Bloom strength.
    pub strength: f32,
    /// Blur radius.
    pub radius: f32,
    /// Brightness threshold for bloom.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 1.0,
            radius: 0.0,
            threshold: 0.0,
        }
    }
}

impl From<&BloomProfile> for BloomSettings {
    fn from(profile: &BloomProfile) -> Self {
        let defaults = Self::default();
        Self {
            strength: profile.strength.unwrap_or(defaults.strength),
            radius: profile.radius.unwrap_or(defaults.radius),
            threshold: profile.threshold.unwrap_or(defaults.threshold),
        }
    }
}

/// SSAO settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsaoSettings {
    /// Sampling radius in world units.
    pub radius: f32,
    /// Intensity/strength of the occlusion.
    pub intensity: f32,
    /// Bias to prevent self-occlusion artifacts.
    pub bias: f32,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            radius: 0.5,
            intensity: 1.0,
            bias: 0.025,
        }
    }
}

impl From<&SsaoProfile> for SsaoSettings {
    fn from(profile: &SsaoProfile) -> Self {
        let defaults = Self::default();
        Self {
            radius: profile.radius.unwrap_or(defaults.radius),
            intensity: profile.intensity.unwrap_or(defaults.intensity),
            bias: profile.bias.unwrap_or(defaults.bias),
        }
    }
}

/// Depth of field settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BokehSettings {
    /// Focus distance.
    pub focus: f32,
    /// Aperture size.
    pub aperture: f32,
    /// Blur clamp.
    pub max_blur: f32,
}

impl Default for BokehSettings {
    fn default() -> Self {
        Self {
            focus: 1.0,
            aperture: 0.025,
            max_blur: 1.0,
        }
    }
}

impl From<&BokehProfile> for BokehSettings {
    fn from(profile: &BokehProfile) -> Self {
        let defaults = Self::default();
        Self {
            focus: profile.focus.unwrap_or(defaults.focus),
            aperture: profile.aperture.unwrap_or(defaults.aperture),
            max_blur: profile.maxblur.unwrap_or(defaults.max_blur),
        }
    }
}

/// Effect parameters packed for upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EffectUniform {
    /// Effect-specific parameters.
    pub params: [f32; 4],
    /// 1/width, 1/height, width, height
    pub resolution: [f32; 4],
}
