//! Lighting module for scene illumination.
//!
//! Light values live in the scene graph as [`LightSource`] nodes. The
//! [`LightManager`] is the only code that creates or removes them.

mod ambient;
mod directional;
mod hemisphere;
mod manager;
mod point;
mod rect;
mod spot;

pub use ambient::AmbientLight;
pub use directional::DirectionalLight;
pub use hemisphere::HemisphereLight;
pub use manager::{LightError, LightManager, ManagedLight};
pub use point::PointLight;
pub use rect::RectAreaLight;
pub use spot::SpotLight;

use crate::math::{Color, Quat, Vec3};
use bytemuck::{Pod, Zeroable};

/// Maximum number of lights supported in a single render pass.
pub const MAX_LIGHTS: usize = 16;

/// Light type identifier for GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LightType {
    /// Point light (omni-directional).
    Point = 0,
    /// Directional light (sun-like).
    Directional = 1,
    /// Spot light (cone-shaped).
    Spot = 2,
    /// Rect light (rectangular area light).
    Rect = 3,
}

/// GPU-friendly light data structure (80 bytes).
///
/// For rect lights (type=3) `direction` is the panel normal and `tangent`
/// its width axis.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct LightUniform {
    /// Light position (unused for directional).
    pub position: [f32; 3],
    /// Light type (0=point, 1=directional, 2=spot, 3=rect).
    pub light_type: u32,
    /// Light color.
    pub color: [f32; 3],
    /// Light intensity.
    pub intensity: f32,
    /// Direction (for spot/directional/rect lights).
    pub direction: [f32; 3],
    /// Cutoff distance (0 = infinite).
    pub range: f32,
    /// Width axis for rect lights.
    pub tangent: [f32; 3],
    /// Distance falloff exponent.
    pub decay: f32,
    /// Inner cone angle cosine (spot light).
    pub inner_cone_cos: f32,
    /// Outer cone angle cosine (spot light).
    pub outer_cone_cos: f32,
    /// Rect light width.
    pub width: f32,
    /// Rect light height.
    pub height: f32,
}

impl Default for LightUniform {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            light_type: 0,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            direction: [0.0, -1.0, 0.0],
            range: 0.0,
            tangent: [1.0, 0.0, 0.0],
            decay: 1.0,
            inner_cone_cos: 0.0,
            outer_cone_cos: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Lights uniform buffer containing all scene lights.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct LightsUniform {
    /// Ambient light color and intensity (RGB premultiplied, intensity in alpha).
    pub ambient: [f32; 4],
    /// Hemisphere light sky color (RGB) + enabled flag (W).
    pub hemisphere_sky: [f32; 4],
    /// Hemisphere light ground color (RGB) + intensity (W).
    pub hemisphere_ground: [f32; 4],
    /// Number of active lights.
    pub num_lights: u32,
    /// Padding (using u32 to match WGSL alignment).
    pub _padding: [u32; 3],
    /// Array of lights.
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self {
            ambient: [0.0, 0.0, 0.0, 0.0],
            hemisphere_sky: [0.0, 0.0, 0.0, 0.0],
            hemisphere_ground: [0.0, 0.0, 0.0, 0.0],
            num_lights: 0,
            _padding: [0; 3],
            lights: [LightUniform::default(); MAX_LIGHTS],
        }
    }
}

impl LightsUniform {
    /// Create an empty lights uniform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate an ambient light.
    pub fn add_ambient(&mut self, color: Color, intensity: f32) {
        self.ambient[0] += color.r * intensity;
        self.ambient[1] += color.g * intensity;
        self.ambient[2] += color.b * intensity;
        self.ambient[3] += intensity;
    }

    /// Set hemisphere light.
    pub fn set_hemisphere(&mut self, sky_color: Color, ground_color: Color, intensity: f32, enabled: bool) {
        self.hemisphere_sky = [
            sky_color.r,
            sky_color.g,
            sky_color.b,
            if enabled { 1.0 } else { 0.0 },
        ];
        self.hemisphere_ground = [ground_color.r, ground_color.g, ground_color.b, intensity];
    }

    /// Whether the hemisphere light is enabled.
    #[inline]
    pub fn hemisphere_enabled(&self) -> bool {
        self.hemisphere_sky[3] > 0.0
    }

    /// Add a light and return its index.
    pub fn add_light(&mut self, light: LightUniform) -> Option<usize> {
        if (self.num_lights as usize) < MAX_LIGHTS {
            let index = self.num_lights as usize;
            self.lights[index] = light;
            self.num_lights += 1;
            Some(index)
        } else {
            None
        }
    }

    /// Clear all lights (keeps ambient).
    pub fn clear_lights(&mut self) {
        self.num_lights = 0;
    }

    /// Raw bytes for upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// World-space placement of a light node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPlacement {
    /// Light position.
    pub position: Vec3,
    /// Look-at target.
    pub target: Vec3,
    /// Node orientation.
    pub rotation: Quat,
}

impl LightPlacement {
    /// Normalized direction from position to target, straight down if they coincide.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Y)
    }
}

/// Common trait for lights packed into [`LightUniform`] slots.
pub trait Light {
    /// Get the light as a GPU uniform.
    fn to_uniform(&self, placement: &LightPlacement) -> LightUniform;
}

/// The closed set of light types a scene profile can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Uniform fill light.
    Ambient,
    /// Sky/ground gradient.
    Hemisphere,
    /// Parallel rays.
    Directional,
    /// Omni-directional.
    Point,
    /// Cone.
    Spot,
    /// Rectangular panel.
    RectArea,
}

impl LightKind {
    /// Parse a profile `type` tag such as `PointLight`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "AmbientLight" => Some(LightKind::Ambient),
            "HemisphereLight" => Some(LightKind::Hemisphere),
            "DirectionalLight" => Some(LightKind::Directional),
            "PointLight" => Some(LightKind::Point),
            "SpotLight" => Some(LightKind::Spot),
            "RectAreaLight" => Some(LightKind::RectArea),
            _ => None,
        }
    }

    /// Profile `type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            LightKind::Ambient => "AmbientLight",
            LightKind::Hemisphere => "HemisphereLight",
            LightKind::Directional => "DirectionalLight",
            LightKind::Point => "PointLight",
            LightKind::Spot => "SpotLight",
            LightKind::RectArea => "RectAreaLight",
        }
    }

    /// Whether the light is aimed at a separate target node.
    #[inline]
    pub fn has_target(&self) -> bool {
        matches!(self, LightKind::Directional | LightKind::Spot)
    }
}

/// A light value stored on a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightSource {
    /// Ambient light.
    Ambient(AmbientLight),
    /// Hemisphere light.
    Hemisphere(HemisphereLight),
    /// Directional light.
    Directional(DirectionalLight),
    /// Point light.
    Point(PointLight),
    /// Spot light.
    Spot(SpotLight),
    /// Rect area light.
    RectArea(RectAreaLight),
}

impl LightSource {
    /// The light's kind.
    pub fn kind(&self) -> LightKind {
        match self {
            LightSource::Ambient(_) => LightKind::Ambient,
            LightSource::Hemisphere(_) => LightKind::Hemisphere,
            LightSource::Directional(_) => LightKind::Directional,
            LightSource::Point(_) => LightKind::Point,
            LightSource::Spot(_) => LightKind::Spot,
            LightSource::RectArea(_) => LightKind::RectArea,
        }
    }

    /// Light intensity.
    pub fn intensity(&self) -> f32 {
        match self {
            LightSource::Ambient(l) => l.intensity,
            LightSource::Hemisphere(l) => l.intensity,
            LightSource::Directional(l) => l.intensity,
            LightSource::Point(l) => l.intensity,
            LightSource::Spot(l) => l.intensity,
            LightSource::RectArea(l) => l.intensity,
        }
    }

    /// Primary color (sky color for hemisphere lights).
    pub fn color(&self) -> Color {
        match self {
            LightSource::Ambient(l) => l.color,
            LightSource::Hemisphere(l) => l.sky_color,
            LightSource::Directional(l) => l.color,
            LightSource::Point(l) => l.color,
            LightSource::Spot(l) => l.color,
            LightSource::RectArea(l) => l.color,
        }
    }

    /// GPU slot data for punctual and area lights.
    pub fn to_uniform(&self, placement: &LightPlacement) -> Option<LightUniform> {
        match self {
            LightSource::Ambient(_) | LightSource::Hemisphere(_) => None,
            LightSource::Directional(l) => Some(l.to_uniform(placement)),
            LightSource::Point(l) => Some(l.to_uniform(placement)),
            LightSource::Spot(l) => Some(l.to_uniform(placement)),
            LightSource::RectArea(l) => Some(l.to_uniform(placement)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_uniform_size() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
    }

    #[test]
    fn test_light_kind_parse() {
        for tag in [
            "AmbientLight",
            "HemisphereLight",
            "DirectionalLight",
            "PointLight",
            "SpotLight",
            "RectAreaLight",
        ] {
            assert_eq!(LightKind::parse(tag).unwrap().as_str(), tag);
        }
        assert_eq!(LightKind::parse("LaserLight"), None);
    }

    #[test]
    fn test_spot_uniform_cones() {
        let mut spot = SpotLight::new(Color::WHITE, 2.0);
        spot.penumbra = 0.5;
        let placement = LightPlacement {
            position: Vec3::new(0.0, 10.0, 0.0),
            target: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        };
        let u = LightSource::Spot(spot).to_uniform(&placement).unwrap();
        assert_eq!(u.light_type, LightType::Spot as u32);
        assert!((u.outer_cone_cos - 0.5).abs() < 1e-6);
        assert!(u.inner_cone_cos > u.outer_cone_cos);
        assert_eq!(u.direction, [0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_uniform_capacity() {
        let mut lights = LightsUniform::new();
        for _ in 0..MAX_LIGHTS {
            assert!(lights.add_light(LightUniform::default()).is_some());
        }
        assert!(lights.add_light(LightUniform::default()).is_none());
        lights.clear_lights();
        assert_eq!(lights.num_lights, 0);
    }

    #[test]
    fn test_ambient_lights_accumulate() {
        let mut lights = LightsUniform::new();
        lights.add_ambient(Color::WHITE, 0.25);
        lights.add_ambient(Color::new(1.0, 0.0, 0.0), 0.5);
        assert_eq!(lights.ambient, [0.75, 0.25, 0.25, 0.75]);
    }
}
