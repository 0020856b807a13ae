//! Typed views of performance and scene profile documents.
//!
//! Deserialization is forgiving: a field that does not match its expected
//! type keeps its default and a warning is logged, so a partially broken
//! profile still configures the scene. Schema validation reports the details.

use crate::math::{Color, Vec3};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Deserialize a block field by field. Fields of the wrong type keep their default.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(from_value_lenient(value))
}

/// Parse a `#[serde(default)]` block, dropping each field that fails on its own.
pub(crate) fn from_value_lenient<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    let value = match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .filter(|(key, field)| {
                    let mut single = Map::new();
                    single.insert(key.clone(), field.clone());
                    match T::deserialize(Value::Object(single)) {
                        Ok(_) => true,
                        Err(e) => {
                            log::warn!("Ignoring malformed profile field {}: {}", key, e);
                            false
                        }
                    }
                })
                .collect(),
        ),
        other => other,
    };
    T::deserialize(value).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed profile block: {}", e);
        T::default()
    })
}

/// Deserialize a list of blocks, skipping entries that are not objects.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        if !value.is_null() {
            log::warn!("Expected a list, got {}; using an empty list", value);
        }
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| {
            if item.is_object() {
                Some(from_value_lenient(item))
            } else {
                log::warn!("Skipping malformed list entry {}: {}", i, item);
                None
            }
        })
        .collect())
}

/// A color as written in a profile: a hex string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// Numeric form, e.g. `16777215`.
    Number(f64),
    /// String form: `#rrggbb`, `0xrrggbb` or `rrggbb`.
    Text(String),
}

impl ColorValue {
    /// Parse into a color, if well formed.
    pub fn to_color(&self) -> Option<Color> {
        match self {
            ColorValue::Number(n) if *n >= 0.0 && *n <= 16_777_215.0 && n.fract() == 0.0 => {
                Some(Color::from_hex(*n as u32))
            }
            ColorValue::Number(_) => None,
            ColorValue::Text(s) => Color::parse_hex(s),
        }
    }
}

impl From<u32> for ColorValue {
    fn from(hex: u32) -> Self {
        ColorValue::Number(hex as f64)
    }
}

impl From<&str> for ColorValue {
    fn from(s: &str) -> Self {
        ColorValue::Text(s.to_string())
    }
}

/// Resolve an optional profile color, falling back to white with a warning.
pub fn resolve_color(value: Option<&ColorValue>, what: &str) -> Color {
    match value {
        None => Color::WHITE,
        Some(v) => v.to_color().unwrap_or_else(|| {
            log::warn!("Invalid color {:?} for {}, using white", v, what);
            Color::WHITE
        }),
    }
}

/// A `{x, y, z}` triple as written in profiles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vec3Profile {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl From<Vec3Profile> for Vec3 {
    fn from(v: Vec3Profile) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

// === Performance profile ===

/// Renderer configuration profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceProfile {
    /// Profile id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Renderer settings.
    #[serde(deserialize_with = "lenient")]
    pub renderer: RendererProfile,
}

/// The `renderer` block of a performance profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RendererProfile {
    /// Multisample anti-aliasing.
    pub antialias: bool,
    /// Shader precision name.
    pub precision: Option<Value>,
    /// GPU power preference name.
    pub power_preference: Option<Value>,
    /// Refuse to start on software adapters.
    pub fail_if_major_performance_caveat: bool,
    /// Depth buffer.
    pub depth: bool,
    /// Stencil buffer.
    pub stencil: bool,
    /// Premultiplied alpha output.
    pub premultiplied_alpha: bool,
    /// Keep the drawing buffer between frames.
    pub preserve_drawing_buffer: bool,
    /// XR compatible context.
    pub xr_compatible: bool,
    /// Clear before each frame.
    pub auto_clear: bool,
    /// Shadow map settings.
    #[serde(deserialize_with = "lenient")]
    pub shadow_map: ShadowMapProfile,
    /// Physically based light falloff.
    pub physically_correct_lights: bool,
    /// Logarithmic depth buffer.
    pub logarithmic_depth_buffer: bool,
    /// Device pixel ratio.
    pub pixel_ratio: f32,
    /// Tone mapping name. Kept raw so unknown shapes fall back like unknown names.
    pub tone_mapping: Option<Value>,
    /// Tone mapping exposure.
    pub tone_mapping_exposure: Option<f32>,
    /// Legacy output encoding name.
    pub output_encoding: String,
    /// Output color space name.
    pub output_color_space: Option<Value>,
    /// Transparent canvas.
    pub alpha: bool,
}

impl Default for RendererProfile {
    fn default() -> Self {
        Self {
            antialias: true,
            precision: None,
            power_preference: None,
            fail_if_major_performance_caveat: false,
            depth: true,
            stencil: false,
            premultiplied_alpha: true,
            preserve_drawing_buffer: false,
            xr_compatible: false,
            auto_clear: true,
            shadow_map: ShadowMapProfile::default(),
            physically_correct_lights: false,
            logarithmic_depth_buffer: false,
            pixel_ratio: 1.0,
            tone_mapping: None,
            tone_mapping_exposure: None,
            output_encoding: "sRGBEncoding".to_string(),
            output_color_space: None,
            alpha: false,
        }
    }
}

/// Shadow map resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSize {
    /// Width in texels.
    pub width: f32,
    /// Height in texels.
    pub height: f32,
}

/// The `shadowMap` block of a performance profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowMapProfile {
    /// Shadows on or off.
    pub enabled: bool,
    /// Shadow map algorithm name.
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    /// Resolution.
    pub map_size: Option<MapSize>,
    /// VSM blur samples.
    pub blur_samples: Option<f32>,
    /// Depth bias.
    pub bias: Option<f32>,
    /// Blur radius.
    pub radius: Option<f32>,
}

// === Scene profile ===

/// Scene content profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneProfile {
    /// Profile id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Background color.
    #[serde(deserialize_with = "lenient")]
    pub background: BackgroundProfile,
    /// Cubemap environment.
    #[serde(deserialize_with = "lenient")]
    pub environment: EnvironmentProfile,
    /// Ambient and hemisphere lighting.
    #[serde(deserialize_with = "lenient")]
    pub lighting: LightingProfile,
    /// Additional lights.
    #[serde(deserialize_with = "lenient_list")]
    pub lights: Vec<LightDescriptor>,
    /// Post-processing chain.
    #[serde(deserialize_with = "lenient")]
    pub postprocessing: PostprocessingProfile,
    /// Camera definitions.
    #[serde(deserialize_with = "lenient")]
    pub cameras: CamerasProfile,
    /// Orbit control tuning.
    #[serde(deserialize_with = "lenient")]
    pub controls: Option<ControlsProfile>,
    /// Floor plane.
    #[serde(deserialize_with = "lenient")]
    pub floor: Option<FloorProfile>,
    /// Grid helper.
    #[serde(deserialize_with = "lenient")]
    pub grid: Option<GridProfile>,
}

/// The `background` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundProfile {
    /// Solid background color.
    pub color: Option<ColorValue>,
}

/// The `environment` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentProfile {
    /// Load the cubemap.
    pub enabled: bool,
    /// Directory prefix of the face images.
    pub path: Option<String>,
    /// Six face file names: +X, -X, +Y, -Y, +Z, -Z.
    pub files: Option<Vec<String>>,
    /// Color space of the faces.
    pub color_space: Option<Value>,
}

/// The `lighting` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingProfile {
    /// Master switch for all profile lights.
    pub enabled: bool,
    /// Initial visibility of created lights.
    pub visible: bool,
    /// Ambient light.
    #[serde(deserialize_with = "lenient")]
    pub ambient: Option<AmbientProfile>,
    /// Hemisphere light.
    #[serde(deserialize_with = "lenient")]
    pub hemisphere: Option<HemisphereProfile>,
}

/// Ambient light settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientProfile {
    /// Create the light.
    pub enabled: bool,
    /// Light color.
    pub color: Option<ColorValue>,
    /// Light intensity.
    pub intensity: Option<f32>,
}

/// Hemisphere light settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HemisphereProfile {
    /// Create the light.
    pub enabled: bool,
    /// Sky color.
    pub sky_color: Option<ColorValue>,
    /// Ground color.
    pub ground_color: Option<ColorValue>,
    /// Light intensity.
    pub intensity: Option<f32>,
}

/// Debug helper settings on a light descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightHelperProfile {
    /// Create the helper.
    pub visible: Option<bool>,
    /// Helper size.
    pub size: Option<f32>,
}

/// One entry of the `lights` list.
///
/// The `type` tag is kept as text here; [`crate::light::LightKind::parse`]
/// turns it into a closed set of kinds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightDescriptor {
    /// Light type tag, e.g. `PointLight`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Light name.
    pub name: Option<String>,
    /// Light color.
    pub color: Option<ColorValue>,
    /// Light intensity.
    pub intensity: Option<f32>,
    /// Only `Some(true)` creates the light.
    pub enabled: Option<bool>,
    /// Shadow casting.
    pub cast_shadow: Option<bool>,
    /// Position.
    pub position: Option<Vec3Profile>,
    /// Look-at target (directional and spot).
    pub target: Option<Vec3Profile>,
    /// Cutoff distance (point and spot).
    pub distance: Option<f32>,
    /// Falloff exponent (point and spot).
    pub decay: Option<f32>,
    /// Cone angle in radians (spot).
    pub angle: Option<f32>,
    /// Cone softness (spot).
    pub penumbra: Option<f32>,
    /// Width (rect area).
    pub width: Option<f32>,
    /// Height (rect area).
    pub height: Option<f32>,
    /// Rotation in radians (rect area).
    pub rotation: Option<Vec3Profile>,
    /// Sky color (hemisphere).
    pub sky_color: Option<ColorValue>,
    /// Ground color (hemisphere).
    pub ground_color: Option<ColorValue>,
    /// Debug helper.
    pub helper: Option<LightHelperProfile>,
}

/// The `postprocessing` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessingProfile {
    /// Master switch.
    pub enabled: bool,
    /// Per-effect settings.
    #[serde(deserialize_with = "lenient")]
    pub effects: EffectsProfile,
}

/// An effect with nothing but an on/off switch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectToggle {
    /// Effect on or off.
    pub enabled: bool,
}

/// Bloom settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomProfile {
    /// Effect on or off.
    pub enabled: bool,
    /// Bloom strength.
    pub strength: Option<f32>,
    /// Bloom radius.
    pub radius: Option<f32>,
    /// Luminance threshold.
    pub threshold: Option<f32>,
}

/// Screen-space ambient occlusion settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SsaoProfile {
    /// Effect on or off.
    pub enabled: bool,
    /// Sample kernel radius.
    pub radius: Option<f32>,
    /// Occlusion intensity.
    pub intensity: Option<f32>,
    /// Depth bias.
    pub bias: Option<f32>,
}

/// Depth-of-field settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BokehProfile {
    /// Effect on or off.
    pub enabled: bool,
    /// Focus distance.
    pub focus: Option<f32>,
    /// Aperture.
    pub aperture: Option<f32>,
    /// Maximum blur.
    pub maxblur: Option<f32>,
}

/// The `postprocessing.effects` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsProfile {
    /// Composer switch.
    #[serde(rename = "EffectComposer")]
    pub effect_composer: Option<EffectToggle>,
    /// Base scene render.
    #[serde(rename = "RenderPass")]
    pub render_pass: Option<EffectToggle>,
    /// Bloom.
    #[serde(rename = "UnrealBloomPass")]
    pub bloom: Option<BloomProfile>,
    /// Ambient occlusion.
    #[serde(rename = "SSAOPass")]
    pub ssao: Option<SsaoProfile>,
    /// FXAA anti-aliasing.
    #[serde(rename = "FXAAPass")]
    pub fxaa: Option<EffectToggle>,
    /// SMAA anti-aliasing.
    #[serde(rename = "SMAAPass")]
    pub smaa: Option<EffectToggle>,
    /// Depth of field.
    #[serde(rename = "BokehPass")]
    pub bokeh: Option<BokehProfile>,
}

/// A camera definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraProfile {
    /// Vertical field of view in degrees.
    pub fov: Option<f32>,
    /// Near plane.
    pub near: Option<f32>,
    /// Far plane.
    pub far: Option<f32>,
    /// Position.
    pub position: Option<Vec3Profile>,
    /// Look-at target.
    pub target: Option<Vec3Profile>,
}

/// The `cameras` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CamerasProfile {
    /// Camera applied on configuration.
    pub default: Option<CameraProfile>,
    /// Optional second view.
    pub alternate: Option<CameraProfile>,
}

/// Orbit control tuning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlsProfile {
    /// Smooth movement.
    pub enable_damping: Option<bool>,
    /// Damping factor.
    pub damping_factor: Option<f32>,
    /// Rotation speed.
    pub rotate_speed: Option<f32>,
    /// Pan speed.
    pub pan_speed: Option<f32>,
    /// Zoom speed.
    pub zoom_speed: Option<f32>,
    /// Closest zoom distance.
    pub min_distance: Option<f32>,
    /// Farthest zoom distance.
    pub max_distance: Option<f32>,
    /// Lowest polar angle in radians.
    pub min_polar_angle: Option<f32>,
    /// Highest polar angle in radians.
    pub max_polar_angle: Option<f32>,
    /// Panning allowed.
    pub enable_pan: Option<bool>,
    /// Rotation allowed.
    pub enable_rotate: Option<bool>,
    /// Zooming allowed.
    pub enable_zoom: Option<bool>,
    /// Pan in screen space rather than along the ground plane.
    pub screen_space_panning: Option<bool>,
}

/// Floor plane settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorProfile {
    /// Floor drawn.
    pub visible: bool,
    /// Edge length.
    pub size: Option<f32>,
    /// Floor color.
    pub color: Option<ColorValue>,
}

/// Grid helper settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridProfile {
    /// Grid drawn.
    pub visible: bool,
    /// Edge length.
    pub size: Option<f32>,
    /// Number of divisions.
    pub divisions: Option<u32>,
}

/// The active performance and scene profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePair {
    /// Renderer configuration.
    pub performance: PerformanceProfile,
    /// Scene content.
    pub scene: SceneProfile,
}

/// Ids of a profile pair to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSelection {
    /// Performance profile id.
    pub performance_profile: String,
    /// Scene profile id.
    pub scene_profile: String,
}

impl ProfileSelection {
    /// Create a selection.
    pub fn new(performance: impl Into<String>, scene: impl Into<String>) -> Self {
        Self {
            performance_profile: performance.into(),
            scene_profile: scene.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::schemas::fixtures;
    use serde_json::json;

    #[test]
    fn test_parse_fixture_performance_profile() {
        let p: PerformanceProfile = serde_json::from_value(fixtures::performance("medium")).unwrap();
        assert_eq!(p.id, "medium");
        assert_eq!(p.renderer.tone_mapping, Some(json!("ACESFilmicToneMapping")));
        assert_eq!(
            p.renderer.shadow_map.kind.as_ref().and_then(Value::as_str),
            Some("PCFSoftShadowMap")
        );
        assert_eq!(p.renderer.shadow_map.map_size.unwrap().width, 2048.0);
        assert_eq!(p.renderer.tone_mapping_exposure, Some(1.2));
    }

    #[test]
    fn test_parse_fixture_scene_profile() {
        let s: SceneProfile = serde_json::from_value(fixtures::scene("studio")).unwrap();
        assert_eq!(s.lights.len(), 3);
        assert_eq!(s.lights[0].kind, "DirectionalLight");
        assert_eq!(s.lights[0].helper.as_ref().and_then(|h| h.visible), Some(true));
        assert_eq!(s.lights[1].color, Some(ColorValue::Number(0xffaa00 as f64)));
        assert!(s.postprocessing.effects.bloom.unwrap().enabled);
        assert_eq!(s.cameras.default.as_ref().unwrap().fov, Some(45.0));
        assert!(s.floor.as_ref().unwrap().visible);
    }

    #[test]
    fn test_malformed_block_falls_back_to_default() {
        let mut doc = fixtures::scene("broken");
        doc["lighting"] = json!("not an object");
        doc["lights"][1] = json!(42);
        let s: SceneProfile = serde_json::from_value(doc).unwrap();
        assert!(!s.lighting.enabled);
        assert_eq!(s.lights.len(), 2);
    }

    #[test]
    fn test_malformed_field_keeps_the_rest_of_the_block() {
        let mut doc = fixtures::scene("partial");
        doc["lights"] = json!([
            { "type": "PointLight", "name": "p", "enabled": true, "intensity": "2", "distance": 5 }
        ]);
        doc["lighting"]["visible"] = json!("yes");
        let s: SceneProfile = serde_json::from_value(doc).unwrap();

        assert_eq!(s.lights.len(), 1);
        let light = &s.lights[0];
        assert_eq!(light.kind, "PointLight");
        assert_eq!(light.name.as_deref(), Some("p"));
        assert_eq!(light.enabled, Some(true));
        assert_eq!(light.intensity, None);
        assert_eq!(light.distance, Some(5.0));

        assert!(s.lighting.enabled);
        assert!(!s.lighting.visible);
        assert!(s.lighting.ambient.is_some());
    }

    #[test]
    fn test_color_value_parsing() {
        assert_eq!(ColorValue::from(0xff0000).to_color(), Some(Color::from_hex(0xff0000)));
        assert_eq!(ColorValue::from("#00ff00").to_color(), Some(Color::from_hex(0x00ff00)));
        assert_eq!(ColorValue::Number(-1.0).to_color(), None);
        assert_eq!(resolve_color(Some(&ColorValue::from("nope")), "test"), Color::WHITE);
    }
}
