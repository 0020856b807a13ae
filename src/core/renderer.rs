//! Renderer settings driven by performance profiles.
//!
//! The host owns the actual wgpu device and surface; this type holds the
//! configuration it should render with and resolves profile strings into
//! closed enums with a defined fallback for every unknown value.

use crate::math::Color;
use crate::profile::RendererProfile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Tone mapping operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToneMapping {
    /// No tone mapping.
    None,
    /// Linear scaling by exposure.
    #[default]
    Linear,
    /// Reinhard operator.
    Reinhard,
    /// Cineon filmic curve.
    Cineon,
    /// ACES filmic curve.
    AcesFilmic,
    /// AgX.
    AgX,
    /// Khronos PBR neutral.
    Neutral,
    /// Uncharted 2 filmic curve.
    Custom,
}

impl ToneMapping {
    /// Value used when a profile names an unknown operator.
    pub const FALLBACK: Self = ToneMapping::Linear;

    /// Parse a profile name such as `ACESFilmicToneMapping`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "NoToneMapping" => Some(ToneMapping::None),
            "LinearToneMapping" => Some(ToneMapping::Linear),
            "ReinhardToneMapping" => Some(ToneMapping::Reinhard),
            "CineonToneMapping" => Some(ToneMapping::Cineon),
            "ACESFilmicToneMapping" => Some(ToneMapping::AcesFilmic),
            "AgXToneMapping" => Some(ToneMapping::AgX),
            "NeutralToneMapping" => Some(ToneMapping::Neutral),
            "CustomToneMapping" => Some(ToneMapping::Custom),
            _ => None,
        }
    }

    /// Profile name of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToneMapping::None => "NoToneMapping",
            ToneMapping::Linear => "LinearToneMapping",
            ToneMapping::Reinhard => "ReinhardToneMapping",
            ToneMapping::Cineon => "CineonToneMapping",
            ToneMapping::AcesFilmic => "ACESFilmicToneMapping",
            ToneMapping::AgX => "AgXToneMapping",
            ToneMapping::Neutral => "NeutralToneMapping",
            ToneMapping::Custom => "CustomToneMapping",
        }
    }

    /// Index used by tone mapping shaders.
    pub fn shader_index(&self) -> u32 {
        *self as u32
    }
}

/// Shadow map filtering algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShadowMapType {
    /// Unfiltered.
    Basic,
    /// Percentage-closer filtering.
    #[default]
    Pcf,
    /// Soft percentage-closer filtering.
    PcfSoft,
    /// Variance shadow maps.
    Vsm,
}

impl ShadowMapType {
    /// Value used when a profile names an unknown type.
    pub const FALLBACK: Self = ShadowMapType::Pcf;

    /// Parse a profile name such as `PCFSoftShadowMap`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "BasicShadowMap" => Some(ShadowMapType::Basic),
            "PCFShadowMap" => Some(ShadowMapType::Pcf),
            "PCFSoftShadowMap" => Some(ShadowMapType::PcfSoft),
            "VSMShadowMap" => Some(ShadowMapType::Vsm),
            _ => None,
        }
    }

    /// Profile name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadowMapType::Basic => "BasicShadowMap",
            ShadowMapType::Pcf => "PCFShadowMap",
            ShadowMapType::PcfSoft => "PCFSoftShadowMap",
            ShadowMapType::Vsm => "VSMShadowMap",
        }
    }
}

/// Color space of output or texture data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// sRGB transfer function.
    #[default]
    Srgb,
    /// Linear sRGB primaries.
    LinearSrgb,
    /// Display P3.
    DisplayP3,
}

impl ColorSpace {
    /// Value used when a profile names an unknown color space.
    pub const FALLBACK: Self = ColorSpace::Srgb;

    /// Parse a color space name. Legacy encoding names are accepted too.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "srgb" | "sRGBEncoding" => Some(ColorSpace::Srgb),
            "srgb-linear" | "LinearEncoding" => Some(ColorSpace::LinearSrgb),
            "display-p3" => Some(ColorSpace::DisplayP3),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorSpace::Srgb => "srgb",
            ColorSpace::LinearSrgb => "srgb-linear",
            ColorSpace::DisplayP3 => "display-p3",
        }
    }
}

/// Shader float precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Precision {
    /// Full precision.
    #[default]
    Highp,
    /// Medium precision.
    Mediump,
    /// Low precision.
    Lowp,
}

impl Precision {
    /// Value used when a profile names an unknown precision.
    pub const FALLBACK: Self = Precision::Highp;

    /// Parse `highp`, `mediump` or `lowp`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "highp" => Some(Precision::Highp),
            "mediump" => Some(Precision::Mediump),
            "lowp" => Some(Precision::Lowp),
            _ => None,
        }
    }
}

/// Parse a power preference name into the wgpu equivalent.
pub fn parse_power_preference(name: &str) -> Option<wgpu::PowerPreference> {
    match name {
        "default" => Some(wgpu::PowerPreference::None),
        "high-performance" => Some(wgpu::PowerPreference::HighPerformance),
        "low-power" => Some(wgpu::PowerPreference::LowPower),
        _ => None,
    }
}

/// A profile setting that named an unknown value and was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumFallback {
    /// Profile field, e.g. `toneMapping`.
    pub setting: &'static str,
    /// The value found in the profile, `None` when the setting was missing.
    pub requested: Option<String>,
    /// The value used instead.
    pub applied: &'static str,
}

impl fmt::Display for EnumFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.requested {
            Some(requested) => write!(
                f,
                "Unknown {} \"{}\", using {}",
                self.setting, requested, self.applied
            ),
            None => write!(f, "Missing {}, using {}", self.setting, self.applied),
        }
    }
}

/// Shadow map settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    /// Shadows on or off.
    pub enabled: bool,
    /// Filtering algorithm.
    pub kind: ShadowMapType,
    /// Shadow map width.
    pub map_width: u32,
    /// Shadow map height.
    pub map_height: u32,
    /// VSM blur samples.
    pub blur_samples: u32,
    /// Depth bias.
    pub bias: f32,
    /// Blur radius.
    pub radius: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: ShadowMapType::Pcf,
            map_width: 1024,
            map_height: 1024,
            blur_samples: 4,
            bias: 0.0001,
            radius: 1.0,
        }
    }
}

/// The renderer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderer {
    /// Multisample anti-aliasing.
    pub antialias: bool,
    /// Shader precision.
    pub precision: Precision,
    /// Adapter power preference.
    pub power_preference: wgpu::PowerPreference,
    /// Refuse software adapters.
    pub fail_if_major_performance_caveat: bool,
    /// Depth buffer.
    pub depth: bool,
    /// Stencil buffer.
    pub stencil: bool,
    /// Transparent output.
    pub alpha: bool,
    /// Premultiplied alpha output.
    pub premultiplied_alpha: bool,
    /// Keep the drawing buffer between frames.
    pub preserve_drawing_buffer: bool,
    /// XR compatible context.
    pub xr_compatible: bool,
    /// Clear before each frame.
    pub auto_clear: bool,
    /// Physically based light falloff.
    pub physically_correct_lights: bool,
    /// Logarithmic depth buffer.
    pub logarithmic_depth_buffer: bool,
    /// Device pixel ratio.
    pub pixel_ratio: f32,
    /// Tone mapping operator.
    pub tone_mapping: ToneMapping,
    /// Tone mapping exposure.
    pub tone_mapping_exposure: f32,
    /// Output color space.
    pub output_color_space: ColorSpace,
    /// Shadow map settings.
    pub shadow_map: ShadowSettings,
    /// Clear color.
    clear_color: Color,
    /// Id of the applied performance profile.
    profile_id: Option<String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with default settings.
    pub fn new() -> Self {
        Self {
            antialias: true,
            precision: Precision::Highp,
            power_preference: wgpu::PowerPreference::None,
            fail_if_major_performance_caveat: false,
            depth: true,
            stencil: false,
            alpha: false,
            premultiplied_alpha: true,
            preserve_drawing_buffer: false,
            xr_compatible: false,
            auto_clear: true,
            physically_correct_lights: false,
            logarithmic_depth_buffer: false,
            pixel_ratio: 1.0,
            tone_mapping: ToneMapping::None,
            tone_mapping_exposure: 1.0,
            output_color_space: ColorSpace::Srgb,
            shadow_map: ShadowSettings::default(),
            clear_color: Color::BLACK,
            profile_id: None,
        }
    }

    /// Apply a performance profile's renderer block.
    ///
    /// Unknown enum names are replaced by their fallback; each substitution is
    /// logged once and returned.
    pub fn configure(&mut self, profile: &RendererProfile) -> Vec<EnumFallback> {
        let mut fallbacks = Vec::new();

        self.antialias = profile.antialias;
        self.precision = profile.precision.as_ref().map_or(Precision::FALLBACK, |value| {
            resolve(
                &mut fallbacks,
                "precision",
                value,
                Precision::parse,
                Precision::FALLBACK,
                "highp",
            )
        });
        self.power_preference =
            profile
                .power_preference
                .as_ref()
                .map_or(wgpu::PowerPreference::None, |value| {
                    resolve(
                        &mut fallbacks,
                        "powerPreference",
                        value,
                        parse_power_preference,
                        wgpu::PowerPreference::None,
                        "default",
                    )
                });
        self.fail_if_major_performance_caveat = profile.fail_if_major_performance_caveat;
        self.depth = profile.depth;
        self.stencil = profile.stencil;
        self.alpha = profile.alpha;
        self.premultiplied_alpha = profile.premultiplied_alpha;
        self.preserve_drawing_buffer = profile.preserve_drawing_buffer;
        self.xr_compatible = profile.xr_compatible;
        self.auto_clear = profile.auto_clear;
        self.physically_correct_lights = profile.physically_correct_lights;
        self.logarithmic_depth_buffer = profile.logarithmic_depth_buffer;
        self.pixel_ratio = if profile.pixel_ratio > 0.0 {
            profile.pixel_ratio
        } else {
            1.0
        };

        let shadow = &profile.shadow_map;
        self.shadow_map = if shadow.enabled {
            let kind = match &shadow.kind {
                Some(value) => resolve(
                    &mut fallbacks,
                    "shadowMap.type",
                    value,
                    ShadowMapType::parse,
                    ShadowMapType::FALLBACK,
                    ShadowMapType::FALLBACK.as_str(),
                ),
                None => ShadowMapType::FALLBACK,
            };
            let defaults = ShadowSettings::default();
            let size = shadow.map_size.unwrap_or_default();
            ShadowSettings {
                enabled: true,
                kind,
                map_width: positive(size.width).map_or(defaults.map_width, |w| w as u32),
                map_height: positive(size.height).map_or(defaults.map_height, |h| h as u32),
                blur_samples: shadow
                    .blur_samples
                    .and_then(positive)
                    .map_or(defaults.blur_samples, |s| s as u32),
                bias: shadow.bias.filter(|b| *b != 0.0).unwrap_or(defaults.bias),
                radius: shadow.radius.and_then(positive).unwrap_or(defaults.radius),
            }
        } else {
            ShadowSettings::default()
        };

        self.tone_mapping = match &profile.tone_mapping {
            Some(value) => resolve(
                &mut fallbacks,
                "toneMapping",
                value,
                ToneMapping::parse,
                ToneMapping::FALLBACK,
                ToneMapping::FALLBACK.as_str(),
            ),
            None => {
                substitute(
                    &mut fallbacks,
                    "toneMapping",
                    None,
                    ToneMapping::FALLBACK.as_str(),
                );
                ToneMapping::FALLBACK
            }
        };
        self.tone_mapping_exposure = profile
            .tone_mapping_exposure
            .and_then(positive)
            .unwrap_or(1.0);

        // An explicit color space wins over the legacy encoding name.
        self.output_color_space = match &profile.output_color_space {
            Some(value) => resolve(
                &mut fallbacks,
                "outputColorSpace",
                value,
                ColorSpace::parse,
                ColorSpace::FALLBACK,
                ColorSpace::FALLBACK.as_str(),
            ),
            None => ColorSpace::parse(&profile.output_encoding).unwrap_or(ColorSpace::FALLBACK),
        };

        log::debug!(
            "Renderer configured: tone mapping {}, exposure {}, shadows {}",
            self.tone_mapping.as_str(),
            self.tone_mapping_exposure,
            if self.shadow_map.enabled {
                self.shadow_map.kind.as_str()
            } else {
                "off"
            }
        );

        fallbacks
    }

    /// Record which performance profile is applied.
    pub fn set_profile_id(&mut self, id: impl Into<String>) {
        self.profile_id = Some(id.into());
    }

    /// Id of the applied performance profile.
    #[inline]
    pub fn profile_id(&self) -> Option<&str> {
        self.profile_id.as_deref()
    }

    /// Set the clear color.
    #[inline]
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Get the clear color.
    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Get the wgpu clear color.
    pub fn wgpu_clear_color(&self) -> wgpu::Color {
        let mut color: wgpu::Color = self.clear_color.into();
        color.a = if self.alpha { 0.0 } else { 1.0 };
        color
    }

    /// MSAA sample count.
    #[inline]
    pub fn sample_count(&self) -> u32 {
        if self.antialias {
            4
        } else {
            1
        }
    }

    /// Depth attachment format, if a depth buffer is used.
    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        match (self.depth, self.stencil) {
            (_, true) => Some(wgpu::TextureFormat::Depth24PlusStencil8),
            (true, false) => Some(wgpu::TextureFormat::Depth32Float),
            (false, false) => None,
        }
    }

    /// Surface format matching the output color space.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        match self.output_color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Bgra8UnormSrgb,
            ColorSpace::LinearSrgb => wgpu::TextureFormat::Bgra8Unorm,
            ColorSpace::DisplayP3 => wgpu::TextureFormat::Rgba16Float,
        }
    }

    /// Composite alpha mode for the surface.
    pub fn alpha_mode(&self) -> wgpu::CompositeAlphaMode {
        match (self.alpha, self.premultiplied_alpha) {
            (false, _) => wgpu::CompositeAlphaMode::Opaque,
            (true, true) => wgpu::CompositeAlphaMode::PreMultiplied,
            (true, false) => wgpu::CompositeAlphaMode::PostMultiplied,
        }
    }
}

fn positive(value: f32) -> Option<f32> {
    (value > 0.0).then_some(value)
}

pub(crate) fn resolve<T>(
    fallbacks: &mut Vec<EnumFallback>,
    setting: &'static str,
    requested: &Value,
    parse: impl Fn(&str) -> Option<T>,
    fallback: T,
    fallback_name: &'static str,
) -> T {
    if let Some(parsed) = requested.as_str().and_then(|name| parse(name)) {
        return parsed;
    }
    let requested = match requested {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    };
    substitute(fallbacks, setting, Some(requested), fallback_name);
    fallback
}

fn substitute(
    fallbacks: &mut Vec<EnumFallback>,
    setting: &'static str,
    requested: Option<String>,
    applied: &'static str,
) {
    let substitution = EnumFallback {
        setting,
        requested,
        applied,
    };
    log::warn!("{}", substitution);
    fallbacks.push(substitution);
}
