//! RGB color with profile-friendly parsing.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// RGB color with values in 0.0-1.0 range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Color {
    /// Red component (0.0 to 1.0).
    pub r: f32,
    /// Green component (0.0 to 1.0).
    pub g: f32,
    /// Blue component (0.0 to 1.0).
    pub b: f32,
}

impl Color {
    /// Black (0, 0, 0).
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };
    /// White (1, 1, 1).
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };
    /// Neutral grey used for meshes that arrive without a material (0x808080).
    pub const MID_GRAY: Self = Self {
        r: 128.0 / 255.0,
        g: 128.0 / 255.0,
        b: 128.0 / 255.0,
    };

    /// Create a new color from RGB values (0.0-1.0).
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create from a hex integer (0xRRGGBB).
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    /// Convert to hex integer.
    pub fn to_hex(&self) -> u32 {
        let r = (self.r.clamp(0.0, 1.0) * 255.0).round() as u32;
        let g = (self.g.clamp(0.0, 1.0) * 255.0).round() as u32;
        let b = (self.b.clamp(0.0, 1.0) * 255.0).round() as u32;
        (r << 16) | (g << 8) | b
    }

    /// Parse a hex color string.
    ///
    /// Accepts `#rrggbb`, `0xrrggbb` and bare `rrggbb`. Returns `None` for anything else.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() || digits.len() > 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    /// Convert to an array.
    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Multiply by a scalar.
    #[inline]
    pub fn multiply_scalar(&self, s: f32) -> Self {
        Self {
            r: self.r * s,
            g: self.g * s,
            b: self.b * s,
        }
    }

    /// Convert from sRGB to linear space.
    pub fn srgb_to_linear(&self) -> Self {
        let to_linear = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        Self {
            r: to_linear(self.r),
            g: to_linear(self.g),
            b: to_linear(self.b),
        }
    }

    /// Check if approximately equal.
    #[inline]
    pub fn approx_eq(&self, other: &Color, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl From<Color> for [f32; 3] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let c = Color::from_hex(0xFF8040);
        assert_eq!(c.to_hex(), 0xFF8040);
    }

    #[test]
    fn test_parse_hex_prefixes() {
        assert_eq!(Color::parse_hex("#ff0000"), Some(Color::from_hex(0xFF0000)));
        assert_eq!(Color::parse_hex("0x00ff00"), Some(Color::from_hex(0x00FF00)));
        assert_eq!(Color::parse_hex("0000ff"), Some(Color::from_hex(0x0000FF)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert_eq!(Color::parse_hex("red"), None);
        assert_eq!(Color::parse_hex("#"), None);
        assert_eq!(Color::parse_hex("#1234567"), None);
    }
}
