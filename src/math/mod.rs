//! # Math Module
//!
//! Vector and matrix types come from `glam`; this module adds the
//! color and bounding-box types the viewer builds on.

mod aabb;
mod color;

pub use aabb::Aabb;
pub use color::Color;
pub use glam::{EulerRot, Mat4, Quat, Vec3};

/// Common math constants and utilities.
pub mod consts {
    /// Pi constant.
    pub const PI: f32 = std::f32::consts::PI;
    /// Degrees to radians conversion factor.
    pub const DEG2RAD: f32 = PI / 180.0;
}

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * consts::DEG2RAD
}

/// Round to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deg_to_rad() {
        assert!((deg_to_rad(180.0) - consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
    }
}
