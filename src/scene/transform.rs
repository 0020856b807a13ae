//! Transform component for scene nodes.

use crate::math::{EulerRot, Mat4, Quat, Vec3};

/// Transform component containing position, rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Local position.
    pub position: Vec3,
    /// Local rotation as XYZ Euler angles in radians.
    pub rotation: Vec3,
    /// Local scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Create a new identity transform.
    pub const fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform from position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Set position.
    #[inline]
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    /// Set rotation from Euler angles in radians.
    #[inline]
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vec3::new(x, y, z);
    }

    /// Set uniform scale.
    #[inline]
    pub fn set_scale_uniform(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }

    /// Rotation as a quaternion.
    pub fn quaternion(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local transformation matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matrix() {
        assert_eq!(Transform::new().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_translation_matrix() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let p = t.matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
    }
}
