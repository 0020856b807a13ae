//! Perspective camera.

use crate::math::{Mat4, Vec3};
use crate::profile::CameraProfile;

/// Preset viewpoints around the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraView {
    /// Side view along +X.
    Default,
    /// Side view along -X.
    Back,
    /// Looking straight down.
    Top,
}

impl CameraView {
    /// Point every preset looks at.
    pub const TARGET: Vec3 = Vec3::new(0.0, 5.0, 0.0);

    /// Camera position for the preset.
    pub fn position(self) -> Vec3 {
        match self {
            CameraView::Default => Vec3::new(50.0, 5.0, 0.0),
            CameraView::Back => Vec3::new(-50.0, 5.0, 0.0),
            CameraView::Top => Vec3::new(0.0, 50.0, 0.0),
        }
    }

    /// Parse a view name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "default" => Some(CameraView::Default),
            "back" => Some(CameraView::Back),
            "top" => Some(CameraView::Top),
            _ => None,
        }
    }
}

/// A perspective projection camera.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Field of view in degrees.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Camera position.
    pub position: Vec3,
    /// Camera target (look-at point).
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(45.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

impl PerspectiveCamera {
    /// Create a new perspective camera at the default viewpoint.
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            position: CameraView::Default.position(),
            target: CameraView::TARGET,
            up: Vec3::Y,
        }
    }

    /// Apply a profile camera definition. Absent fields keep their current value.
    pub fn apply_profile(&mut self, profile: &CameraProfile) {
        self.fov = profile.fov.unwrap_or(self.fov);
        self.near = profile.near.unwrap_or(self.near);
        self.far = profile.far.unwrap_or(self.far);
        if let Some(position) = profile.position {
            self.position = position.into();
        }
        if let Some(target) = profile.target {
            self.target = target.into();
        }
        log::debug!(
            "Camera at {:?} looking at {:?} (fov {})",
            self.position,
            self.target,
            self.fov
        );
    }

    /// Jump to a preset viewpoint.
    pub fn set_view(&mut self, view: CameraView) {
        self.position = view.position();
        self.target = CameraView::TARGET;
    }

    /// Set the aspect ratio.
    #[inline]
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        // Looking straight along the up axis needs another reference direction.
        let up = if self.forward().cross(self.up).length_squared() < 1e-8 {
            Vec3::NEG_Z
        } else {
            self.up
        };
        Mat4::look_at_rh(self.position, self.target, up)
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get the forward direction.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Distance from position to target.
    #[inline]
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Vec3Profile;

    #[test]
    fn test_default_view() {
        let camera = PerspectiveCamera::default();
        assert_eq!(camera.position, Vec3::new(50.0, 5.0, 0.0));
        assert_eq!(camera.forward(), Vec3::NEG_X);
    }

    #[test]
    fn test_apply_profile_keeps_missing_fields() {
        let mut camera = PerspectiveCamera::default();
        camera.apply_profile(&CameraProfile {
            fov: Some(60.0),
            position: Some(Vec3Profile { x: 0.0, y: 2.0, z: 10.0 }),
            ..Default::default()
        });
        assert_eq!(camera.fov, 60.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.position, Vec3::new(0.0, 2.0, 10.0));
        assert_eq!(camera.target, CameraView::TARGET);
    }

    #[test]
    fn test_views() {
        let mut camera = PerspectiveCamera::default();
        camera.set_view(CameraView::parse("top").unwrap());
        assert_eq!(camera.position, Vec3::new(0.0, 50.0, 0.0));
        camera.set_view(CameraView::Back);
        assert!((camera.distance() - 50.0).abs() < 1e-5);
        assert_eq!(CameraView::parse("side"), None);
    }

    #[test]
    fn test_top_view_matrix_is_finite() {
        let mut camera = PerspectiveCamera::default();
        camera.set_view(CameraView::Top);
        assert!(camera.view_projection_matrix().is_finite());
    }
}
