//! Orbit controls for rotating camera around a target.

use crate::camera::PerspectiveCamera;
use crate::math::Vec3;
use crate::profile::ControlsProfile;
use std::f32::consts::{FRAC_PI_2, PI};

/// Orbit controls allowing camera rotation around a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Target point to orbit around.
    pub target: Vec3,
    /// Minimum distance from target.
    pub min_distance: f32,
    /// Maximum distance from target.
    pub max_distance: f32,
    /// Minimum polar angle (radians, 0 = top).
    pub min_polar_angle: f32,
    /// Maximum polar angle (radians, PI = bottom).
    pub max_polar_angle: f32,
    /// Enable rotation.
    pub enable_rotate: bool,
    /// Enable panning.
    pub enable_pan: bool,
    /// Enable zooming.
    pub enable_zoom: bool,
    /// Rotation speed multiplier.
    pub rotate_speed: f32,
    /// Pan speed multiplier.
    pub pan_speed: f32,
    /// Zoom speed multiplier.
    pub zoom_speed: f32,
    /// Enable damping (smooth movement).
    pub enable_damping: bool,
    /// Damping factor (0-1, lower = more damping).
    pub damping_factor: f32,
    /// Pan in the view plane instead of the ground plane.
    pub screen_space_panning: bool,
    // Internal state
    delta_theta: f32,
    delta_phi: f32,
    pan_offset: Vec3,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: true,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            enable_damping: false,
            damping_factor: 0.05,
            screen_space_panning: true,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    /// Create new orbit controls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create orbit controls with a target.
    pub fn with_target(target: Vec3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Copy the tuning values present in a profile.
    pub fn apply_profile(&mut self, profile: &ControlsProfile) {
        macro_rules! copy {
            ($($field:ident),*) => {
                $(if let Some(value) = profile.$field {
                    self.$field = value;
                })*
            };
        }
        copy!(
            enable_damping,
            damping_factor,
            rotate_speed,
            pan_speed,
            zoom_speed,
            min_distance,
            max_distance,
            min_polar_angle,
            max_polar_angle,
            enable_pan,
            enable_rotate,
            enable_zoom,
            screen_space_panning
        );
    }

    /// Rotate the camera by delta angles (in radians).
    pub fn rotate(&mut self, delta_theta: f32, delta_phi: f32) {
        if self.enable_rotate {
            // Inverted for natural "grab and drag" feel
            self.delta_theta -= delta_theta * self.rotate_speed;
            self.delta_phi -= delta_phi * self.rotate_speed;
        }
    }

    /// Pan the camera.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32, camera: &PerspectiveCamera) {
        if !self.enable_pan {
            return;
        }

        let offset = camera.position - self.target;
        let distance = offset.length();

        // Half of the fov is center to top of screen
        let target_distance = distance * (camera.fov.to_radians() / 2.0).tan();
        let pan_x = delta_x * target_distance * self.pan_speed * 0.002;
        let pan_y = delta_y * target_distance * self.pan_speed * 0.002;

        let forward = (self.target - camera.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = if self.screen_space_panning {
            right.cross(forward)
        } else {
            Vec3::Y.cross(right)
        };

        self.pan_offset += right * -pan_x + up * pan_y;
    }

    /// Zoom in/out.
    pub fn zoom(&mut self, delta: f32) {
        if self.enable_zoom {
            if delta > 0.0 {
                self.scale /= 1.0 + delta * self.zoom_speed * 0.1;
            } else {
                self.scale *= 1.0 - delta * self.zoom_speed * 0.1;
            }
        }
    }

    /// Update the camera based on accumulated input.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        // Polar angle measured from +Y.
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.delta_theta * factor;
        phi += self.delta_phi * factor;

        let min_phi = self.min_polar_angle.max(0.0001);
        let max_phi = self.max_polar_angle.min(PI - 0.0001).max(min_phi);
        phi = phi.clamp(min_phi, max_phi);

        let new_radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        let new_offset = Vec3::new(
            new_radius * phi.sin() * theta.sin(),
            new_radius * phi.cos(),
            new_radius * phi.sin() * theta.cos(),
        );
        camera.position = self.target + new_offset;
        camera.target = self.target;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
    }

    /// Reset to initial state.
    pub fn reset(&mut self) {
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }

    /// Polar angle straight out to the side.
    pub const HORIZON: f32 = FRAC_PI_2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_profile_copies_present_fields() {
        let mut controls = OrbitControls::new();
        controls.apply_profile(&ControlsProfile {
            enable_damping: Some(true),
            max_distance: Some(200.0),
            screen_space_panning: Some(false),
            ..Default::default()
        });
        assert!(controls.enable_damping);
        assert_eq!(controls.max_distance, 200.0);
        assert!(!controls.screen_space_panning);
        assert_eq!(controls.rotate_speed, 1.0);
    }

    #[test]
    fn test_zoom_respects_distance_limits() {
        let mut camera = PerspectiveCamera::default();
        camera.target = Vec3::ZERO;
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        let mut controls = OrbitControls::new();
        controls.max_distance = 12.0;

        controls.zoom(-100.0);
        controls.update(&mut camera);
        assert!((camera.distance() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = PerspectiveCamera::default();
        camera.target = Vec3::ZERO;
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        let mut controls = OrbitControls::new();
        controls.max_polar_angle = OrbitControls::HORIZON;

        // Drag far enough to swing under the target.
        controls.rotate(0.0, -2.0);
        controls.update(&mut camera);
        assert!(camera.position.y >= -1e-4);
    }
}
