//! Wireframe helpers drawn at light positions.

use crate::light::LightKind;
use crate::math::{consts::PI, Color, Vec3};
use crate::objects::LineSegments;

/// Wireframe marker for a light, sized by the profile's `helper.size`.
#[derive(Debug, Clone, PartialEq)]
pub struct LightHelper {
    kind: LightKind,
    size: f32,
    lines: LineSegments,
}

impl LightHelper {
    /// Create a helper shaped for `kind`.
    pub fn new(kind: LightKind, size: f32, color: Color) -> Self {
        let c = [color.r, color.g, color.b, 1.0];
        let mut lines = LineSegments::new();
        match kind {
            LightKind::Directional => {
                // Square facing the target plus a pointer line.
                let s = size;
                let corners = [
                    Vec3::new(-s, s, 0.0),
                    Vec3::new(s, s, 0.0),
                    Vec3::new(s, -s, 0.0),
                    Vec3::new(-s, -s, 0.0),
                ];
                push_loop(&mut lines, &corners, c);
                lines.push_segment(Vec3::ZERO, Vec3::new(0.0, 0.0, -s), c);
            }
            LightKind::Point | LightKind::Ambient => {
                for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
                    lines.push_segment(-axis * size, axis * size, c);
                }
            }
            LightKind::Spot => {
                let segments = 8;
                let radius = size * (PI / 6.0).tan();
                let rim: Vec<Vec3> = (0..segments)
                    .map(|i| {
                        let a = i as f32 / segments as f32 * 2.0 * PI;
                        Vec3::new(a.cos() * radius, a.sin() * radius, -size)
                    })
                    .collect();
                for p in &rim {
                    lines.push_segment(Vec3::ZERO, *p, c);
                }
                push_loop(&mut lines, &rim, c);
            }
            LightKind::RectArea => {
                let (w, h) = (size * 0.5, size * 0.5);
                let corners = [
                    Vec3::new(-w, h, 0.0),
                    Vec3::new(w, h, 0.0),
                    Vec3::new(w, -h, 0.0),
                    Vec3::new(-w, -h, 0.0),
                ];
                push_loop(&mut lines, &corners, c);
            }
            LightKind::Hemisphere => {
                let tips = [
                    Vec3::Y * size,
                    Vec3::NEG_Y * size,
                ];
                let ring = [
                    Vec3::X * size,
                    Vec3::Z * size,
                    Vec3::NEG_X * size,
                    Vec3::NEG_Z * size,
                ];
                push_loop(&mut lines, &ring, c);
                for tip in tips {
                    for p in ring {
                        lines.push_segment(tip, p, c);
                    }
                }
            }
        }
        Self { kind, size, lines }
    }

    /// Light kind this helper marks.
    #[inline]
    pub fn kind(&self) -> LightKind {
        self.kind
    }

    /// Helper size.
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Get the line geometry.
    #[inline]
    pub fn lines(&self) -> &LineSegments {
        &self.lines
    }
}

fn push_loop(lines: &mut LineSegments, points: &[Vec3], color: [f32; 4]) {
    for (i, p) in points.iter().enumerate() {
        lines.push_segment(*p, points[(i + 1) % points.len()], color);
    }
}
