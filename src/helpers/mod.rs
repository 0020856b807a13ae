//! Visual helpers for debugging and visualization.

mod axes_helper;
mod floor;
mod grid_helper;
mod light_helper;

pub use axes_helper::AxesHelper;
pub use floor::FloorPlane;
pub use grid_helper::GridHelper;
pub use light_helper::LightHelper;

use crate::objects::LineSegments;

/// A helper value stored on a scene node.
#[derive(Debug, Clone, PartialEq)]
pub enum Helper {
    /// Light marker.
    Light(LightHelper),
    /// Ground grid.
    Grid(GridHelper),
    /// Coordinate axes.
    Axes(AxesHelper),
    /// Floor plane.
    Floor(FloorPlane),
}

impl Helper {
    /// Line geometry, if the helper is drawn as lines.
    pub fn lines(&self) -> Option<&LineSegments> {
        match self {
            Helper::Light(h) => Some(h.lines()),
            Helper::Grid(h) => Some(h.lines()),
            Helper::Axes(h) => Some(h.lines()),
            Helper::Floor(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;
    use crate::math::Color;

    #[test]
    fn test_grid_segment_count() {
        let grid = GridHelper::simple(10.0, 4);
        assert_eq!(grid.lines().segment_count(), 10);
        let bounds = grid.lines().bounding_box();
        assert_eq!(bounds.min.x, -5.0);
        assert_eq!(bounds.max.z, 5.0);
    }

    #[test]
    fn test_axes_helper() {
        let axes = AxesHelper::new(2.0);
        assert_eq!(axes.lines().segment_count(), 3);
        assert_eq!(axes.lines().bounding_box().max.x, 2.0);
    }

    #[test]
    fn test_light_helper_scales_with_size() {
        let small = LightHelper::new(LightKind::Point, 1.0, Color::WHITE);
        let large = LightHelper::new(LightKind::Point, 3.0, Color::WHITE);
        assert_eq!(small.lines().bounding_box().max.x, 1.0);
        assert_eq!(large.lines().bounding_box().max.x, 3.0);
        assert_eq!(Helper::Light(large).lines().map(|l| l.segment_count()), Some(3));
    }

    #[test]
    fn test_every_light_kind_has_geometry() {
        for kind in [
            LightKind::Ambient,
            LightKind::Hemisphere,
            LightKind::Directional,
            LightKind::Point,
            LightKind::Spot,
            LightKind::RectArea,
        ] {
            assert!(LightHelper::new(kind, 1.0, Color::WHITE).lines().segment_count() > 0);
        }
    }
}
