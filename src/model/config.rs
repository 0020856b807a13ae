//! Per-model `config.json` sidecar and the transform recipe it describes.

use crate::math::{deg_to_rad, round_to, Vec3};
use crate::scene::NodeTree;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Size statistics of a glTF asset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInfo {
    /// Triangle count.
    pub triangles: u64,
    /// Vertex count.
    pub vertices: u64,
    /// Size of the glTF file and its buffers, in MiB with two decimals.
    pub file_size_mb: f64,
}

impl ModelInfo {
    /// Compute statistics from accessor metadata.
    ///
    /// Triangles are taken from index counts, or from vertex counts for
    /// non-indexed primitives.
    pub fn from_document(document: &gltf::Document, size_bytes: u64) -> Self {
        let mut triangles = 0.0f64;
        let mut vertices = 0u64;
        for primitive in document.meshes().flat_map(|m| m.primitives()) {
            let positions = primitive
                .get(&gltf::Semantic::Positions)
                .map_or(0, |a| a.count());
            vertices += positions as u64;
            let counted = primitive.indices().map_or(positions, |a| a.count());
            triangles += counted as f64 / 3.0;
        }
        Self {
            triangles: triangles.floor() as u64,
            vertices,
            file_size_mb: round_to(size_bytes as f64 / (1024.0 * 1024.0), 2),
        }
    }
}

/// Which axes to center on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterConfig {
    /// Center along X.
    pub x: bool,
    /// Center along Y.
    pub y: bool,
    /// Center along Z.
    pub z: bool,
}

/// Vertical placement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionMethod {
    /// Rest the lowest point on `value + yOffset`.
    #[default]
    Floor,
    /// Keep the centered position.
    Center,
    /// Reserved by the model index generator.
    TopEdge,
    /// Any other method name; no vertical adjustment.
    #[serde(other)]
    Other,
}

/// The `position` block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositionConfig {
    /// Placement rule.
    pub method: PositionMethod,
    /// Floor height.
    pub value: Option<f32>,
    /// Extra vertical offset.
    pub y_offset: Option<f32>,
}

/// Scaling rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleMethod {
    /// Uniform scale by `fixedScale`.
    #[default]
    Fixed,
    /// Any other method name; scale untouched.
    #[serde(other)]
    Other,
}

/// The `scale` block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaleConfig {
    /// Scaling rule.
    pub method: ScaleMethod,
    /// Uniform scale factor. Zero leaves the scale untouched.
    pub fixed_scale: Option<f32>,
}

/// The `rotation` block, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Rotation about X.
    pub x: Option<f32>,
    /// Rotation about Y.
    pub y: Option<f32>,
    /// Rotation about Z.
    pub z: Option<f32>,
}

/// Contents of a model's `config.json`.
///
/// Absent blocks skip their step of the transform recipe.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Centering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<CenterConfig>,
    /// Vertical placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionConfig>,
    /// Scaling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleConfig>,
    /// Rotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationConfig>,
    /// Statistics recorded by the index generator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_info: Option<ModelInfo>,
}

impl ModelConfig {
    /// The sidecar written for a model that has none: center all axes, rest on
    /// the floor, unit scale, no rotation.
    pub fn default_for(info: Option<ModelInfo>) -> Self {
        Self {
            center: Some(CenterConfig {
                x: true,
                y: true,
                z: true,
            }),
            position: Some(PositionConfig {
                method: PositionMethod::Floor,
                value: Some(0.0),
                y_offset: Some(0.0),
            }),
            scale: Some(ScaleConfig {
                method: ScaleMethod::Fixed,
                fixed_scale: Some(1.0),
            }),
            rotation: Some(RotationConfig {
                x: Some(0.0),
                y: Some(0.0),
                z: Some(0.0),
            }),
            model_info: Some(info.unwrap_or_default()),
        }
    }

    /// Parse a sidecar document.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Serialize with the 4-space indentation used for sidecar files.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }

    /// Write the sidecar to `path` unless a file already exists there.
    ///
    /// Returns `Ok(false)` when the file existed and was left untouched. A
    /// failed write removes the partial file so a later call can retry.
    pub fn write_if_absent(&self, path: &Path) -> io::Result<bool> {
        let out = self.to_pretty_json().map_err(io::Error::from)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                log::info!("Model config {} already exists", path.display());
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = file.write_all(&out).and_then(|_| file.sync_all()) {
            drop(file);
            if let Err(cleanup) = std::fs::remove_file(path) {
                log::warn!("Failed to remove partial config {}: {}", path.display(), cleanup);
            }
            return Err(e);
        }
        log::info!("Wrote model config {}", path.display());
        Ok(true)
    }

    /// Apply the transform recipe to a loaded model's root.
    ///
    /// Steps run in a fixed order: center, floor placement, scale, rotation.
    pub fn apply_to(&self, model: &mut NodeTree) {
        if let Some(center) = self.center {
            let bounds = model.bounding_box();
            if bounds.is_empty() {
                log::warn!("Model {} has no geometry to center", model.node.name());
            } else {
                let c = bounds.center();
                let position = &mut model.node.transform.position;
                if center.x {
                    position.x = -c.x;
                }
                if center.y {
                    position.y = -c.y;
                }
                if center.z {
                    position.z = -c.z;
                }
            }
        }

        if let Some(position) = self.position {
            if position.method == PositionMethod::Floor {
                let bounds = model.bounding_box();
                if !bounds.is_empty() {
                    model.node.transform.position.y += -bounds.min.y
                        + position.value.unwrap_or(0.0)
                        + position.y_offset.unwrap_or(0.0);
                }
            }
        }

        if let Some(scale) = self.scale {
            if scale.method == ScaleMethod::Fixed {
                if let Some(s) = scale.fixed_scale.filter(|s| *s != 0.0) {
                    model.node.transform.set_scale_uniform(s);
                }
            }
        }

        if let Some(rotation) = self.rotation {
            model.node.transform.rotation = Vec3::new(
                deg_to_rad(rotation.x.unwrap_or(0.0)),
                deg_to_rad(rotation.y.unwrap_or(0.0)),
                deg_to_rad(rotation.z.unwrap_or(0.0)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Aabb;
    use crate::objects::{Mesh, Primitive};
    use crate::scene::{Node, NodeKind};
    use serde_json::json;

    fn model(min: Vec3, max: Vec3) -> NodeTree {
        let mesh = Mesh::new("body", vec![Primitive::new(Aabb::new(min, max), 3)]);
        NodeTree::new(Node::new("root", NodeKind::Group))
            .with_child(NodeTree::new(Node::new("body", NodeKind::Mesh(mesh))))
    }

    #[test]
    fn test_floor_placement() {
        let config: ModelConfig = serde_json::from_value(json!({
            "position": { "method": "floor", "value": 0, "yOffset": 2 }
        }))
        .unwrap();
        let mut tree = model(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 4.0, 1.0));
        config.apply_to(&mut tree);
        assert_eq!(tree.node.transform.position, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_center_then_floor() {
        let mut tree = model(Vec3::new(2.0, 1.0, -4.0), Vec3::new(4.0, 3.0, -2.0));
        ModelConfig::default_for(None).apply_to(&mut tree);
        let t = tree.node.transform;
        assert_eq!(t.position, Vec3::new(-3.0, -1.0, 3.0));
        assert_eq!(tree.bounding_box().min.y, 0.0);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.rotation, Vec3::ZERO);
    }

    #[test]
    fn test_scale_and_rotation() {
        let config: ModelConfig = serde_json::from_value(json!({
            "scale": { "method": "fixed", "fixedScale": 2.5 },
            "rotation": { "y": 90 }
        }))
        .unwrap();
        let mut tree = model(Vec3::ZERO, Vec3::ONE);
        config.apply_to(&mut tree);
        assert_eq!(tree.node.transform.scale, Vec3::splat(2.5));
        assert!((tree.node.transform.rotation.y - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(tree.node.transform.position, Vec3::ZERO);
    }

    #[test]
    fn test_zero_fixed_scale_is_ignored() {
        let config: ModelConfig = serde_json::from_value(json!({
            "scale": { "method": "fixed", "fixedScale": 0 }
        }))
        .unwrap();
        let mut tree = model(Vec3::ZERO, Vec3::ONE);
        config.apply_to(&mut tree);
        assert_eq!(tree.node.transform.scale, Vec3::ONE);
    }

    #[test]
    fn test_unknown_methods_parse() {
        let config: ModelConfig = serde_json::from_value(json!({
            "position": { "method": "topEdge" },
            "scale": { "method": "fit" }
        }))
        .unwrap();
        assert_eq!(config.position.unwrap().method, PositionMethod::TopEdge);
        assert_eq!(config.scale.unwrap().method, ScaleMethod::Other);
    }

    #[test]
    fn test_write_if_absent_never_overwrites() {
        let dir = std::env::temp_dir().join(format!("vitrine-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        let _ = std::fs::remove_file(&path);

        let info = ModelInfo {
            triangles: 12,
            vertices: 8,
            file_size_mb: 0.01,
        };
        assert!(ModelConfig::default_for(Some(info)).write_if_absent(&path).unwrap());
        let written = std::fs::read(&path).unwrap();
        let parsed = ModelConfig::from_slice(&written).unwrap();
        assert_eq!(parsed, ModelConfig::default_for(Some(info)));
        assert!(String::from_utf8_lossy(&written).contains("\n    \"center\""));

        assert!(!ModelConfig::default().write_if_absent(&path).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), written);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_if_absent_writes_serialized_bytes_only_on_success() {
        let dir = std::env::temp_dir().join(format!("vitrine-config-bytes-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");
        let config = ModelConfig::default_for(None);

        // No parent directory: the call fails and leaves nothing behind.
        assert!(config.write_if_absent(&path).is_err());
        assert!(!path.exists());

        std::fs::create_dir_all(&dir).unwrap();
        assert!(config.write_if_absent(&path).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), config.to_pretty_json().unwrap());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
