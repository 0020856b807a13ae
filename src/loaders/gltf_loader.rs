//! glTF/GLB model loader.
//!
//! Parses the document with the `gltf` crate, resolves buffers through a
//! [`Fetcher`] and converts the default scene into a detached [`NodeTree`].
//! Only what the scene graph needs is kept: bounds, counts and materials.

use super::{parent_dir, FetchError, Fetcher};
use crate::material::{StandardMaterial, TextureSlot};
use crate::math::{Aabb, Color, EulerRot, Quat, Vec3};
use crate::model::ModelInfo;
use crate::objects::{Mesh, Primitive};
use crate::scene::{Node, NodeKind, NodeTree};
use base64::Engine;
use thiserror::Error;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_JSON_CHUNK: u32 = 0x4E4F_534A;

/// Errors that can occur while loading a glTF asset.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The document or one of its buffers could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The document is not valid glTF.
    #[error("Failed to parse glTF: {0}")]
    Parse(#[from] gltf::Error),

    /// An embedded buffer has a malformed data URI.
    #[error("Buffer {index} has an invalid data URI: {source}")]
    DataUri {
        /// Buffer index.
        index: usize,
        /// Decoder error.
        #[source]
        source: base64::DecodeError,
    },

    /// A GLB buffer references a missing binary chunk.
    #[error("Buffer {0} has no data")]
    MissingBuffer(usize),

    /// A mesh primitive has no POSITION attribute.
    #[error("Mesh {0} has a primitive without positions")]
    MissingPositions(String),

    /// The document contains no scene.
    #[error("glTF document has no scene")]
    NoScene,
}

/// A parsed model ready to be inserted into a scene.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Root group holding the scene's nodes.
    pub root: NodeTree,
    /// Animation clip names.
    pub animations: Vec<String>,
    /// Size statistics.
    pub info: ModelInfo,
}

/// glTF/GLB file loader.
pub struct GltfLoader<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: Fetcher + ?Sized> GltfLoader<'a, F> {
    /// Create a new loader resolving external resources through `fetcher`.
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Fetch and load the asset at `path`.
    pub fn load(&self, path: &str) -> Result<LoadedModel, LoadError> {
        let data = self.fetcher.fetch(path)?;
        self.load_from_bytes(&data, parent_dir(path))
    }

    /// Load a glTF or GLB document. External buffers are resolved relative to `base_dir`.
    pub fn load_from_bytes(&self, data: &[u8], base_dir: &str) -> Result<LoadedModel, LoadError> {
        // Extensions are not decoded, so required ones must not fail the parse.
        let stripped = strip_required_extensions(data);
        let gltf = gltf::Gltf::from_slice(stripped.as_deref().unwrap_or(data))?;

        let mut size_bytes = data.len() as u64;
        let buffers = self.resolve_buffers(&gltf, base_dir, &mut size_bytes)?;

        let scene = gltf
            .document
            .default_scene()
            .or_else(|| gltf.document.scenes().next())
            .ok_or(LoadError::NoScene)?;

        let mut root = NodeTree::new(Node::new(scene.name().unwrap_or("Scene"), NodeKind::Group));
        for node in scene.nodes() {
            root.children.push(load_node(&node, &buffers)?);
        }

        let animations = gltf
            .document
            .animations()
            .map(|a| {
                a.name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("animation_{}", a.index()))
            })
            .collect();

        let info = ModelInfo::from_document(&gltf.document, size_bytes);
        log::debug!(
            "Parsed glTF: {} nodes, {} triangles, {} MB",
            root.len(),
            info.triangles,
            info.file_size_mb
        );

        Ok(LoadedModel {
            root,
            animations,
            info,
        })
    }

    fn resolve_buffers(
        &self,
        gltf: &gltf::Gltf,
        base_dir: &str,
        size_bytes: &mut u64,
    ) -> Result<Vec<Vec<u8>>, LoadError> {
        gltf.document
            .buffers()
            .map(|buffer| match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .clone()
                    .ok_or(LoadError::MissingBuffer(buffer.index())),
                gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                    let payload = uri.split_once(',').map_or("", |(_, p)| p);
                    base64::engine::general_purpose::STANDARD
                        .decode(payload)
                        .map_err(|source| LoadError::DataUri {
                            index: buffer.index(),
                            source,
                        })
                }
                gltf::buffer::Source::Uri(uri) => {
                    let bytes = self.fetcher.fetch(&format!("{base_dir}{uri}"))?;
                    *size_bytes += bytes.len() as u64;
                    Ok(bytes)
                }
            })
            .collect()
    }
}

fn load_node(node: &gltf::Node, buffers: &[Vec<u8>]) -> Result<NodeTree, LoadError> {
    let kind = match node.mesh() {
        Some(mesh) => NodeKind::Mesh(load_mesh(&mesh, buffers)?),
        None => NodeKind::Group,
    };
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    let mut tree = NodeTree::new(Node::new(name, kind));
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = &mut tree.node.transform;
    transform.position = Vec3::from(translation);
    transform.rotation = Vec3::from(Quat::from_array(rotation).to_euler(EulerRot::XYZ));
    transform.scale = Vec3::from(scale);

    for child in node.children() {
        tree.children.push(load_node(&child, buffers)?);
    }
    Ok(tree)
}

fn load_mesh(mesh: &gltf::Mesh, buffers: &[Vec<u8>]) -> Result<Mesh, LoadError> {
    let name = mesh.name().unwrap_or("Mesh");
    let primitives = mesh
        .primitives()
        .map(|primitive| {
            let reader = primitive.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
            let positions: Vec<Vec3> = reader
                .read_positions()
                .ok_or_else(|| LoadError::MissingPositions(name.to_string()))?
                .map(Vec3::from)
                .collect();

            let mut loaded = Primitive::new(Aabb::from_points(&positions), positions.len());
            loaded.index_count = primitive.indices().map_or(0, |a| a.count());
            let material = primitive.material();
            if material.index().is_some() {
                loaded.material = Some(load_material(&material));
            }
            Ok(loaded)
        })
        .collect::<Result<Vec<_>, LoadError>>()?;
    Ok(Mesh::new(name, primitives))
}

fn load_material(material: &gltf::Material) -> StandardMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();

    let mut loaded = StandardMaterial::with_color(Color::new(r, g, b));
    loaded.name = material.name().unwrap_or("Unnamed").to_string();
    loaded.roughness = pbr.roughness_factor();
    loaded.metalness = pbr.metallic_factor();

    if let Some(info) = pbr.base_color_texture() {
        loaded.set_texture(TextureSlot::Map, info.texture().index());
    }
    if let Some(info) = pbr.metallic_roughness_texture() {
        loaded.set_texture(TextureSlot::RoughnessMap, info.texture().index());
        loaded.set_texture(TextureSlot::MetalnessMap, info.texture().index());
    }
    if let Some(info) = material.normal_texture() {
        loaded.set_texture(TextureSlot::NormalMap, info.texture().index());
    }
    if let Some(info) = material.occlusion_texture() {
        loaded.set_texture(TextureSlot::AoMap, info.texture().index());
    }
    if let Some(info) = material.emissive_texture() {
        loaded.set_texture(TextureSlot::EmissiveMap, info.texture().index());
    }
    loaded
}

/// Remove `extensionsRequired` from a glTF or GLB document.
///
/// Returns `None` when the document needs no change.
fn strip_required_extensions(data: &[u8]) -> Option<Vec<u8>> {
    if data.starts_with(GLB_MAGIC) {
        strip_extensions_from_glb(data)
    } else {
        strip_extensions_from_json(data)
    }
}

fn strip_extensions_from_glb(data: &[u8]) -> Option<Vec<u8>> {
    // Header is magic, version, length; the JSON chunk comes first.
    let read_u32 = |at: usize| -> Option<u32> {
        let bytes = data.get(at..at + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    };
    let json_length = read_u32(12)? as usize;
    if read_u32(16)? != GLB_JSON_CHUNK {
        return None;
    }
    let json_end = 20 + json_length;
    let json = strip_extensions_from_json(data.get(20..json_end)?)?;

    let padded_length = (json.len() + 3) & !3;
    let rest = &data[json_end..];
    let total_length = 20 + padded_length + rest.len();

    let mut out = Vec::with_capacity(total_length);
    out.extend_from_slice(&data[0..8]);
    out.extend_from_slice(&(total_length as u32).to_le_bytes());
    out.extend_from_slice(&(padded_length as u32).to_le_bytes());
    out.extend_from_slice(&GLB_JSON_CHUNK.to_le_bytes());
    out.extend_from_slice(&json);
    out.resize(20 + padded_length, b' ');
    out.extend_from_slice(rest);
    Some(out)
}

fn strip_extensions_from_json(data: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(data).ok()?;
    if !text.contains("extensionsRequired") {
        return None;
    }
    let mut json: serde_json::Value = serde_json::from_str(text).ok()?;
    json.as_object_mut()?.remove("extensionsRequired");
    serde_json::to_vec(&json).ok()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use base64::Engine;
    use serde_json::json;

    /// Three vertices spanning `x 0..1`, `y min_y..min_y + 2`, `z = 0`.
    pub fn triangle_buffer(min_y: f32) -> Vec<u8> {
        [0.0, min_y, 0.0, 1.0, min_y, 0.0, 0.0, min_y + 2.0, 0.0]
            .iter()
            .flat_map(|v: &f32| v.to_le_bytes())
            .collect()
    }

    /// A one-triangle glTF document. With `buffer_uri` the buffer is external,
    /// otherwise it is embedded as a data URI.
    pub fn triangle_gltf(min_y: f32, buffer_uri: Option<&str>) -> Vec<u8> {
        let uri = match buffer_uri {
            Some(uri) => uri.to_string(),
            None => format!(
                "data:application/octet-stream;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(triangle_buffer(min_y))
            ),
        };
        serde_json::to_vec(&json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "name": "Scene", "nodes": [0] }],
            "nodes": [{ "name": "Body", "mesh": 0 }],
            "meshes": [{ "name": "Body", "primitives": [{ "attributes": { "POSITION": 0 } }] }],
            "buffers": [{ "byteLength": 36, "uri": uri }],
            "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
            "accessors": [{
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, min_y, 0.0],
                "max": [1.0, min_y + 2.0, 0.0]
            }]
        }))
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::loaders::MemoryFetcher;
    use serde_json::json;

    #[test]
    fn test_load_embedded_triangle() {
        let fetcher = MemoryFetcher::new();
        let model = GltfLoader::new(&fetcher)
            .load_from_bytes(&triangle_gltf(-1.0, None), "")
            .unwrap();

        assert_eq!(model.root.node.name(), "Scene");
        assert_eq!(model.root.len(), 2);
        let body = &model.root.children[0].node;
        let mesh = body.kind().as_mesh().unwrap();
        assert_eq!(mesh.primitives[0].vertex_count, 3);
        assert!(mesh.primitives[0].material.is_none());

        let bounds = model.root.bounding_box();
        assert_eq!(bounds.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(model.info.vertices, 3);
        assert_eq!(model.info.triangles, 1);
        assert!(model.animations.is_empty());
    }

    #[test]
    fn test_external_buffer_is_fetched_relative_to_document() {
        let mut fetcher = MemoryFetcher::new();
        fetcher.insert("models/tri/scene.gltf", triangle_gltf(0.0, Some("scene.bin")));
        fetcher.insert("models/tri/scene.bin", triangle_buffer(0.0));

        let model = GltfLoader::new(&fetcher).load("models/tri/scene.gltf").unwrap();
        assert_eq!(fetcher.request_count("models/tri/scene.bin"), 1);
        assert_eq!(model.root.bounding_box().min.y, 0.0);
    }

    #[test]
    fn test_missing_external_buffer() {
        let mut fetcher = MemoryFetcher::new();
        fetcher.insert("m/scene.gltf", triangle_gltf(0.0, Some("scene.bin")));
        let err = GltfLoader::new(&fetcher).load("m/scene.gltf").unwrap_err();
        assert!(matches!(err, LoadError::Fetch(FetchError::NotFound(ref p)) if p == "m/scene.bin"));
    }

    #[test]
    fn test_invalid_document() {
        let fetcher = MemoryFetcher::new();
        let err = GltfLoader::new(&fetcher)
            .load_from_bytes(b"not a model", "")
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_strip_required_extensions() {
        let doc = serde_json::to_vec(&json!({
            "asset": { "version": "2.0" },
            "extensionsUsed": ["KHR_draco_mesh_compression"],
            "extensionsRequired": ["KHR_draco_mesh_compression"]
        }))
        .unwrap();
        let stripped = strip_required_extensions(&doc).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&stripped).unwrap();
        assert!(value.get("extensionsRequired").is_none());
        assert!(value.get("extensionsUsed").is_some());

        assert!(strip_required_extensions(&triangle_gltf(0.0, None)).is_none());
    }

    #[test]
    fn test_strip_required_extensions_glb() {
        let json = br#"{"asset":{"version":"2.0"},"extensionsRequired":["EXT_meshopt_compression"]}"#;
        let padded = (json.len() + 3) & !3;
        let mut glb = Vec::new();
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&((20 + padded) as u32).to_le_bytes());
        glb.extend_from_slice(&(padded as u32).to_le_bytes());
        glb.extend_from_slice(&GLB_JSON_CHUNK.to_le_bytes());
        glb.extend_from_slice(json);
        glb.resize(20 + padded, b' ');

        let out = strip_required_extensions(&glb).unwrap();
        let length = u32::from_le_bytes([out[8], out[9], out[10], out[11]]) as usize;
        assert_eq!(length, out.len());
        assert_eq!(length % 4, 0);
        assert!(!String::from_utf8_lossy(&out).contains("extensionsRequired"));
    }
}
