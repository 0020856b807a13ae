//! Model lifecycle: load, place, track and tear down the displayed model.

use super::ModelConfig;
use crate::core::{AppContext, NodeId, ViewerEvent};
use crate::loaders::{parent_dir, FetchError, Fetcher, GltfLoader, LoadError, LoadedModel};
use crate::material::StandardMaterial;
use crate::scene::NodeTree;
use std::collections::BTreeMap;
use thiserror::Error;

/// File extensions accepted for models.
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".gltf", ".glb"];

/// Errors that can occur while managing models.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No path was given.
    #[error("Model path is empty")]
    EmptyPath,

    /// The path ends in a directory.
    #[error("Invalid model file name in {0}")]
    InvalidFileName(String),

    /// The file is not glTF or GLB.
    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),

    /// The asset could not be loaded.
    #[error("Failed to load model {path}: {source}")]
    Load {
        /// Requested path.
        path: String,
        /// Loader error.
        #[source]
        source: LoadError,
    },

    /// No tracked model has this id.
    #[error("Model {0} doesn't exist")]
    NotFound(String),

    /// The model index could not be fetched.
    #[error("Failed to fetch model index: {0}")]
    IndexFetch(#[source] FetchError),

    /// The model index is not valid JSON.
    #[error("Failed to parse model index: {0}")]
    IndexParse(#[source] serde_json::Error),
}

/// Where the model manager is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelState {
    /// Nothing displayed.
    #[default]
    Empty,
    /// A load is in progress.
    Loading(String),
    /// A model is displayed.
    Loaded(String),
}

/// A model inserted into the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedModel {
    /// Root node in the scene.
    pub node: NodeId,
    /// Source path or file name.
    pub path: String,
    /// Animation clip names.
    pub animations: Vec<String>,
    /// Size statistics.
    pub info: super::ModelInfo,
}

/// Owns the displayed model. Loading a model always tears down the previous one first.
#[derive(Debug, Default)]
pub struct ModelManager {
    models: BTreeMap<String, TrackedModel>,
    current: Option<String>,
    state: ModelState,
    last_error: Option<String>,
}

impl ModelManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the model at `path`, replacing whatever is displayed.
    ///
    /// The model id is the name of the folder holding the file. A
    /// `config.json` next to the file is applied when present.
    pub fn load_model_from_path(
        &mut self,
        ctx: &mut AppContext,
        fetcher: &dyn Fetcher,
        path: &str,
    ) -> Result<NodeId, ModelError> {
        self.begin(ctx, path);
        let result = load_from_path(fetcher, path);
        self.finish(ctx, path, result)
    }

    /// Load a model from raw file contents, such as a file picked by the user.
    ///
    /// External buffers are resolved relative to the fetcher root. No sidecar is applied.
    pub fn load_model_from_bytes(
        &mut self,
        ctx: &mut AppContext,
        fetcher: &dyn Fetcher,
        file_name: &str,
        data: &[u8],
    ) -> Result<NodeId, ModelError> {
        self.begin(ctx, file_name);
        let result = check_extension(file_name).and_then(|stem| {
            let loaded = GltfLoader::new(fetcher)
                .load_from_bytes(data, "")
                .map_err(|source| ModelError::Load {
                    path: file_name.to_string(),
                    source,
                })?;
            Ok((stem.to_string(), loaded, None))
        });
        self.finish(ctx, file_name, result)
    }

    fn begin(&mut self, ctx: &mut AppContext, path: &str) {
        log::info!("Loading model {}", path);
        ctx.scene_mut().reset_scale();
        self.clear_all_models(ctx);
        self.state = ModelState::Loading(path.to_string());
    }

    fn finish(
        &mut self,
        ctx: &mut AppContext,
        path: &str,
        result: Result<(String, LoadedModel, Option<ModelConfig>), ModelError>,
    ) -> Result<NodeId, ModelError> {
        match result {
            Ok((id, loaded, config)) => {
                let node = self.add_model_to_scene(ctx, &id, path, loaded, config.as_ref());
                Ok(node)
            }
            Err(e) => {
                log::error!("Failed to load model {}: {}", path, e);
                self.state = ModelState::Empty;
                self.last_error = Some(e.to_string());
                ctx.emit(ViewerEvent::ModelLoadError {
                    error: e.to_string(),
                    path: path.to_string(),
                });
                Err(e)
            }
        }
    }

    fn add_model_to_scene(
        &mut self,
        ctx: &mut AppContext,
        id: &str,
        path: &str,
        loaded: LoadedModel,
        config: Option<&ModelConfig>,
    ) -> NodeId {
        let LoadedModel {
            mut root,
            animations,
            info,
        } = loaded;

        root.node.set_name(id);
        root.node.set_tag(id);
        if let Some(config) = config {
            config.apply_to(&mut root);
        }
        normalize_materials(&mut root);

        let node = ctx.scene_mut().add_tree(None, root);
        self.models.insert(
            id.to_string(),
            TrackedModel {
                node,
                path: path.to_string(),
                animations: animations.clone(),
                info,
            },
        );
        self.current = Some(id.to_string());
        self.state = ModelState::Loaded(id.to_string());
        self.last_error = None;

        log::info!("Model {} loaded ({} triangles)", id, info.triangles);
        ctx.emit(ViewerEvent::ModelLoaded {
            node,
            animations,
            uuid: id.to_string(),
            path: path.to_string(),
        });
        node
    }

    /// Remove a tracked model from the scene.
    pub fn remove_model(&mut self, ctx: &mut AppContext, id: &str) -> Result<(), ModelError> {
        let model = self
            .models
            .remove(id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))?;
        ctx.scene_mut().remove(model.node);
        if self.current.as_deref() == Some(id) {
            self.current = None;
            self.state = ModelState::Empty;
        }
        Ok(())
    }

    /// Remove every tracked model from the scene. Lights and helpers are untouched.
    pub fn clear_all_models(&mut self, ctx: &mut AppContext) {
        for (id, model) in std::mem::take(&mut self.models) {
            log::debug!("Removing model {}", id);
            ctx.scene_mut().remove(model.node);
        }
        self.current = None;
        self.state = ModelState::Empty;
    }

    /// The displayed model.
    pub fn current_model(&self) -> Option<&TrackedModel> {
        self.current.as_ref().and_then(|id| self.models.get(id))
    }

    /// Id of the displayed model.
    #[inline]
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// All tracked models by id.
    #[inline]
    pub fn models(&self) -> &BTreeMap<String, TrackedModel> {
        &self.models
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> &ModelState {
        &self.state
    }

    /// Message of the most recent failed load, cleared by the next success.
    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

fn load_from_path(
    fetcher: &dyn Fetcher,
    path: &str,
) -> Result<(String, LoadedModel, Option<ModelConfig>), ModelError> {
    if path.is_empty() {
        return Err(ModelError::EmptyPath);
    }
    let dir = parent_dir(path);
    if path.len() == dir.len() {
        return Err(ModelError::InvalidFileName(path.to_string()));
    }
    let id = dir
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(&path[dir.len()..])
        .to_string();

    let config = load_config(fetcher, dir);
    let loaded = GltfLoader::new(fetcher)
        .load(path)
        .map_err(|source| ModelError::Load {
            path: path.to_string(),
            source,
        })?;
    Ok((id, loaded, config))
}

/// Check the extension and return the file stem.
fn check_extension(file_name: &str) -> Result<&str, ModelError> {
    let lower = file_name.to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map(|ext| &file_name[..file_name.len() - ext.len()])
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| ModelError::UnsupportedFormat(file_name.to_string()))
}

fn load_config(fetcher: &dyn Fetcher, dir: &str) -> Option<ModelConfig> {
    let path = format!("{dir}config.json");
    let bytes = match fetcher.fetch(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("No model config: {}", e);
            return None;
        }
    };
    match ModelConfig::from_slice(&bytes) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Ignoring malformed {}: {}", path, e);
            None
        }
    }
}

fn normalize_materials(root: &mut NodeTree) {
    root.for_each_mut(&mut |node| {
        let name = node.name().to_string();
        let Some(mesh) = node.kind_mut().as_mesh_mut() else {
            return;
        };
        for primitive in &mut mesh.primitives {
            let material = primitive.material.get_or_insert_with(StandardMaterial::new);
            let cleared = material.cap_textures();
            if !cleared.is_empty() {
                log::warn!(
                    "Mesh {} binds more than {} textures, dropped {:?}",
                    name,
                    StandardMaterial::MAX_TEXTURES,
                    cleared
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::fixtures::triangle_gltf;
    use crate::loaders::MemoryFetcher;
    use crate::math::Vec3;
    use serde_json::json;

    fn fetcher() -> MemoryFetcher {
        let mut fetcher = MemoryFetcher::new();
        fetcher.insert("models/statue/lada.gltf", triangle_gltf(-1.0, None));
        fetcher.insert_json(
            "models/statue/config.json",
            &json!({ "position": { "method": "floor", "value": 0, "yOffset": 2 } }),
        );
        fetcher.insert("models/bench/bench.gltf", triangle_gltf(0.0, None));
        fetcher
    }

    #[test]
    fn test_load_applies_config() {
        let fetcher = fetcher();
        let mut ctx = AppContext::new();
        let mut models = ModelManager::new();

        let node = models
            .load_model_from_path(&mut ctx, &fetcher, "models/statue/lada.gltf")
            .unwrap();
        let root = ctx.scene().get(node).unwrap();
        assert_eq!(root.name(), "statue");
        assert_eq!(root.transform.position, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(models.state(), &ModelState::Loaded("statue".into()));
        assert_eq!(models.current_model().unwrap().node, node);

        let events = ctx.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ViewerEvent::ModelLoaded { uuid, path, .. } if uuid == "statue" && path == "models/statue/lada.gltf"
        ));
    }

    #[test]
    fn test_missing_config_is_not_an_error() {
        let fetcher = fetcher();
        let mut ctx = AppContext::new();
        let mut models = ModelManager::new();
        let node = models
            .load_model_from_path(&mut ctx, &fetcher, "models/bench/bench.gltf")
            .unwrap();
        assert_eq!(ctx.scene().get(node).unwrap().transform.position, Vec3::ZERO);
        assert_eq!(fetcher.request_count("models/bench/config.json"), 1);
    }

    #[test]
    fn test_materials_are_normalized() {
        let fetcher = fetcher();
        let mut ctx = AppContext::new();
        let mut models = ModelManager::new();
        let node = models
            .load_model_from_path(&mut ctx, &fetcher, "models/bench/bench.gltf")
            .unwrap();
        let body = ctx.scene().get(node).unwrap().children()[0];
        let mesh = ctx.scene().get(body).unwrap().kind().as_mesh().unwrap();
        assert_eq!(mesh.primitives[0].material, Some(StandardMaterial::new()));
    }

    #[test]
    fn test_loading_replaces_previous_model() {
        let fetcher = fetcher();
        let mut ctx = AppContext::new();
        let mut models = ModelManager::new();
        let first = models
            .load_model_from_path(&mut ctx, &fetcher, "models/statue/lada.gltf")
            .unwrap();
        ctx.scene_mut().set_scale(Vec3::splat(3.0));
        let second = models
            .load_model_from_path(&mut ctx, &fetcher, "models/bench/bench.gltf")
            .unwrap();

        assert!(!ctx.scene().contains(first));
        assert!(ctx.scene().contains(second));
        assert_eq!(models.models().len(), 1);
        assert_eq!(ctx.scene().scale(), Vec3::ONE);
        assert_eq!(ctx.scene().len(), 2);
    }

    #[test]
    fn test_failed_load_leaves_no_model() {
        let fetcher = fetcher();
        let mut ctx = AppContext::new();
        let mut models = ModelManager::new();
        models
            .load_model_from_path(&mut ctx, &fetcher, "models/statue/lada.gltf")
            .unwrap();
        ctx.drain_events();

        let err = models
            .load_model_from_path(&mut ctx, &fetcher, "models/ghost/ghost.gltf")
            .unwrap_err();
        assert!(matches!(err, ModelError::Load { .. }));
        assert!(models.current_model().is_none());
        assert!(ctx.scene().is_empty());
        assert_eq!(models.state(), &ModelState::Empty);
        assert!(models.last_error().unwrap().contains("models/ghost/ghost.gltf"));

        let events = ctx.drain_events();
        assert!(matches!(
            &events[..],
            [ViewerEvent::ModelLoadError { path, .. }] if path == "models/ghost/ghost.gltf"
        ));
    }

    #[test]
    fn test_path_validation() {
        let fetcher = fetcher();
        let mut ctx = AppContext::new();
        let mut models = ModelManager::new();
        assert!(matches!(
            models.load_model_from_path(&mut ctx, &fetcher, ""),
            Err(ModelError::EmptyPath)
        ));
        assert!(matches!(
            models.load_model_from_path(&mut ctx, &fetcher, "models/statue/"),
            Err(ModelError::InvalidFileName(_))
        ));
    }

    #[test]
    fn test_load_from_bytes_checks_extension() {
        let fetcher = MemoryFetcher::new();
        let mut ctx = AppContext::new();
        let mut models = ModelManager::new();
        assert!(matches!(
            models.load_model_from_bytes(&mut ctx, &fetcher, "scene.obj", b""),
            Err(ModelError::UnsupportedFormat(_))
        ));
        models
            .load_model_from_bytes(&mut ctx, &fetcher, "Chair.GLTF", &triangle_gltf(0.0, None))
            .unwrap();
        assert_eq!(models.current_id(), Some("Chair"));
    }

    #[test]
    fn test_remove_model() {
        let fetcher = fetcher();
        let mut ctx = AppContext::new();
        let mut models = ModelManager::new();
        models
            .load_model_from_path(&mut ctx, &fetcher, "models/statue/lada.gltf")
            .unwrap();
        assert!(matches!(
            models.remove_model(&mut ctx, "bench"),
            Err(ModelError::NotFound(_))
        ));
        models.remove_model(&mut ctx, "statue").unwrap();
        assert!(ctx.scene().is_empty());
        assert_eq!(models.state(), &ModelState::Empty);
    }
}
