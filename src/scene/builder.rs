//! Applies a performance and scene profile pair to the application context.

use super::{Node, NodeId, NodeKind, Scene};
use crate::core::{AppContext, ColorSpace, EnumFallback, ViewerEvent};
use crate::helpers::{FloorPlane, GridHelper, Helper};
use crate::light::LightManager;
use crate::loaders::FetchError;
use crate::math::{Color, Vec3};
use crate::profile::{
    resolve_color, EnvironmentProfile, FloorProfile, GridProfile, PerformanceProfile, ProfilePair,
    SceneProfile,
};
use crate::texture::{CubeFace, CubeTexture, CubeTextureLoader, CubeTextureSource};
use thiserror::Error;

/// Errors that can occur while configuring the scene.
#[derive(Error, Debug)]
pub enum SceneError {
    /// One of the two profiles was not supplied.
    #[error("Both a performance profile and a scene profile are required")]
    MissingProfile,

    /// The environment cubemap could not be fetched.
    #[error("Failed to load environment textures: {0}")]
    EnvironmentLoad(#[source] FetchError),
}

/// Proof that an environment load was started for a given configuration.
///
/// Results carrying a ticket from an older configuration are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentTicket {
    generation: u64,
}

impl EnvironmentTicket {
    /// Configuration generation the ticket belongs to.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

const DEFAULT_FLOOR_SIZE: f32 = 125.0;
const DEFAULT_GRID_SIZE: f32 = 125.0;
const DEFAULT_GRID_DIVISIONS: u32 = 25;

/// Configures renderer, environment, lights, effects, camera and controls
/// from a profile pair.
#[derive(Debug, Default)]
pub struct SceneBuilder {
    generation: u64,
    active: Option<ProfilePair>,
    floor: Option<NodeId>,
    grid: Option<NodeId>,
}

impl SceneBuilder {
    /// Create an unconfigured builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a profile pair.
    ///
    /// Returns `Ok(false)` without touching anything when the pair is already
    /// active. Environment fetch failures are reported on the event queue and
    /// do not fail the call.
    pub fn configure_scene(
        &mut self,
        ctx: &mut AppContext,
        lights: &mut LightManager,
        performance: Option<&PerformanceProfile>,
        scene: Option<&SceneProfile>,
        textures: &mut dyn CubeTextureLoader,
    ) -> Result<bool, SceneError> {
        let (Some(performance), Some(scene)) = (performance, scene) else {
            return Err(SceneError::MissingProfile);
        };

        if self.active_ids() == Some((performance.id.as_str(), scene.id.as_str())) {
            log::info!(
                "Profiles {} / {} already active, skipping configuration",
                performance.id,
                scene.id
            );
            return Ok(false);
        }

        self.generation += 1;
        log::info!(
            "Configuring scene from profiles {} / {}",
            performance.id,
            scene.id
        );

        // Renderer
        let renderer = ctx.renderer_mut();
        renderer.configure(&performance.renderer);
        renderer.set_profile_id(performance.id.clone());

        // Background
        let background = scene
            .background
            .color
            .as_ref()
            .map(|c| resolve_color(Some(c), "background"));
        ctx.scene_mut().set_background(background);
        if let Some(color) = background {
            ctx.renderer_mut().set_clear_color(color);
        }

        // Environment
        if scene.environment.enabled {
            let (source, _) = environment_source(&scene.environment);
            let ticket = self.begin_environment_load();
            let result = textures.load(&source);
            if let Err(e) = self.finish_environment_load(ctx, ticket, result) {
                log::error!("{}", e);
                ctx.emit(ViewerEvent::error(e.to_string()));
            }
        }

        // Lights
        lights.init_from_profile(ctx.scene_mut(), scene);

        // Effects
        ctx.effects_mut().rebuild(&scene.postprocessing);

        // Camera
        if let Some(camera) = &scene.cameras.default {
            ctx.camera_mut().apply_profile(camera);
        }

        // Controls
        if let Some(controls) = &scene.controls {
            ctx.controls_mut().apply_profile(controls);
            let target = ctx.camera().target;
            ctx.controls_mut().target = target;
        }

        // Floor and grid
        self.rebuild_floor(ctx.scene_mut(), scene.floor.as_ref());
        self.rebuild_grid(ctx.scene_mut(), scene.grid.as_ref());

        self.active = Some(ProfilePair {
            performance: performance.clone(),
            scene: scene.clone(),
        });
        log::info!("Scene configured from profiles");
        Ok(true)
    }

    /// Start an environment load for the current configuration.
    pub fn begin_environment_load(&self) -> EnvironmentTicket {
        EnvironmentTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of an environment load.
    ///
    /// Returns `Ok(false)` when the ticket is stale and the result was dropped.
    /// A failed load leaves the previous environment in place.
    pub fn finish_environment_load(
        &self,
        ctx: &mut AppContext,
        ticket: EnvironmentTicket,
        result: Result<CubeTexture, FetchError>,
    ) -> Result<bool, SceneError> {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding environment from configuration {} (current {})",
                ticket.generation,
                self.generation
            );
            return Ok(false);
        }
        let texture = result.map_err(SceneError::EnvironmentLoad)?;
        log::info!("Environment loaded from {}", texture.source.path);
        ctx.scene_mut().set_environment(Some(texture));
        Ok(true)
    }

    /// Ids of the active performance and scene profiles.
    pub fn active_ids(&self) -> Option<(&str, &str)> {
        self.active
            .as_ref()
            .map(|p| (p.performance.id.as_str(), p.scene.id.as_str()))
    }

    /// The active profile pair.
    #[inline]
    pub fn active_profiles(&self) -> Option<&ProfilePair> {
        self.active.as_ref()
    }

    /// Current configuration generation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Floor node, if the active scene profile has one.
    #[inline]
    pub fn floor(&self) -> Option<NodeId> {
        self.floor
    }

    /// Grid node.
    #[inline]
    pub fn grid(&self) -> Option<NodeId> {
        self.grid
    }

    /// Forget the active pair so the next call reapplies it.
    pub fn invalidate(&mut self) {
        self.active = None;
    }

    fn rebuild_floor(&mut self, scene: &mut Scene, profile: Option<&FloorProfile>) {
        if let Some(id) = self.floor.take() {
            scene.remove(id);
        }
        let Some(profile) = profile else {
            return;
        };
        let color = profile
            .color
            .as_ref()
            .map_or(Color::from_hex(0x808080), |c| resolve_color(Some(c), "floor"));
        let floor = FloorPlane::new(profile.size.unwrap_or(DEFAULT_FLOOR_SIZE), color);
        self.floor = Some(scene.add(
            Node::new("floor", NodeKind::Helper(Helper::Floor(floor))).with_visible(profile.visible),
        ));
    }

    fn rebuild_grid(&mut self, scene: &mut Scene, profile: Option<&GridProfile>) {
        if let Some(id) = self.grid.take() {
            scene.remove(id);
        }
        let (size, divisions, visible) = profile.map_or(
            (DEFAULT_GRID_SIZE, DEFAULT_GRID_DIVISIONS, false),
            |g| {
                (
                    g.size.unwrap_or(DEFAULT_GRID_SIZE),
                    g.divisions.unwrap_or(DEFAULT_GRID_DIVISIONS),
                    g.visible,
                )
            },
        );
        let grid = GridHelper::simple(size, divisions);
        self.grid = Some(scene.add(
            Node::new("grid", NodeKind::Helper(Helper::Grid(grid)))
                .with_position(Vec3::ZERO)
                .with_visible(visible),
        ));
    }
}

/// Cubemap source described by an environment block.
///
/// A face list that does not name exactly six files is replaced by the default names.
pub fn environment_source(profile: &EnvironmentProfile) -> (CubeTextureSource, Vec<EnumFallback>) {
    let defaults = CubeTextureSource::default();
    let files = match profile.files.as_deref() {
        Some([px, nx, py, ny, pz, nz]) => {
            [px, nx, py, ny, pz, nz].map(|f| f.to_string())
        }
        Some(other) => {
            log::warn!(
                "Environment lists {} face files, expected {}; using defaults",
                other.len(),
                CubeFace::ALL.len()
            );
            defaults.files
        }
        None => defaults.files,
    };

    let mut fallbacks = Vec::new();
    let color_space = match &profile.color_space {
        Some(value) => crate::core::resolve(
            &mut fallbacks,
            "colorSpace",
            value,
            ColorSpace::parse,
            ColorSpace::FALLBACK,
            ColorSpace::FALLBACK.as_str(),
        ),
        None => ColorSpace::FALLBACK,
    };

    let source = CubeTextureSource {
        path: profile.path.clone().unwrap_or(defaults.path),
        files,
        color_space,
    };
    (source, fallbacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::MemoryFetcher;
    use crate::profile::schemas::fixtures;
    use crate::texture::FetchCubeTextureLoader;
    use serde_json::json;

    fn performance(id: &str) -> PerformanceProfile {
        serde_json::from_value(fixtures::performance(id)).unwrap()
    }

    fn scene(id: &str) -> SceneProfile {
        serde_json::from_value(fixtures::scene(id)).unwrap()
    }

    fn faces() -> MemoryFetcher {
        let mut fetcher = MemoryFetcher::new();
        let (source, _) = environment_source(&scene("s").environment);
        for path in source.face_paths() {
            fetcher.insert(path, vec![0xff, 0xd8]);
        }
        fetcher
    }

    fn light_nodes(lights: &LightManager) -> Vec<NodeId> {
        lights.lights().iter().map(|l| l.node).collect()
    }

    #[test]
    fn test_configure_scene() {
        let fetcher = faces();
        let mut ctx = AppContext::new();
        let mut lights = LightManager::new();
        let mut builder = SceneBuilder::new();

        let applied = builder
            .configure_scene(
                &mut ctx,
                &mut lights,
                Some(&performance("high")),
                Some(&scene("studio")),
                &mut FetchCubeTextureLoader::new(&fetcher),
            )
            .unwrap();

        assert!(applied);
        assert_eq!(builder.active_ids(), Some(("high", "studio")));
        assert_eq!(ctx.renderer().profile_id(), Some("high"));
        assert_eq!(ctx.scene().background(), Some(Color::from_hex(0x202020)));
        assert!(ctx.scene().environment().is_some());
        assert_eq!(lights.light_count(), 4);
        assert_eq!(ctx.effects().len(), 3);
        assert_eq!(ctx.camera().fov, 45.0);
        assert_eq!(ctx.controls().max_distance, 200.0);
        assert!(ctx.scene().get(builder.floor().unwrap()).unwrap().is_visible());
        assert!(!ctx.scene().get(builder.grid().unwrap()).unwrap().is_visible());
        assert!(ctx.drain_events().is_empty());
    }

    #[test]
    fn test_same_pair_twice_is_a_noop() {
        let fetcher = faces();
        let mut ctx = AppContext::new();
        let mut lights = LightManager::new();
        let mut builder = SceneBuilder::new();
        let (p, s) = (performance("high"), scene("studio"));

        builder
            .configure_scene(&mut ctx, &mut lights, Some(&p), Some(&s), &mut FetchCubeTextureLoader::new(&fetcher))
            .unwrap();
        let fetches = fetcher.total_requests();
        let nodes = light_nodes(&lights);
        assert_eq!(fetches, 6);

        let applied = builder
            .configure_scene(&mut ctx, &mut lights, Some(&p), Some(&s), &mut FetchCubeTextureLoader::new(&fetcher))
            .unwrap();
        assert!(!applied);
        assert_eq!(fetcher.total_requests(), fetches);
        assert_eq!(light_nodes(&lights), nodes);
    }

    #[test]
    fn test_new_pair_rebuilds_lights_once() {
        let fetcher = faces();
        let mut ctx = AppContext::new();
        let mut lights = LightManager::new();
        let mut builder = SceneBuilder::new();

        for id in ["studio", "outdoor"] {
            builder
                .configure_scene(
                    &mut ctx,
                    &mut lights,
                    Some(&performance("high")),
                    Some(&scene(id)),
                    &mut FetchCubeTextureLoader::new(&fetcher),
                )
                .unwrap();
        }
        assert_eq!(builder.active_ids(), Some(("high", "outdoor")));
        assert_eq!(ctx.scene().lights().count(), 4);
        assert_eq!(lights.light_count(), 4);
    }

    #[test]
    fn test_missing_profile() {
        let mut builder = SceneBuilder::new();
        let fetcher = MemoryFetcher::new();
        let result = builder.configure_scene(
            &mut AppContext::new(),
            &mut LightManager::new(),
            Some(&performance("high")),
            None,
            &mut FetchCubeTextureLoader::new(&fetcher),
        );
        assert!(matches!(result, Err(SceneError::MissingProfile)));
        assert_eq!(builder.active_ids(), None);
    }

    #[test]
    fn test_environment_failure_is_reported_and_keeps_previous() {
        let fetcher = faces();
        let mut ctx = AppContext::new();
        let mut lights = LightManager::new();
        let mut builder = SceneBuilder::new();
        builder
            .configure_scene(
                &mut ctx,
                &mut lights,
                Some(&performance("high")),
                Some(&scene("studio")),
                &mut FetchCubeTextureLoader::new(&fetcher),
            )
            .unwrap();

        let mut missing = fixtures::scene("night");
        missing["environment"]["path"] = json!("textures/night/");
        let missing: SceneProfile = serde_json::from_value(missing).unwrap();
        let applied = builder
            .configure_scene(
                &mut ctx,
                &mut lights,
                Some(&performance("high")),
                Some(&missing),
                &mut FetchCubeTextureLoader::new(&fetcher),
            )
            .unwrap();

        assert!(applied);
        assert_eq!(builder.active_ids(), Some(("high", "night")));
        assert_eq!(
            ctx.scene().environment().unwrap().source.path,
            "textures/studio/"
        );
        let events = ctx.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ViewerEvent::Error { message } if message.contains("textures/night/px.jpg")));
    }

    #[test]
    fn test_stale_environment_is_discarded() {
        let fetcher = faces();
        let mut ctx = AppContext::new();
        let mut lights = LightManager::new();
        let mut builder = SceneBuilder::new();
        let mut loader = FetchCubeTextureLoader::new(&fetcher);

        builder
            .configure_scene(&mut ctx, &mut lights, Some(&performance("high")), Some(&scene("a")), &mut loader)
            .unwrap();
        let stale = builder.begin_environment_load();
        let (source, _) = environment_source(&scene("a").environment);
        let late = loader.load(&source);

        let mut plain = fixtures::scene("b");
        plain["environment"]["enabled"] = json!(false);
        let plain: SceneProfile = serde_json::from_value(plain).unwrap();
        ctx.scene_mut().set_environment(None);
        builder
            .configure_scene(&mut ctx, &mut lights, Some(&performance("high")), Some(&plain), &mut loader)
            .unwrap();

        assert!(!builder.finish_environment_load(&mut ctx, stale, late).unwrap());
        assert!(ctx.scene().environment().is_none());

        let fresh = builder.begin_environment_load();
        assert!(builder
            .finish_environment_load(&mut ctx, fresh, loader.load(&source))
            .unwrap());
        assert!(ctx.scene().environment().is_some());
    }

    #[test]
    fn test_environment_source_defaults() {
        let (source, fallbacks) = environment_source(&EnvironmentProfile {
            enabled: true,
            files: Some(vec!["a.jpg".into()]),
            color_space: Some("SRGBColorSpace".into()),
            ..Default::default()
        });
        assert_eq!(source.path, "textures/");
        assert_eq!(source.files[0], "posx.jpg");
        assert_eq!(source.color_space, ColorSpace::Srgb);
        assert_eq!(fallbacks.len(), 1);
    }
}
