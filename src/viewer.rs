//! Viewer: startup orchestration and request routing.
//!
//! The [`Viewer`] owns the [`AppContext`] and every component that mutates
//! it. UI layers talk to it with [`ViewerEvent`]s and read results back with
//! [`Viewer::drain_events`].

use crate::core::{AppContext, ViewerConfig, ViewerEvent};
use crate::device::{detect, AutostartConfig, DeviceProbe, DeviceReport};
use crate::light::LightManager;
use crate::loaders::Fetcher;
use crate::model::{ModelError, ModelIndex, ModelManager};
use crate::profile::{
    ProfileError, ProfileIndex, ProfileLoader, ProfilePair, ProfileSelection, ValidationReport,
};
use crate::scene::{SceneBuilder, SceneError};
use crate::texture::FetchCubeTextureLoader;
use thiserror::Error;

/// Errors that can occur while driving the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The default profiles could not be loaded; nothing can be shown.
    #[error("Startup failed: {0}")]
    Startup(#[source] ProfileError),

    /// A profile could not be loaded.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// The scene could not be configured.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// A model operation failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// The viewer core.
pub struct Viewer<F: Fetcher> {
    config: ViewerConfig,
    profiles: ProfileLoader<F>,
    ctx: AppContext,
    lights: LightManager,
    builder: SceneBuilder,
    models: ModelManager,
    profile_index: Option<(ProfileIndex, ValidationReport)>,
    model_index: ModelIndex,
    device: Option<DeviceReport>,
    autostart: AutostartConfig,
    active_model: Option<String>,
}

impl<F: Fetcher> Viewer<F> {
    /// Create a viewer with default document locations.
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, ViewerConfig::default())
    }

    /// Create a viewer with explicit document locations.
    pub fn with_config(fetcher: F, config: ViewerConfig) -> Self {
        Self {
            profiles: ProfileLoader::with_paths(fetcher, config.profiles.clone()),
            config,
            ctx: AppContext::new(),
            lights: LightManager::new(),
            builder: SceneBuilder::new(),
            models: ModelManager::new(),
            profile_index: None,
            model_index: ModelIndex::new(),
            device: None,
            autostart: AutostartConfig::default(),
            active_model: None,
        }
    }

    /// Bring the viewer up: detect the device, load profiles, configure the
    /// scene and show the default model.
    ///
    /// Only a failure to load the default profiles is fatal.
    pub fn start(&mut self, probe: &dyn DeviceProbe) -> Result<(), ViewerError> {
        let fetcher = self.profiles.fetcher();
        let autostart = AutostartConfig::load(fetcher, &self.config.autostart_path);
        let report = detect(probe, autostart.as_ref().unwrap_or(&self.autostart));

        match self.profiles.load_profile_index() {
            Ok(index) => self.profile_index = Some(index),
            Err(e) => log::error!("{}", e),
        }

        let pair = match &autostart {
            Some(autostart) => {
                let selection = report.selection(autostart);
                match self.profiles.load_named_profiles(&selection) {
                    Ok(pair) => Some(pair),
                    Err(e) => {
                        log::warn!(
                            "Startup profiles {} / {} unavailable, using defaults: {}",
                            selection.performance_profile,
                            selection.scene_profile,
                            e
                        );
                        None
                    }
                }
            }
            None => None,
        };
        let pair = match pair {
            Some(pair) => pair,
            None => self
                .profiles
                .load_default_profiles()
                .map_err(ViewerError::Startup)?,
        };

        if let Some(autostart) = autostart {
            self.autostart = autostart;
        }
        self.device = Some(report);
        self.apply_profiles(&pair)?;

        let fetcher = self.profiles.fetcher();
        match ModelIndex::load(fetcher, &self.config.model_index) {
            Ok(index) => self.model_index = index,
            Err(e) => {
                log::error!("{}", e);
                self.ctx.emit(ViewerEvent::error(e.to_string()));
            }
        }

        let default_path = self.model_index.default_model().and_then(|id| {
            self.model_index
                .load_path(&self.config.models_root, id)
                .or_else(|| {
                    log::warn!("Default model {} is not in the index", id);
                    None
                })
        });
        if let Some(path) = default_path {
            // Failures are already reported as ModelLoadError.
            let _ = self.load_model(&path);
        }
        Ok(())
    }

    /// Route a request from the UI.
    pub fn handle(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::ModelLoadRequested { path, .. } => {
                let _ = self.load_model(&path);
            }
            ViewerEvent::ProfilesSelected {
                performance_profile,
                scene_profile,
            } => {
                let selection = ProfileSelection::new(performance_profile, scene_profile);
                let _ = self.select_profiles(&selection);
            }
            other => log::debug!("Ignoring outbound event {:?}", other),
        }
    }

    /// Load and apply a named profile pair.
    ///
    /// On failure an `Error` event is emitted and the previous profiles stay in effect.
    pub fn select_profiles(&mut self, selection: &ProfileSelection) -> Result<bool, ViewerError> {
        let result = self
            .profiles
            .load_named_profiles(selection)
            .map_err(ViewerError::from)
            .and_then(|pair| self.apply_profiles(&pair));
        match result {
            Ok(changed) => {
                self.ctx.emit(ViewerEvent::SceneUpdated {
                    performance_profile: selection.performance_profile.clone(),
                    scene_profile: selection.scene_profile.clone(),
                });
                Ok(changed)
            }
            Err(e) => {
                log::error!("Failed to switch profiles: {}", e);
                self.ctx.emit(ViewerEvent::error(e.to_string()));
                Err(e)
            }
        }
    }

    fn apply_profiles(&mut self, pair: &ProfilePair) -> Result<bool, ViewerError> {
        let mut textures = FetchCubeTextureLoader::new(self.profiles.fetcher());
        let changed = self.builder.configure_scene(
            &mut self.ctx,
            &mut self.lights,
            Some(&pair.performance),
            Some(&pair.scene),
            &mut textures,
        )?;
        Ok(changed)
    }

    /// Load a model, replacing the current one.
    pub fn load_model(&mut self, path: &str) -> Result<(), ViewerError> {
        let result = self
            .models
            .load_model_from_path(&mut self.ctx, self.profiles.fetcher(), path);
        self.active_model = self.models.current_id().map(str::to_string);
        result?;
        Ok(())
    }

    /// Load a model from a file picked by the user.
    pub fn load_model_file(&mut self, file_name: &str, data: &[u8]) -> Result<(), ViewerError> {
        let result = self.models.load_model_from_bytes(
            &mut self.ctx,
            self.profiles.fetcher(),
            file_name,
            data,
        );
        self.active_model = self.models.current_id().map(str::to_string);
        result?;
        Ok(())
    }

    /// Put the camera back where the active scene profile places it.
    pub fn reset_view(&mut self) {
        let camera = self
            .builder
            .active_profiles()
            .and_then(|pair| pair.scene.cameras.default.clone());
        if let Some(camera) = camera {
            self.ctx.camera_mut().apply_profile(&camera);
        }
        let target = self.ctx.camera().target;
        let controls = self.ctx.controls_mut();
        controls.reset();
        controls.target = target;
    }

    /// Toggle every managed light. Returns the new state of the first light.
    pub fn toggle_lighting(&mut self) -> bool {
        self.lights.toggle_light_visibility(self.ctx.scene_mut())
    }

    /// Toggle light helpers.
    pub fn toggle_light_helpers(&mut self) -> bool {
        self.lights.toggle_helpers_visibility(self.ctx.scene_mut())
    }

    /// Toggle the floor plane. Returns `None` when the scene profile has no floor.
    pub fn toggle_floor(&mut self) -> Option<bool> {
        let floor = self.ctx.scene_mut().get_mut(self.builder.floor()?)?;
        floor.set_visible(!floor.is_visible());
        Some(floor.is_visible())
    }

    /// Toggle the grid.
    pub fn toggle_grid(&mut self) -> Option<bool> {
        let grid = self.ctx.scene_mut().get_mut(self.builder.grid()?)?;
        grid.set_visible(!grid.is_visible());
        Some(grid.is_visible())
    }

    /// Take all pending notifications.
    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        self.ctx.drain_events()
    }

    /// Id of the model loaded last, if it is still displayed.
    #[inline]
    pub fn active_model_id(&self) -> Option<&str> {
        self.active_model.as_deref()
    }

    /// Get the application context.
    #[inline]
    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Get the application context mutably.
    #[inline]
    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    /// Get the light manager.
    #[inline]
    pub fn lights(&self) -> &LightManager {
        &self.lights
    }

    /// Get the scene builder.
    #[inline]
    pub fn builder(&self) -> &SceneBuilder {
        &self.builder
    }

    /// Get the model manager.
    #[inline]
    pub fn models(&self) -> &ModelManager {
        &self.models
    }

    /// The model catalogue.
    #[inline]
    pub fn model_index(&self) -> &ModelIndex {
        &self.model_index
    }

    /// The profile index and its validation report, if it loaded.
    pub fn profile_index(&self) -> Option<&(ProfileIndex, ValidationReport)> {
        self.profile_index.as_ref()
    }

    /// Result of startup device detection.
    #[inline]
    pub fn device(&self) -> Option<&DeviceReport> {
        self.device.as_ref()
    }

    /// Startup configuration in effect.
    #[inline]
    pub fn autostart(&self) -> &AutostartConfig {
        &self.autostart
    }

    /// Get the fetcher.
    #[inline]
    pub fn fetcher(&self) -> &F {
        self.profiles.fetcher()
    }

    /// Get the fetcher mutably, for example to register uploaded assets.
    #[inline]
    pub fn fetcher_mut(&mut self) -> &mut F {
        self.profiles.fetcher_mut()
    }
}
