//! Application context shared by the viewer components.

use super::{EventQueue, Renderer, ViewerEvent};
use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::postprocessing::EffectChain;
use crate::scene::Scene;

/// Everything the viewer components read and mutate.
///
/// Components receive `&mut AppContext` for each operation instead of
/// reaching for process-wide state.
#[derive(Debug, Default)]
pub struct AppContext {
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    renderer: Renderer,
    effects: EffectChain,
    events: EventQueue,
}

impl AppContext {
    /// Create a context with an empty scene and default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the scene.
    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Get the scene mutably.
    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Replace the scene.
    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    /// Get the camera.
    #[inline]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Get the camera mutably.
    #[inline]
    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    /// Replace the camera.
    pub fn set_camera(&mut self, camera: PerspectiveCamera) {
        self.camera = camera;
    }

    /// Get the orbit controls.
    #[inline]
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Get the orbit controls mutably.
    #[inline]
    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Get the renderer settings.
    #[inline]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Get the renderer settings mutably.
    #[inline]
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Get the effect chain.
    #[inline]
    pub fn effects(&self) -> &EffectChain {
        &self.effects
    }

    /// Get the effect chain mutably.
    #[inline]
    pub fn effects_mut(&mut self) -> &mut EffectChain {
        &mut self.effects
    }

    /// Queue a notification for the UI.
    pub fn emit(&mut self, event: ViewerEvent) {
        self.events.push(event);
    }

    /// Get the notification queue.
    #[inline]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Take all queued notifications.
    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        self.events.drain()
    }

    /// Advance the orbit controls and camera by one frame.
    pub fn update_controls(&mut self) {
        self.controls.update(&mut self.camera);
    }
}
