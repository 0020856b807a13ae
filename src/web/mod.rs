//! Web bindings for the viewer.
//!
//! Documents are requested from the page's origin with [`XhrFetcher`]. The
//! page can also hand bytes over with [`WebViewer::put_asset`]. Notifications
//! come back as JSON.

mod fetch;

pub use fetch::XhrFetcher;

use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::core::ViewerEvent;
use crate::device::{DeviceType, StaticProbe};
use crate::profile::ProfileSelection;
use crate::viewer::Viewer;

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Viewer handle exposed to JavaScript.
#[wasm_bindgen]
pub struct WebViewer {
    viewer: Viewer<XhrFetcher>,
}

#[wasm_bindgen]
impl WebViewer {
    /// Create a viewer fetching documents relative to `base_url`.
    ///
    /// An empty base resolves against the page itself.
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: &str) -> WebViewer {
        Self {
            viewer: Viewer::new(XhrFetcher::new(base_url)),
        }
    }

    /// Serve `bytes` for `path` instead of requesting it.
    #[wasm_bindgen]
    pub fn put_asset(&mut self, path: &str, bytes: Vec<u8>) {
        self.viewer.fetcher_mut().insert(path, bytes);
    }

    /// Start the viewer. `fps` is the frame rate measured by the page, if any.
    #[wasm_bindgen]
    pub fn start(&mut self, has_gpu: bool, fps: Option<f32>) -> Result<(), JsValue> {
        let user_agent = window()
            .and_then(|w| w.navigator().user_agent().ok())
            .unwrap_or_default();
        let mut probe = StaticProbe::new().with_device_type(DeviceType::from_user_agent(&user_agent));
        if has_gpu {
            probe = probe.with_gpu("webgl");
        }
        if let Some(fps) = fps {
            probe = probe.with_frame_rate(fps);
        }
        self.viewer.start(&probe).map_err(to_js)
    }

    /// Switch to a named profile pair.
    #[wasm_bindgen]
    pub fn select_profiles(&mut self, performance: &str, scene: &str) -> Result<bool, JsValue> {
        self.viewer
            .select_profiles(&ProfileSelection::new(performance, scene))
            .map_err(to_js)
    }

    /// Load the model at `path`.
    #[wasm_bindgen]
    pub fn load_model(&mut self, path: &str) -> Result<(), JsValue> {
        self.viewer.load_model(path).map_err(to_js)
    }

    /// Load a model file picked by the user.
    #[wasm_bindgen]
    pub fn load_model_file(&mut self, file_name: &str, data: &[u8]) -> Result<(), JsValue> {
        self.viewer.load_model_file(file_name, data).map_err(to_js)
    }

    /// Route a JSON-encoded request.
    #[wasm_bindgen]
    pub fn handle(&mut self, event_json: &str) -> Result<(), JsValue> {
        let event: ViewerEvent = serde_json::from_str(event_json).map_err(to_js)?;
        self.viewer.handle(event);
        Ok(())
    }

    /// Take pending notifications as a JSON array.
    #[wasm_bindgen]
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.viewer.drain_events()).map_err(to_js)
    }

    /// Id of the displayed model.
    #[wasm_bindgen]
    pub fn active_model_id(&self) -> Option<String> {
        self.viewer.active_model_id().map(str::to_string)
    }

    /// Handle mouse drag for camera rotation.
    #[wasm_bindgen]
    pub fn on_mouse_drag(&mut self, delta_x: f32, delta_y: f32) {
        let controls = self.viewer.context_mut().controls_mut();
        controls.rotate(delta_x * 0.01, delta_y * 0.01);
    }

    /// Handle mouse wheel for zooming.
    #[wasm_bindgen]
    pub fn on_mouse_wheel(&mut self, delta: f32) {
        self.viewer.context_mut().controls_mut().zoom(delta * 0.01);
    }

    /// Advance the controls by one frame.
    #[wasm_bindgen]
    pub fn update(&mut self) {
        self.viewer.context_mut().update_controls();
    }

    /// Resize the viewport.
    #[wasm_bindgen]
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.viewer
                .context_mut()
                .camera_mut()
                .set_aspect(width as f32 / height as f32);
        }
    }

    /// Toggle scene lights.
    #[wasm_bindgen]
    pub fn toggle_lighting(&mut self) -> bool {
        self.viewer.toggle_lighting()
    }

    /// Restore the profile camera.
    #[wasm_bindgen]
    pub fn reset_view(&mut self) {
        self.viewer.reset_view();
    }
}

impl Default for WebViewer {
    fn default() -> Self {
        Self::new("")
    }
}
