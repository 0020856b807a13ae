//! # Vitrine - Profile-Driven glTF Viewer Core
//!
//! Vitrine loads glTF/GLB models into a CPU-side scene graph and configures
//! the renderer, environment, lights, post-processing, camera and controls
//! from declarative JSON profiles. A host renderer consumes the result.
//!
//! ## Features
//!
//! - **Profile**: Schema validation and loading of performance and scene profiles
//! - **Scene**: Arena scene graph and the scene builder that applies profiles
//! - **Light**: Light manager owning every light node, with GPU uniform packing
//! - **Model**: Model index, placement sidecars and the model manager
//! - **Device**: One-shot hardware detection that picks a profile tier
//!
//! ## Example
//!
//! ```ignore
//! use vitrine::prelude::*;
//!
//! let mut viewer = Viewer::new(FileFetcher::new("public"));
//! viewer.start(&WgpuProbe::new(wgpu::PowerPreference::HighPerformance))?;
//!
//! viewer.handle(ViewerEvent::ProfilesSelected {
//!     performance_profile: "profile-high".into(),
//!     scene_profile: "scene-studio".into(),
//! });
//! for event in viewer.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

#[cfg(feature = "web")]
use wasm_bindgen::prelude::*;

pub mod math;
pub mod core;
pub mod scene;
pub mod material;
pub mod camera;
pub mod texture;
pub mod light;
pub mod controls;
pub mod objects;
pub mod helpers;
pub mod loaders;
pub mod postprocessing;
pub mod profile;
pub mod model;
pub mod device;
pub mod viewer;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::math::*;
    pub use crate::core::*;
    pub use crate::scene::*;
    pub use crate::material::*;
    pub use crate::camera::*;
    pub use crate::texture::*;
    pub use crate::light::*;
    pub use crate::controls::*;
    pub use crate::objects::*;
    pub use crate::helpers::*;
    pub use crate::loaders::*;
    pub use crate::postprocessing::*;
    pub use crate::profile::*;
    pub use crate::model::*;
    pub use crate::device::*;
    pub use crate::viewer::*;
}

/// Initialize the viewer for WASM environments.
/// Sets up panic hooks for better error messages in the browser console.
#[cfg(feature = "web")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "Vitrine";
