//! Models: the catalogue, per-model placement sidecars and the model manager.

mod config;
mod index;
mod manager;

pub use config::*;
pub use index::{ModelEntry, ModelIndex};
pub use manager::{ModelError, ModelManager, ModelState, TrackedModel, ALLOWED_EXTENSIONS};
