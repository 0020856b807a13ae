//! Material module: surface descriptions attached to mesh primitives.

mod standard;

pub use standard::{MaterialUniform, StandardMaterial, TextureSlot};
