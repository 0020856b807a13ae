//! Renderable objects module.
//!
//! CPU-side descriptions of meshes and line sets held by scene nodes.

mod line;
mod mesh;

pub use line::*;
pub use mesh::*;
