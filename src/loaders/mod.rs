//! Asset loading: resource fetching and glTF parsing.

mod fetch;
mod gltf_loader;

pub use fetch::*;
pub use gltf_loader::*;

#[cfg(test)]
pub(crate) use gltf_loader::fixtures;
