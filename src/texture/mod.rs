//! Texture module for environment cubemaps.

mod cube_texture;

pub use cube_texture::{
    CubeFace, CubeTexture, CubeTextureLoader, CubeTextureSource, FetchCubeTextureLoader,
};
