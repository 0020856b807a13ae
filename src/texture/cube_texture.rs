//! Cube texture (cubemap) sources for environment maps.

use crate::core::ColorSpace;
use crate::loaders::{FetchError, Fetcher};

/// Face order for cube maps: +X, -X, +Y, -Y, +Z, -Z
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    /// Positive X (+X, right)
    PositiveX = 0,
    /// Negative X (-X, left)
    NegativeX = 1,
    /// Positive Y (+Y, top)
    PositiveY = 2,
    /// Negative Y (-Y, bottom)
    NegativeY = 3,
    /// Positive Z (+Z, front)
    PositiveZ = 4,
    /// Negative Z (-Z, back)
    NegativeZ = 5,
}

impl CubeFace {
    /// All faces in upload order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// File name used when a profile does not list face files.
    pub fn default_file_name(self) -> &'static str {
        match self {
            CubeFace::PositiveX => "posx.jpg",
            CubeFace::NegativeX => "negx.jpg",
            CubeFace::PositiveY => "posy.jpg",
            CubeFace::NegativeY => "negy.jpg",
            CubeFace::PositiveZ => "posz.jpg",
            CubeFace::NegativeZ => "negz.jpg",
        }
    }
}

/// Where to find the six faces of a cubemap.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeTextureSource {
    /// Directory prefix, ending in `/`.
    pub path: String,
    /// Face file names in [`CubeFace::ALL`] order.
    pub files: [String; 6],
    /// Color space the faces are encoded in.
    pub color_space: ColorSpace,
}

impl CubeTextureSource {
    /// Full paths of all six faces.
    pub fn face_paths(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|file| format!("{}{}", self.path, file))
            .collect()
    }
}

impl Default for CubeTextureSource {
    fn default() -> Self {
        Self {
            path: "textures/".to_string(),
            files: CubeFace::ALL.map(|f| f.default_file_name().to_string()),
            color_space: ColorSpace::Srgb,
        }
    }
}

/// A loaded cubemap: six encoded face images ready for the renderer to decode.
#[derive(Debug, Clone)]
pub struct CubeTexture {
    /// Source the faces were loaded from.
    pub source: CubeTextureSource,
    /// Encoded face bytes in [`CubeFace::ALL`] order.
    pub faces: Vec<Vec<u8>>,
}

impl CubeTexture {
    /// Get the encoded bytes of one face.
    pub fn face(&self, face: CubeFace) -> Option<&[u8]> {
        self.faces.get(face as usize).map(Vec::as_slice)
    }
}

/// Loads cubemap faces for the scene environment.
pub trait CubeTextureLoader {
    /// Load all six faces of a cubemap.
    fn load(&mut self, source: &CubeTextureSource) -> Result<CubeTexture, FetchError>;
}

/// Cube texture loader that reads faces through a [`Fetcher`].
pub struct FetchCubeTextureLoader<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: Fetcher + ?Sized> FetchCubeTextureLoader<'a, F> {
    /// Create a loader over a fetcher.
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }
}

impl<F: Fetcher + ?Sized> CubeTextureLoader for FetchCubeTextureLoader<'_, F> {
    fn load(&mut self, source: &CubeTextureSource) -> Result<CubeTexture, FetchError> {
        let faces = source
            .face_paths()
            .iter()
            .map(|path| self.fetcher.fetch(path))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("Loaded cubemap faces from {}", source.path);
        Ok(CubeTexture {
            source: source.clone(),
            faces,
        })
    }
}
