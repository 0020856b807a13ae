//! Resource fetching.
//!
//! Every document the viewer reads (profiles, model index, sidecars, glTF files,
//! cubemap faces) goes through a [`Fetcher`]. Native builds read from a rooted
//! directory, tests serve bytes from memory and the web bindings request
//! them over HTTP.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching a resource.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The resource does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Requested path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A network request failed or returned an error status.
    #[error("Request for {path} failed: {message}")]
    Request {
        /// Requested path.
        path: String,
        /// Status line or transport error.
        message: String,
    },
}

impl FetchError {
    /// Path of the resource that failed.
    pub fn path(&self) -> &str {
        match self {
            FetchError::NotFound(path) => path,
            FetchError::Io { path, .. } => path,
            FetchError::Request { path, .. } => path,
        }
    }
}

/// Source of raw resource bytes addressed by slash-separated paths.
pub trait Fetcher {
    /// Fetch the full contents of a resource.
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(path)
    }
}

/// Strip leading slashes so `/profiles/a.json` and `profiles/a.json` address the same resource.
pub fn normalize_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Join a base URL and a resource path with exactly one slash between them.
///
/// An empty base leaves the path relative to the current page.
pub fn join_url(base: &str, path: &str) -> String {
    let path = normalize_path(path);
    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }
}

/// Directory containing `path`, including the trailing slash.
///
/// Returns an empty string for bare file names.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Fetcher reading files below a root directory.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    /// Create a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root directory.
    #[inline]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Resolve a resource path to a file system path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(normalize_path(path))
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full = self.resolve(path);
        std::fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }
}

/// In-memory fetcher. Records how often each path was requested.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
    requests: RefCell<HashMap<String, usize>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a resource.
    pub fn insert(&mut self, path: impl AsRef<str>, bytes: impl Into<Vec<u8>>) {
        self.files
            .insert(normalize_path(path.as_ref()).to_string(), bytes.into());
    }

    /// Store a JSON document.
    pub fn insert_json(&mut self, path: impl AsRef<str>, value: &serde_json::Value) {
        self.insert(path, value.to_string().into_bytes());
    }

    /// Remove a resource.
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(normalize_path(path))
    }

    /// Number of times `path` was requested, found or not.
    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .borrow()
            .get(normalize_path(path))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of requests served.
    pub fn total_requests(&self) -> usize {
        self.requests.borrow().values().sum()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let key = normalize_path(path);
        *self.requests.borrow_mut().entry(key.to_string()).or_insert(0) += 1;
        self.files
            .get(key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("models/statue/lada.gltf"), "models/statue/");
        assert_eq!(parent_dir("lada.gltf"), "");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://cdn.example.com/viewer/", "/profiles/a.json"), "https://cdn.example.com/viewer/profiles/a.json");
        assert_eq!(join_url("https://cdn.example.com", "models/x.glb"), "https://cdn.example.com/models/x.glb");
        assert_eq!(join_url("", "/profiles/profiles.json"), "profiles/profiles.json");
    }

    #[test]
    fn test_request_error_names_path() {
        let e = FetchError::Request {
            path: "models/x.glb".into(),
            message: "HTTP 500 Internal Server Error".into(),
        };
        assert_eq!(e.path(), "models/x.glb");
        assert_eq!(e.to_string(), "Request for models/x.glb failed: HTTP 500 Internal Server Error");
    }

    #[test]
    fn test_memory_fetcher_normalizes_leading_slash() {
        let mut fetcher = MemoryFetcher::new();
        fetcher.insert("/profiles/profiles.json", b"{}".to_vec());
        assert_eq!(fetcher.fetch("profiles/profiles.json").unwrap(), b"{}");
        assert_eq!(fetcher.request_count("/profiles/profiles.json"), 1);
    }

    #[test]
    fn test_memory_fetcher_missing() {
        let fetcher = MemoryFetcher::new();
        let err = fetcher.fetch("nope.json").unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
        assert_eq!(err.path(), "nope.json");
        assert_eq!(fetcher.total_requests(), 1);
    }

    #[test]
    fn test_file_fetcher_reads_below_root() {
        let root = std::env::temp_dir().join(format!("vitrine-fetch-{}", std::process::id()));
        std::fs::create_dir_all(root.join("profiles")).unwrap();
        std::fs::write(root.join("profiles/a.json"), b"{\"id\":\"a\"}").unwrap();

        let fetcher = FileFetcher::new(&root);
        assert_eq!(fetcher.fetch("/profiles/a.json").unwrap(), b"{\"id\":\"a\"}");
        assert!(matches!(
            fetcher.fetch("profiles/missing.json"),
            Err(FetchError::NotFound(_))
        ));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
