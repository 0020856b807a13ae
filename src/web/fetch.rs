//! HTTP fetcher for the browser.

use std::collections::HashMap;
use wasm_bindgen::JsValue;
use web_sys::XmlHttpRequest;

use crate::loaders::{join_url, normalize_path, FetchError, Fetcher};

/// Fetcher issuing blocking `XMLHttpRequest`s below a base URL.
///
/// Resources handed over with [`XhrFetcher::insert`] (files picked by the
/// user, documents the page already has) are served without a request.
#[derive(Debug, Default)]
pub struct XhrFetcher {
    base_url: String,
    assets: HashMap<String, Vec<u8>>,
}

impl XhrFetcher {
    /// Create a fetcher resolving paths against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            assets: HashMap::new(),
        }
    }

    /// Serve `bytes` for `path` without going to the network.
    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) {
        self.assets.insert(normalize_path(path).to_string(), bytes);
    }

    /// Full URL of a resource.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn request(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url(path);
        let failed = |e: JsValue| FetchError::Request {
            path: path.to_string(),
            message: format!("{:?}", e),
        };

        let xhr = XmlHttpRequest::new().map_err(failed)?;
        xhr.open_with_async("GET", &url, false).map_err(failed)?;
        // Synchronous requests cannot ask for an ArrayBuffer; this charset
        // maps every byte to one UTF-16 unit instead.
        xhr.override_mime_type("text/plain; charset=x-user-defined")
            .map_err(failed)?;
        xhr.send().map_err(failed)?;

        let status = xhr.status().map_err(failed)?;
        match status {
            200..=299 => {}
            404 => return Err(FetchError::NotFound(path.to_string())),
            _ => {
                return Err(FetchError::Request {
                    path: path.to_string(),
                    message: format!(
                        "HTTP {} {}",
                        status,
                        xhr.status_text().unwrap_or_default()
                    ),
                })
            }
        }

        let text = xhr
            .response_text()
            .map_err(failed)?
            .unwrap_or_default();
        log::debug!("Fetched {}", url);
        Ok(text.encode_utf16().map(|unit| unit as u8).collect())
    }
}

impl Fetcher for XhrFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        match self.assets.get(normalize_path(path)) {
            Some(bytes) => Ok(bytes.clone()),
            None => self.request(path),
        }
    }
}
