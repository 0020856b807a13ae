//! The model catalogue (`models/index.json`).

use super::{ModelConfig, ModelError, ModelInfo};
use crate::loaders::Fetcher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_MODEL_KEY: &str = "default_model";

/// One catalogue entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelEntry {
    /// Display name.
    pub name: String,
    /// glTF files in the model folder; the first one is loaded.
    pub gltf_files: Vec<String>,
    /// Content hash recorded by the index generator.
    pub model_hash: String,
    /// Size statistics.
    pub model_info: ModelInfo,
    /// Copy of the model's sidecar, if the generator embedded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ModelConfig>,
}

/// All models available to the viewer, keyed by folder name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelIndex {
    entries: BTreeMap<String, ModelEntry>,
    default_model: Option<String>,
}

impl ModelIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed `index.json`. Malformed entries are skipped with a warning.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let mut index = Self::new();
        let Some(object) = value.as_object() else {
            log::warn!("Model index is not an object");
            return index;
        };

        for (key, entry) in object {
            if key == DEFAULT_MODEL_KEY {
                index.default_model = entry.as_str().map(str::to_string);
                continue;
            }
            match serde_json::from_value::<ModelEntry>(entry.clone()) {
                Ok(entry) => {
                    index.entries.insert(key.clone(), entry);
                }
                Err(e) => log::warn!("Skipping model index entry {}: {}", key, e),
            }
        }
        index
    }

    /// Fetch and parse the index at `path`.
    pub fn load<F: Fetcher + ?Sized>(fetcher: &F, path: &str) -> Result<Self, ModelError> {
        let bytes = fetcher.fetch(path).map_err(ModelError::IndexFetch)?;
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(ModelError::IndexParse)?;
        let index = Self::from_value(&value);
        log::info!("Model index lists {} models", index.len());
        Ok(index)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, id: impl Into<String>, entry: ModelEntry) {
        self.entries.insert(id.into(), entry);
    }

    /// Get an entry by id.
    #[inline]
    pub fn get(&self, id: &str) -> Option<&ModelEntry> {
        self.entries.get(id)
    }

    /// Entries as `(id, entry)` pairs sorted by display name.
    pub fn entries(&self) -> Vec<(&str, &ModelEntry)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(id, entry)| (id.as_str(), entry))
            .collect();
        entries.sort_by(|a, b| a.1.name.cmp(&b.1.name).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Id of the model loaded at startup.
    #[inline]
    pub fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    /// Set the startup model.
    pub fn set_default_model(&mut self, id: Option<String>) {
        self.default_model = id;
    }

    /// Load path of a model: `<models_root>/<id>/<first gltf file>`.
    pub fn load_path(&self, models_root: &str, id: &str) -> Option<String> {
        let file = self.get(id)?.gltf_files.first()?;
        Some(format!("{}/{}/{}", models_root.trim_end_matches('/'), id, file))
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::MemoryFetcher;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "statue": {
                "name": "statue",
                "gltf_files": ["lada.gltf"],
                "model_hash": "9e107d9d372bb6826bd81d3542a419d6",
                "model_info": { "triangles": 1200, "vertices": 800, "file_size_mb": 1.25 }
            },
            "bench": {
                "name": "bench",
                "gltf_files": ["bench.glb", "bench_lod.glb"],
                "model_hash": "e4d909c290d0fb1ca068ffaddf22cbd0",
                "model_info": { "triangles": 10, "vertices": 8, "file_size_mb": 0.01 }
            },
            "broken": { "gltf_files": "nope" },
            "default_model": "statue"
        })
    }

    #[test]
    fn test_entries_sorted_by_name() {
        let index = ModelIndex::from_value(&sample());
        let names: Vec<_> = index.entries().into_iter().map(|(id, _)| id).collect();
        assert_eq!(names, vec!["bench", "statue"]);
        assert_eq!(index.default_model(), Some("statue"));
    }

    #[test]
    fn test_load_path() {
        let index = ModelIndex::from_value(&sample());
        assert_eq!(
            index.load_path("models/", "statue").as_deref(),
            Some("models/statue/lada.gltf")
        );
        assert_eq!(
            index.load_path("models", "bench").as_deref(),
            Some("models/bench/bench.glb")
        );
        assert_eq!(index.load_path("models", "missing"), None);
    }

    #[test]
    fn test_load_missing_index() {
        let fetcher = MemoryFetcher::new();
        let err = ModelIndex::load(&fetcher, "models/index.json").unwrap_err();
        assert!(matches!(err, ModelError::IndexFetch(_)));
    }

    #[test]
    fn test_load_from_fetcher() {
        let mut fetcher = MemoryFetcher::new();
        fetcher.insert_json("models/index.json", &sample());
        let index = ModelIndex::load(&fetcher, "models/index.json").unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("statue").unwrap().model_info.triangles, 1200);
    }
}
