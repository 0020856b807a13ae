//! Fetching, merging and validating profile documents.

use super::schemas::{validate_performance_profile, validate_scene_profile};
use super::types::{PerformanceProfile, ProfilePair, ProfileSelection, SceneProfile};
use super::ValidationError;
use crate::loaders::{FetchError, Fetcher};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur while loading profiles.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// The profile index itself could not be fetched.
    #[error("Failed to fetch profile index: {0}")]
    IndexFetch(#[source] FetchError),

    /// A profile document could not be fetched.
    #[error("Failed to fetch profile: {0}")]
    Fetch(#[from] FetchError),

    /// A document was not valid JSON or had the wrong top-level shape.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Document path.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Where profile documents live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfilePaths {
    /// The profile index document.
    pub index: String,
    /// Default performance profile document.
    pub default_performance: String,
    /// Default scene profile document.
    pub default_scene: String,
    /// Directory of named performance profiles.
    pub performance_dir: String,
    /// Directory of named scene profiles.
    pub scene_dir: String,
}

impl Default for ProfilePaths {
    fn default() -> Self {
        Self {
            index: "profiles/profiles.json".to_string(),
            default_performance: "profiles/performance/default.json".to_string(),
            default_scene: "profiles/scenes/scene-default.json".to_string(),
            performance_dir: "profiles/performance/".to_string(),
            scene_dir: "profiles/scenes/".to_string(),
        }
    }
}

impl ProfilePaths {
    /// Path of a named performance profile.
    pub fn performance(&self, id: &str) -> String {
        format!("{}{}.json", self.performance_dir, id)
    }

    /// Path of a named scene profile.
    pub fn scene(&self, id: &str) -> String {
        format!("{}{}.json", self.scene_dir, id)
    }
}

/// Which kind of profile an index entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileCategory {
    /// Renderer configuration.
    #[serde(rename = "profile")]
    Performance,
    /// Scene content.
    #[serde(rename = "scene")]
    Scene,
    /// Anything else; kept but never validated.
    #[serde(other)]
    Other,
}

/// One entry of the profile index, with the profile body merged in once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMeta {
    /// Profile id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Document path.
    pub path: String,
    /// Profile kind.
    pub category: ProfileCategory,
    /// Marked as default in the index.
    #[serde(default)]
    pub default: bool,
    /// Remaining fields, including the merged profile body.
    #[serde(flatten)]
    pub body: Map<String, Value>,
    /// Whether the body was fetched and merged.
    #[serde(skip)]
    pub merged: bool,
}

impl ProfileMeta {
    /// Merge a fetched profile body onto this entry. Body fields win.
    pub fn merge(&mut self, body: Map<String, Value>) {
        for (key, value) in body {
            match key.as_str() {
                "id" => {
                    if let Value::String(id) = value {
                        self.id = id;
                    }
                }
                "name" => {
                    if let Value::String(name) = value {
                        self.name = name;
                    }
                }
                "description" => {
                    if let Value::String(description) = value {
                        self.description = description;
                    }
                }
                _ => {
                    self.body.insert(key, value);
                }
            }
        }
        self.merged = true;
    }

    /// The entry as a single JSON document.
    pub fn to_document(&self) -> Value {
        let mut doc = self.body.clone();
        doc.insert("id".to_string(), Value::String(self.id.clone()));
        doc.insert("name".to_string(), Value::String(self.name.clone()));
        doc.insert("description".to_string(), Value::String(self.description.clone()));
        Value::Object(doc)
    }

    /// Typed view of a merged performance profile.
    pub fn performance_profile(&self) -> Option<PerformanceProfile> {
        (self.category == ProfileCategory::Performance && self.merged)
            .then(|| serde_json::from_value(self.to_document()).ok())
            .flatten()
    }

    /// Typed view of a merged scene profile.
    pub fn scene_profile(&self) -> Option<SceneProfile> {
        (self.category == ProfileCategory::Scene && self.merged)
            .then(|| serde_json::from_value(self.to_document()).ok())
            .flatten()
    }
}

/// The profile index document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileIndex {
    /// All listed profiles.
    pub profiles: Vec<ProfileMeta>,
}

impl ProfileIndex {
    /// Performance profile entries.
    pub fn performance(&self) -> impl Iterator<Item = &ProfileMeta> {
        self.profiles
            .iter()
            .filter(|p| p.category == ProfileCategory::Performance)
    }

    /// Scene profile entries.
    pub fn scenes(&self) -> impl Iterator<Item = &ProfileMeta> {
        self.profiles
            .iter()
            .filter(|p| p.category == ProfileCategory::Scene)
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&ProfileMeta> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Ids of the entries marked default, if the index marks both kinds.
    pub fn default_selection(&self) -> Option<ProfileSelection> {
        let performance = self.performance().find(|p| p.default)?;
        let scene = self.scenes().find(|p| p.default)?;
        Some(ProfileSelection::new(&performance.id, &scene.id))
    }
}

/// Validation results for one profile category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryReport {
    /// Number of profiles checked.
    pub total: usize,
    /// Profiles with at least one error, by id.
    pub failures: Vec<(String, Vec<ValidationError>)>,
}

impl CategoryReport {
    /// Number of profiles without errors.
    pub fn passed(&self) -> usize {
        self.total - self.failures.len()
    }
}

/// Advisory validation results from [`ProfileLoader::load_profile_index`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    /// Performance profiles.
    pub performance: CategoryReport,
    /// Scene profiles.
    pub scenes: CategoryReport,
}

/// Loads profile documents through a [`Fetcher`].
pub struct ProfileLoader<F: Fetcher> {
    fetcher: F,
    paths: ProfilePaths,
}

impl<F: Fetcher> ProfileLoader<F> {
    /// Create a loader with the default document locations.
    pub fn new(fetcher: F) -> Self {
        Self::with_paths(fetcher, ProfilePaths::default())
    }

    /// Create a loader with custom document locations.
    pub fn with_paths(fetcher: F, paths: ProfilePaths) -> Self {
        Self { fetcher, paths }
    }

    /// Get the document locations.
    #[inline]
    pub fn paths(&self) -> &ProfilePaths {
        &self.paths
    }

    /// Get the underlying fetcher.
    #[inline]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Get the underlying fetcher mutably.
    #[inline]
    pub fn fetcher_mut(&mut self) -> &mut F {
        &mut self.fetcher
    }

    fn fetch_json(&self, path: &str) -> Result<Value, ProfileError> {
        let bytes = self.fetcher.fetch(path)?;
        serde_json::from_slice(&bytes).map_err(|source| ProfileError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Fetch the index and merge every listed profile into its entry.
    ///
    /// Per-profile fetch or parse failures are logged and leave that entry un-merged.
    /// Validation is advisory: results are logged and returned, nothing is rejected.
    pub fn load_profile_index(&self) -> Result<(ProfileIndex, ValidationReport), ProfileError> {
        let bytes = self
            .fetcher
            .fetch(&self.paths.index)
            .map_err(ProfileError::IndexFetch)?;
        let mut index: ProfileIndex =
            serde_json::from_slice(&bytes).map_err(|source| ProfileError::Parse {
                path: self.paths.index.clone(),
                source,
            })?;

        for entry in &mut index.profiles {
            match self.fetch_json(&entry.path) {
                Ok(Value::Object(body)) => entry.merge(body),
                Ok(other) => log::error!(
                    "Profile {} at {} is not a JSON object (got {})",
                    entry.id,
                    entry.path,
                    super::schema::type_name(&other)
                ),
                Err(e) => log::error!("Failed to load profile {}: {}", entry.id, e),
            }
        }

        let mut report = ValidationReport::default();
        for entry in &index.profiles {
            let (category, errors) = match entry.category {
                ProfileCategory::Performance => (
                    &mut report.performance,
                    validate_performance_profile(&entry.to_document()),
                ),
                ProfileCategory::Scene => {
                    (&mut report.scenes, validate_scene_profile(&entry.to_document()))
                }
                ProfileCategory::Other => continue,
            };
            category.total += 1;
            if !errors.is_empty() {
                category.failures.push((entry.id.clone(), errors));
            }
        }

        log_category("performance", &report.performance);
        log_category("scene", &report.scenes);

        Ok((index, report))
    }

    /// Load the two well-known default profiles. Any fetch failure is returned.
    pub fn load_default_profiles(&self) -> Result<ProfilePair, ProfileError> {
        let performance = self.load_performance_at(&self.paths.default_performance, "default")?;
        let scene = self.load_scene_at(&self.paths.default_scene, "scene-default")?;
        Ok(ProfilePair { performance, scene })
    }

    /// Load a performance and a scene profile by id.
    pub fn load_named_profiles(&self, selection: &ProfileSelection) -> Result<ProfilePair, ProfileError> {
        let performance = self.load_performance_profile(&selection.performance_profile)?;
        let scene = self.load_scene_profile(&selection.scene_profile)?;
        Ok(ProfilePair { performance, scene })
    }

    /// Load one performance profile by id.
    pub fn load_performance_profile(&self, id: &str) -> Result<PerformanceProfile, ProfileError> {
        self.load_performance_at(&self.paths.performance(id), id)
    }

    /// Load one scene profile by id.
    pub fn load_scene_profile(&self, id: &str) -> Result<SceneProfile, ProfileError> {
        self.load_scene_at(&self.paths.scene(id), id)
    }

    fn load_performance_at(&self, path: &str, fallback_id: &str) -> Result<PerformanceProfile, ProfileError> {
        let mut document = self.fetch_json(path)?;
        fill_missing_id(&mut document, fallback_id);
        log_validation(path, &validate_performance_profile(&document));
        let profile: PerformanceProfile =
            serde_json::from_value(document).map_err(|source| ProfileError::Parse {
                path: path.to_string(),
                source,
            })?;
        log::info!("Loaded performance profile {}", profile.id);
        Ok(profile)
    }

    fn load_scene_at(&self, path: &str, fallback_id: &str) -> Result<SceneProfile, ProfileError> {
        let mut document = self.fetch_json(path)?;
        fill_missing_id(&mut document, fallback_id);
        log_validation(path, &validate_scene_profile(&document));
        let profile: SceneProfile =
            serde_json::from_value(document).map_err(|source| ProfileError::Parse {
                path: path.to_string(),
                source,
            })?;
        log::info!("Loaded scene profile {}", profile.id);
        Ok(profile)
    }
}

fn fill_missing_id(document: &mut Value, id: &str) {
    if let Value::Object(fields) = document {
        if !fields.get("id").is_some_and(Value::is_string) {
            fields.insert("id".to_string(), Value::String(id.to_string()));
        }
    }
}

fn log_validation(path: &str, errors: &[ValidationError]) {
    for error in errors {
        log::warn!("{}", error);
    }
    if !errors.is_empty() {
        log::warn!("{} has {} schema error(s); using it anyway", path, errors.len());
    }
}

fn log_category(label: &str, report: &CategoryReport) {
    match report.failures.first() {
        Some((id, _)) => log::info!(
            "Validated {} profiles: {}/{} valid, profile \"{}\" is invalid",
            label,
            report.passed(),
            report.total,
            id
        ),
        None => log::info!(
            "Validated {} profiles: {}/{} valid",
            label,
            report.total,
            report.total
        ),
    }
    for (_, errors) in &report.failures {
        for error in errors {
            log::debug!("{}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::MemoryFetcher;
    use crate::profile::schemas::fixtures;
    use serde_json::json;

    fn fetcher() -> MemoryFetcher {
        let mut f = MemoryFetcher::new();
        f.insert_json(
            "/profiles/profiles.json",
            &json!({
                "profiles": [
                    { "id": "profile-medium", "name": "Medium", "path": "/profiles/performance/profile-medium.json", "category": "profile", "default": true },
                    { "id": "profile-broken", "name": "Broken", "path": "/profiles/performance/profile-broken.json", "category": "profile" },
                    { "id": "studio", "name": "Studio", "path": "/profiles/scenes/studio.json", "category": "scene", "default": true },
                    { "id": "missing", "name": "Missing", "path": "/profiles/scenes/missing.json", "category": "scene" }
                ]
            }),
        );
        f.insert_json("profiles/performance/profile-medium.json", &fixtures::performance("profile-medium"));
        let mut broken = fixtures::performance("profile-broken");
        broken["renderer"]["toneMapping"] = json!("Fancy");
        f.insert_json("profiles/performance/profile-broken.json", &broken);
        f.insert_json("profiles/scenes/studio.json", &fixtures::scene("studio"));
        f.insert_json("profiles/performance/default.json", &fixtures::performance("default"));
        f.insert_json("profiles/scenes/scene-default.json", &fixtures::scene("scene-default"));
        f
    }

    #[test]
    fn test_load_profile_index_merges_and_reports() {
        let loader = ProfileLoader::new(fetcher());
        let (index, report) = loader.load_profile_index().unwrap();

        assert_eq!(index.profiles.len(), 4);
        let medium = index.get("profile-medium").unwrap();
        assert!(medium.merged);
        assert!(medium.body.contains_key("renderer"));
        assert_eq!(
            medium.performance_profile().unwrap().renderer.tone_mapping,
            Some(serde_json::json!("ACESFilmicToneMapping"))
        );

        // A failed fetch leaves the entry in place, un-merged.
        let missing = index.get("missing").unwrap();
        assert!(!missing.merged);
        assert!(missing.scene_profile().is_none());

        assert_eq!(report.performance.total, 2);
        assert_eq!(report.performance.passed(), 1);
        assert_eq!(report.performance.failures[0].0, "profile-broken");
        assert_eq!(report.scenes.total, 2);
        assert_eq!(report.scenes.passed(), 1);
    }

    #[test]
    fn test_default_selection_from_index() {
        let loader = ProfileLoader::new(fetcher());
        let (index, _) = loader.load_profile_index().unwrap();
        assert_eq!(
            index.default_selection(),
            Some(ProfileSelection::new("profile-medium", "studio"))
        );
        assert_eq!(index.performance().count(), 2);
        assert_eq!(index.scenes().count(), 2);
    }

    #[test]
    fn test_index_fetch_failure() {
        let loader = ProfileLoader::new(MemoryFetcher::new());
        assert!(matches!(
            loader.load_profile_index(),
            Err(ProfileError::IndexFetch(_))
        ));
    }

    #[test]
    fn test_load_default_profiles() {
        let loader = ProfileLoader::new(fetcher());
        let pair = loader.load_default_profiles().unwrap();
        assert_eq!(pair.performance.id, "default");
        assert_eq!(pair.scene.id, "scene-default");
    }

    #[test]
    fn test_load_default_profiles_fails_hard() {
        let mut f = fetcher();
        f.remove("profiles/scenes/scene-default.json");
        let loader = ProfileLoader::new(f);
        assert!(matches!(
            loader.load_default_profiles(),
            Err(ProfileError::Fetch(FetchError::NotFound(_)))
        ));
    }

    #[test]
    fn test_load_named_profiles_tolerates_schema_errors() {
        let loader = ProfileLoader::new(fetcher());
        let pair = loader
            .load_named_profiles(&ProfileSelection::new("profile-broken", "studio"))
            .unwrap();
        assert_eq!(pair.performance.renderer.tone_mapping, Some(serde_json::json!("Fancy")));
        assert_eq!(pair.scene.id, "studio");
    }

    #[test]
    fn test_missing_id_is_filled_from_request() {
        let mut f = fetcher();
        let mut doc = fixtures::scene("x");
        doc.as_object_mut().unwrap().remove("id");
        f.insert_json("profiles/scenes/anonymous.json", &doc);
        let loader = ProfileLoader::new(f);
        assert_eq!(loader.load_scene_profile("anonymous").unwrap().id, "anonymous");
    }

    #[test]
    fn test_parse_error() {
        let mut f = fetcher();
        f.insert("profiles/scenes/garbled.json", b"{ not json".to_vec());
        let loader = ProfileLoader::new(f);
        assert!(matches!(
            loader.load_scene_profile("garbled"),
            Err(ProfileError::Parse { .. })
        ));
    }
}
