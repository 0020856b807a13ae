//! # Device Module
//!
//! One-shot hardware detection run at startup to pick a profile tier.

mod probe;

pub use probe::*;

use crate::loaders::Fetcher;
use crate::profile::ProfileSelection;
use serde::{Deserialize, Serialize};

/// Profile pair named in `autostart.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutostartEntry {
    /// Performance profile id.
    pub performance: String,
    /// Scene profile id.
    pub scene: String,
}

impl AutostartEntry {
    fn new(performance: &str, scene: &str) -> Self {
        Self {
            performance: performance.to_string(),
            scene: scene.to_string(),
        }
    }

    /// As a profile selection.
    pub fn to_selection(&self) -> ProfileSelection {
        ProfileSelection::new(&self.performance, &self.scene)
    }
}

/// Startup profiles per device class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutostartProfiles {
    /// Desktop devices.
    pub desktop: AutostartEntry,
    /// Mobile devices.
    pub mobile: AutostartEntry,
    /// Devices without a usable adapter.
    pub fallback: AutostartEntry,
}

/// Contents of `autostart.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutostartConfig {
    /// Startup profiles.
    pub profiles: AutostartProfiles,
    /// Enable debug tooling.
    #[serde(default)]
    pub debug: bool,
    /// Probe the hardware. When off, the tier follows the device type.
    #[serde(default = "default_auto_detect")]
    pub auto_detect: bool,
}

fn default_auto_detect() -> bool {
    true
}

impl Default for AutostartConfig {
    fn default() -> Self {
        Self {
            profiles: AutostartProfiles {
                desktop: AutostartEntry::new("profile-medium", "scene-default"),
                mobile: AutostartEntry::new("profile-mobile", "scene-default"),
                fallback: AutostartEntry::new("profile-medium", "scene-default"),
            },
            debug: false,
            auto_detect: true,
        }
    }
}

impl AutostartConfig {
    /// Fetch and parse `path`. Returns `None` when it is missing or incomplete.
    pub fn load<F: Fetcher + ?Sized>(fetcher: &F, path: &str) -> Option<Self> {
        let bytes = match fetcher.fetch(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("No autostart config: {}", e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Incomplete autostart config {}, using defaults: {}", path, e);
                None
            }
        }
    }
}

/// Coarse performance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceCategory {
    /// Weak or unknown hardware.
    Low,
    /// Typical hardware.
    Medium,
    /// Fast hardware.
    High,
}

impl PerformanceCategory {
    /// Classify a measured frame rate.
    pub fn from_frame_rate(fps: f32) -> Self {
        if fps < 30.0 {
            PerformanceCategory::Low
        } else if fps < 60.0 {
            PerformanceCategory::Medium
        } else {
            PerformanceCategory::High
        }
    }
}

/// What the probe found.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    /// Adapter.
    pub gpu: Option<GpuInfo>,
    /// Frames per second.
    pub frame_rate: Option<f32>,
    /// Memory in bytes.
    pub memory: Option<u64>,
}

/// Result of device detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReport {
    /// Form factor.
    pub device_type: DeviceType,
    /// Probe results, `None` when probing was disabled.
    pub capabilities: Option<DeviceCapabilities>,
    /// Performance tier.
    pub category: PerformanceCategory,
}

impl DeviceReport {
    /// Startup profiles for this device.
    ///
    /// A probed device without an adapter gets the fallback pair.
    pub fn selection(&self, autostart: &AutostartConfig) -> ProfileSelection {
        let profiles = &autostart.profiles;
        let no_gpu = self
            .capabilities
            .as_ref()
            .is_some_and(|caps| caps.gpu.is_none());
        let entry = if no_gpu {
            &profiles.fallback
        } else {
            match self.device_type {
                DeviceType::Desktop => &profiles.desktop,
                DeviceType::Mobile => &profiles.mobile,
            }
        };
        entry.to_selection()
    }
}

/// Detect the device class and performance tier.
pub fn detect(probe: &dyn DeviceProbe, autostart: &AutostartConfig) -> DeviceReport {
    let device_type = probe.device_type();
    if !autostart.auto_detect {
        let category = match device_type {
            DeviceType::Mobile => PerformanceCategory::Low,
            DeviceType::Desktop => PerformanceCategory::Medium,
        };
        log::info!("Detection disabled, {} device is {:?}", device_type.as_str(), category);
        return DeviceReport {
            device_type,
            capabilities: None,
            category,
        };
    }

    let capabilities = DeviceCapabilities {
        gpu: probe.gpu(),
        frame_rate: probe.frame_rate(),
        memory: probe.memory(),
    };
    let category = match (&capabilities.gpu, capabilities.frame_rate) {
        (None, _) => PerformanceCategory::Low,
        (Some(_), Some(fps)) => PerformanceCategory::from_frame_rate(fps),
        (Some(_), None) => PerformanceCategory::Medium,
    };
    log::info!(
        "Detected {} device, {:?} tier ({:?})",
        device_type.as_str(),
        category,
        capabilities.gpu.as_ref().map(|g| g.name.as_str())
    );
    DeviceReport {
        device_type,
        capabilities: Some(capabilities),
        category,
    }
}
