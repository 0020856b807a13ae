//! Hardware probes.

use serde::{Deserialize, Serialize};

/// Form factor of the host device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Desktop or laptop.
    #[default]
    Desktop,
    /// Phone or tablet.
    Mobile,
}

impl DeviceType {
    const MOBILE_MARKERS: [&'static str; 5] = ["mobile", "android", "iphone", "ipad", "phone"];

    /// Classify a browser user agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if Self::MOBILE_MARKERS.iter().any(|m| ua.contains(m)) {
            DeviceType::Mobile
        } else {
            DeviceType::Desktop
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
        }
    }
}

/// Graphics adapter summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    /// Adapter name.
    pub name: String,
    /// Graphics backend.
    pub backend: String,
    /// Whether the adapter is a discrete GPU.
    pub discrete: bool,
}

/// Source of hardware facts used to pick a profile tier.
pub trait DeviceProbe {
    /// Form factor.
    fn device_type(&self) -> DeviceType;

    /// The graphics adapter, `None` when no adapter is available.
    fn gpu(&self) -> Option<GpuInfo>;

    /// Measured frames per second, if known.
    fn frame_rate(&self) -> Option<f32>;

    /// Largest buffer the adapter accepts, in bytes.
    fn memory(&self) -> Option<u64>;
}

/// Probe answering from fixed values. Used by hosts that measure on their own and by tests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticProbe {
    /// Form factor.
    pub device_type: DeviceType,
    /// Adapter.
    pub gpu: Option<GpuInfo>,
    /// Frames per second.
    pub frame_rate: Option<f32>,
    /// Memory in bytes.
    pub memory: Option<u64>,
}

impl StaticProbe {
    /// Create a desktop probe with no adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the form factor.
    pub fn with_device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = device_type;
        self
    }

    /// Builder: set the adapter.
    pub fn with_gpu(mut self, name: impl Into<String>) -> Self {
        self.gpu = Some(GpuInfo {
            name: name.into(),
            backend: "static".to_string(),
            discrete: false,
        });
        self
    }

    /// Builder: set the frame rate.
    pub fn with_frame_rate(mut self, fps: f32) -> Self {
        self.frame_rate = Some(fps);
        self
    }
}

impl DeviceProbe for StaticProbe {
    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    fn gpu(&self) -> Option<GpuInfo> {
        self.gpu.clone()
    }

    fn frame_rate(&self) -> Option<f32> {
        self.frame_rate
    }

    fn memory(&self) -> Option<u64> {
        self.memory
    }
}

/// Probe that requests a wgpu adapter once and reports what it finds.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct WgpuProbe {
    gpu: Option<GpuInfo>,
    memory: Option<u64>,
    frame_rate: Option<f32>,
}

#[cfg(not(target_arch = "wasm32"))]
impl WgpuProbe {
    /// Request an adapter, blocking until the backend answers.
    pub fn new(power_preference: wgpu::PowerPreference) -> Self {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: None,
            force_fallback_adapter: false,
        }));

        match adapter {
            Some(adapter) => {
                let info = adapter.get_info();
                log::info!("Found adapter {} ({:?})", info.name, info.backend);
                Self {
                    gpu: Some(GpuInfo {
                        name: info.name,
                        backend: format!("{:?}", info.backend),
                        discrete: info.device_type == wgpu::DeviceType::DiscreteGpu,
                    }),
                    memory: Some(adapter.limits().max_buffer_size),
                    frame_rate: None,
                }
            }
            None => {
                log::warn!("No graphics adapter available");
                Self {
                    gpu: None,
                    memory: None,
                    frame_rate: None,
                }
            }
        }
    }

    /// Builder: report a frame rate measured by the host.
    pub fn with_frame_rate(mut self, fps: f32) -> Self {
        self.frame_rate = Some(fps);
        self
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DeviceProbe for WgpuProbe {
    fn device_type(&self) -> DeviceType {
        DeviceType::Desktop
    }

    fn gpu(&self) -> Option<GpuInfo> {
        self.gpu.clone()
    }

    fn frame_rate(&self) -> Option<f32> {
        self.frame_rate
    }

    fn memory(&self) -> Option<u64> {
        self.memory
    }
}
