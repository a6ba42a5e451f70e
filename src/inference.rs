// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference configuration.
//!
//! [`InferenceConfig`] controls how the ONNX Runtime session is built: the
//! number of intra-op threads and the execution device.

use crate::device::Device;

/// Configuration for NPK inference.
///
/// # Example
///
/// ```rust
/// use npk_inference::{Device, InferenceConfig};
///
/// let config = InferenceConfig::new()
///     .with_threads(2)
///     .with_device(Device::Cpu);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InferenceConfig {
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose.
    pub num_threads: usize,
    /// Execution device. `None` runs on the default CPU provider.
    pub device: Option<Device>,
}

impl InferenceConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of intra-op threads. `0` lets ONNX Runtime decide.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Set the execution device.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }
}
