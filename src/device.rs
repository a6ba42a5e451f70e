// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Hardware device support and ONNX Runtime execution providers.
use std::fmt;
use std::str::FromStr;

use ort::execution_providers::ExecutionProviderDispatch;

use crate::error::{PredictError, Result};

/// Hardware device for inference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Device {
    /// CPU (default).
    #[default]
    Cpu,
    /// CUDA for NVIDIA GPUs, with device index.
    Cuda(usize),
    /// `CoreML` (Apple Core Machine Learning).
    CoreMl,
    /// `DirectML` for Windows, with device index.
    DirectMl(usize),
    /// `OpenVINO` for Intel hardware.
    OpenVino,
}

impl Device {
    /// Execution provider for this device, or `None` for plain CPU.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::FeatureNotEnabled`] when the crate was built
    /// without the cargo feature backing this device.
    pub fn execution_provider(&self) -> Result<Option<ExecutionProviderDispatch>> {
        match self {
            Self::Cpu => Ok(None),
            #[cfg(feature = "cuda")]
            Self::Cuda(index) => Ok(Some(
                ort::execution_providers::CUDAExecutionProvider::default()
                    .with_device_id(device_id(*index)?)
                    .build(),
            )),
            #[cfg(feature = "coreml")]
            Self::CoreMl => Ok(Some(
                ort::execution_providers::CoreMLExecutionProvider::default()
                    .with_subgraphs(true)
                    .build(),
            )),
            #[cfg(feature = "directml")]
            Self::DirectMl(index) => Ok(Some(
                ort::execution_providers::DirectMLExecutionProvider::default()
                    .with_device_id(device_id(*index)?)
                    .build(),
            )),
            #[cfg(feature = "openvino")]
            Self::OpenVino => Ok(Some(
                ort::execution_providers::OpenVINOExecutionProvider::default().build(),
            )),
            #[allow(unreachable_patterns)]
            other => Err(PredictError::FeatureNotEnabled(format!(
                "device '{other}' requires the '{}' cargo feature",
                other.feature_name()
            ))),
        }
    }

    /// Cargo feature that enables this device.
    #[must_use]
    pub const fn feature_name(&self) -> &'static str {
        match self {
            Self::Cpu => "default",
            Self::Cuda(_) => "cuda",
            Self::CoreMl => "coreml",
            Self::DirectMl(_) => "directml",
            Self::OpenVino => "openvino",
        }
    }
}

#[cfg(any(feature = "cuda", feature = "directml"))]
fn device_id(index: usize) -> Result<i32> {
    i32::try_from(index)
        .map_err(|_| PredictError::ConfigError(format!("Device index out of range: {index}")))
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(i) => write!(f, "cuda:{i}"),
            Self::CoreMl => write!(f, "coreml"),
            Self::DirectMl(i) => write!(f, "directml:{i}"),
            Self::OpenVino => write!(f, "openvino"),
        }
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "cpu" => Ok(Self::Cpu),
            "mps" | "coreml" => Ok(Self::CoreMl),
            "openvino" => Ok(Self::OpenVino),
            _ => {
                if let Some(rest) = s.strip_prefix("cuda") {
                    parse_device_index(rest).map(Self::Cuda)
                } else if let Some(rest) = s.strip_prefix("directml") {
                    parse_device_index(rest).map(Self::DirectMl)
                } else {
                    Err(format!("Unknown device: {s}"))
                }
            }
        }
    }
}

/// Parse the optional `:N` suffix of a device string.
fn parse_device_index(s: &str) -> std::result::Result<usize, String> {
    if s.is_empty() {
        return Ok(0);
    }
    s.strip_prefix(':')
        .and_then(|index| index.parse::<usize>().ok())
        .ok_or_else(|| format!("Invalid device index: '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device() {
        assert_eq!(Device::from_str("cpu").unwrap(), Device::Cpu);
        assert_eq!(Device::from_str("CPU").unwrap(), Device::Cpu);
        assert_eq!(Device::from_str("cuda").unwrap(), Device::Cuda(0));
        assert_eq!(Device::from_str("cuda:1").unwrap(), Device::Cuda(1));
        assert_eq!(Device::from_str("mps").unwrap(), Device::CoreMl);
        assert_eq!(Device::from_str("coreml").unwrap(), Device::CoreMl);
        assert_eq!(Device::from_str("directml:2").unwrap(), Device::DirectMl(2));
        assert_eq!(Device::from_str("openvino").unwrap(), Device::OpenVino);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Device::from_str("tpu").is_err());
        assert!(Device::from_str("cuda:x").is_err());
        assert!(Device::from_str("cuda0").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for device in [Device::Cpu, Device::Cuda(3), Device::DirectMl(1), Device::OpenVino] {
            assert_eq!(Device::from_str(&device.to_string()).unwrap(), device);
        }
    }

    #[test]
    fn test_cpu_has_no_provider() {
        assert!(Device::Cpu.execution_provider().unwrap().is_none());
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_disabled_feature() {
        let err = Device::Cuda(0).execution_provider().unwrap_err();
        assert!(matches!(err, PredictError::FeatureNotEnabled(_)));
        assert!(err.to_string().contains("cuda"));
    }
}
