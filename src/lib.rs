// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # NPK Inference
//!
//! Predict soil nitrogen, phosphorus and potassium from four field
//! measurements (temperature, humidity, pH, rainfall) with a pre-trained
//! regression model exported to ONNX.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use npk_inference::{NutrientModel, SoilConditions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut model = NutrientModel::load("best_model.onnx")?;
//!     let conditions = SoilConditions::new(24.5, 70.3, 6.5, 200.0);
//!     let prediction = model.predict(&conditions)?;
//!
//!     println!("N: {}", prediction.nutrients.predicted_nitrogen);
//!     if let Some(p) = prediction.nutrients.predicted_phosphorus {
//!         println!("P: {p}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # temperature humidity ph rainfall
//! npk-inference 24.5 70.3 6.5 200
//! {"predicted_nitrogen":91.2,"predicted_phosphorus":43.0,"predicted_potassium":41.7}
//!
//! npk-inference 24.5 humid 6.5 200
//! {"error":"Invalid argument types"}
//! ```
//!
//! Every outcome, including failures, is a single JSON line on stdout and the
//! process exits with status 0. Diagnostics go to stderr with `--verbose`.
//!
//! ## Exporting a model
//!
//! ```python
//! from skl2onnx import to_onnx
//! onx = to_onnx(regressor, X_train[:1].astype("float32"))
//! for key, value in {"targets": "N,P,K"}.items():
//!     meta = onx.metadata_props.add(); meta.key, meta.value = key, value
//! open("best_model.onnx", "wb").write(onx.SerializeToString())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `cuda` | NVIDIA CUDA execution provider |
//! | `coreml` | Apple `CoreML` execution provider |
//! | `directml` | Windows `DirectML` execution provider |
//! | `openvino` | Intel `OpenVINO` execution provider |

// Modules
pub mod cli;
pub mod device;
pub mod error;
pub mod features;
pub mod inference;
pub mod metadata;
pub mod model;
pub mod results;

// Re-export main types for convenience
pub use device::Device;
pub use error::{PredictError, Result};
pub use features::SoilConditions;
pub use inference::InferenceConfig;
pub use metadata::{InputPrecision, ModelMetadata};
pub use model::{DEFAULT_MODEL, NutrientModel};
pub use results::{NutrientPrediction, Prediction, Response, Speed};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
