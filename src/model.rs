// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Regression model loading and inference.
//!
//! This module provides [`NutrientModel`], which wraps an ONNX Runtime session
//! for a regressor mapping four field measurements to NPK levels.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::{DynValue, TensorRef};

use crate::error::{PredictError, Result};
use crate::features::SoilConditions;
use crate::inference::InferenceConfig;
use crate::metadata::{InputPrecision, METADATA_KEYS, ModelMetadata};
use crate::results::{NutrientPrediction, Prediction, Speed};

/// Default model artifact, resolved against the working directory.
pub const DEFAULT_MODEL: &str = "best_model.onnx";

/// NPK regression model for inference.
///
/// # Example
///
/// ```no_run
/// use npk_inference::{NutrientModel, SoilConditions};
///
/// let mut model = NutrientModel::load("best_model.onnx")?;
/// let prediction = model.predict(&SoilConditions::new(24.5, 70.3, 6.5, 200.0))?;
/// println!("N = {}", prediction.nutrients.predicted_nitrogen);
/// # Ok::<(), npk_inference::PredictError>(())
/// ```
pub struct NutrientModel {
    /// ONNX Runtime session.
    session: Session,
    /// Model metadata (features, targets, precision).
    metadata: ModelMetadata,
    /// Input tensor name.
    input_name: String,
    /// Output tensor names.
    output_names: Vec<String>,
    /// Inference configuration.
    config: InferenceConfig,
    /// Path the model was loaded from.
    path: PathBuf,
    /// Time spent building the session, in milliseconds.
    load_time: f64,
}

impl NutrientModel {
    /// Load a model from an ONNX file with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, InferenceConfig::default())
    }

    /// Load a model with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist, the requested device
    /// is unavailable, the session can't be built, or the metadata is invalid.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: InferenceConfig) -> Result<Self> {
        let path = path.as_ref();
        let start = Instant::now();

        if !path.exists() {
            return Err(PredictError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let mut builder = Session::builder().map_err(|e| {
            PredictError::ModelLoadError(format!("Failed to create session builder: {e}"))
        })?;

        if let Some(provider) = config
            .device
            .as_ref()
            .map(crate::device::Device::execution_provider)
            .transpose()?
            .flatten()
        {
            builder = builder.with_execution_providers([provider]).map_err(|e| {
                PredictError::ModelLoadError(format!("Failed to register execution provider: {e}"))
            })?;
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                PredictError::ModelLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .with_intra_threads(config.num_threads)
            .map_err(|e| {
                PredictError::ModelLoadError(format!("Failed to set intra-thread count: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| PredictError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let metadata = Self::extract_metadata(&session)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| PredictError::ModelLoadError("Model has no inputs".to_string()))?;

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        if output_names.is_empty() {
            return Err(PredictError::ModelLoadError(
                "Model has no outputs".to_string(),
            ));
        }

        Ok(Self {
            session,
            metadata,
            input_name,
            output_names,
            config,
            path: path.to_path_buf(),
            load_time: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Extract custom metadata from the ONNX model session.
    fn extract_metadata(session: &Session) -> Result<ModelMetadata> {
        let model_metadata = session.metadata().map_err(|e| {
            PredictError::ModelLoadError(format!("Failed to get model metadata: {e}"))
        })?;

        let mut metadata_map: HashMap<String, String> = HashMap::new();
        for key in &METADATA_KEYS {
            if let Ok(Some(value)) = model_metadata.custom(key) {
                metadata_map.insert((*key).to_string(), value);
            }
        }

        ModelMetadata::from_custom_map(&metadata_map)
    }

    /// Predict nutrient levels for one set of field conditions.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::InferenceError`] if the session fails or the
    /// output is missing, empty, or not a float tensor.
    pub fn predict(&mut self, conditions: &SoilConditions) -> Result<Prediction> {
        let start = Instant::now();
        let raw = match self.metadata.input_precision {
            InputPrecision::F32 => {
                let input = conditions.to_array_f32();
                let input = input.as_standard_layout();
                let tensor = TensorRef::from_array_view(&input).map_err(|e| {
                    PredictError::InferenceError(format!("Failed to create input tensor: {e}"))
                })?;
                self.run_inference(tensor)?
            }
            InputPrecision::F64 => {
                let input = conditions.to_array_f64();
                let input = input.as_standard_layout();
                let tensor = TensorRef::from_array_view(&input).map_err(|e| {
                    PredictError::InferenceError(format!("Failed to create input tensor: {e}"))
                })?;
                self.run_inference(tensor)?
            }
        };
        let inference_time = start.elapsed().as_secs_f64() * 1000.0;

        let nutrients = NutrientPrediction::from_outputs(&raw, &self.metadata.targets)?;

        Ok(Prediction {
            nutrients,
            raw,
            speed: Speed::new(self.load_time, inference_time),
        })
    }

    /// Run the session and return the first row of the first output.
    fn run_inference<T>(&mut self, input: TensorRef<'_, T>) -> Result<Vec<f64>>
    where
        T: ort::tensor::PrimitiveTensorElementType + std::fmt::Debug,
    {
        let inputs = ort::inputs![self.input_name.as_str() => input];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| PredictError::InferenceError(format!("Inference failed: {e}")))?;

        let output_name = &self.output_names[0];
        let output = outputs.get(output_name.as_str()).ok_or_else(|| {
            PredictError::InferenceError(format!("Output '{output_name}' not found"))
        })?;

        extract_first_row(output)
    }

    /// Get the model metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Get the path the model was loaded from.
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.path
    }

    /// Name of the execution provider requested for this session.
    #[must_use]
    pub fn execution_provider(&self) -> String {
        self.config
            .device
            .as_ref()
            .map_or_else(|| "cpu".to_string(), ToString::to_string)
    }

    /// Input tensor name.
    #[must_use]
    pub fn input_name(&self) -> &str {
        &self.input_name
    }
}

/// Extract a float output tensor as `f64`, keeping only the first row.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn extract_first_row(output: &DynValue) -> Result<Vec<f64>> {
    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let shape: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
        let data: Vec<f64> = data.iter().copied().map(f64::from).collect();
        return Ok(first_row(&shape, &data).to_vec());
    }

    let (shape, data) = output
        .try_extract_tensor::<f64>()
        .map_err(|e| PredictError::InferenceError(format!("Failed to extract output: {e}")))?;
    let shape: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
    Ok(first_row(&shape, data).to_vec())
}

/// First row of a row-major tensor: the leading element for rank 0 or 1,
/// the first `shape[1..]` block otherwise.
fn first_row<'a>(shape: &[usize], data: &'a [f64]) -> &'a [f64] {
    let row_len = if shape.len() < 2 {
        1
    } else {
        shape[1..].iter().product()
    };
    &data[..row_len.min(data.len())]
}

impl std::fmt::Debug for NutrientModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NutrientModel")
            .field("path", &self.path)
            .field("input", &self.input_name)
            .field("outputs", &self.output_names)
            .field("precision", &self.metadata.input_precision)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found() {
        let result = NutrientModel::load("nonexistent.onnx");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), PredictError::ModelLoadError(_)));
    }

    #[test]
    fn test_model_not_found_message() {
        let err = NutrientModel::load("missing/best_model.onnx").unwrap_err();
        assert!(err.payload_message().starts_with("Model error: "));
        assert!(err.to_string().contains("missing/best_model.onnx"));
    }

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    fn conditions() -> SoilConditions {
        SoilConditions::new(24.5, 70.0, 6.5, 200.0)
    }

    #[test]
    fn test_predict_f32_positional() {
        let mut model = NutrientModel::load(fixture("npk_f32.onnx")).unwrap();
        assert_eq!(model.metadata().input_precision, InputPrecision::F32);
        assert_eq!(model.input_name(), "X");

        let prediction = model.predict(&conditions()).unwrap();
        assert_eq!(prediction.raw, vec![95.5, 15.0, 103.0]);
        assert_eq!(
            prediction.nutrients,
            NutrientPrediction {
                predicted_nitrogen: 95.5,
                predicted_phosphorus: Some(15.0),
                predicted_potassium: Some(103.0),
            }
        );
        assert!(prediction.speed.inference.is_some());
    }

    #[test]
    fn test_predict_f64_named_targets() {
        let config = InferenceConfig::new().with_threads(1);
        let mut model =
            NutrientModel::load_with_config(fixture("npk_f64_named.onnx"), config).unwrap();
        assert_eq!(model.metadata().input_precision, InputPrecision::F64);
        assert_eq!(model.metadata().targets, vec!["K", "N", "P"]);

        let prediction = model.predict(&conditions()).unwrap();
        assert_eq!(prediction.raw, vec![103.0, 95.5, 15.0]);
        assert!((prediction.nutrients.predicted_nitrogen - 95.5).abs() < f64::EPSILON);
        assert_eq!(prediction.nutrients.predicted_phosphorus, Some(15.0));
        assert_eq!(prediction.nutrients.predicted_potassium, Some(103.0));
    }

    #[test]
    fn test_predict_single_output() {
        let mut model = NutrientModel::load(fixture("npk_nitrogen_only.onnx")).unwrap();
        let prediction = model.predict(&conditions()).unwrap();
        assert!((prediction.nutrients.predicted_nitrogen - 95.5).abs() < f64::EPSILON);
        assert_eq!(prediction.nutrients.predicted_phosphorus, None);
        assert_eq!(prediction.nutrients.predicted_potassium, None);
    }

    #[test]
    fn test_first_row_rank2() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(first_row(&[2, 3], &data), &[1.0, 2.0, 3.0]);
        assert_eq!(first_row(&[1, 1], &data[..1]), &[1.0]);
    }

    #[test]
    fn test_first_row_rank1_and_scalar() {
        assert_eq!(first_row(&[3], &[7.0, 8.0, 9.0]), &[7.0]);
        assert_eq!(first_row(&[], &[4.2]), &[4.2]);
        assert!(first_row(&[1, 0], &[]).is_empty());
    }
}
