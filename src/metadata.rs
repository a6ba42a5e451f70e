// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX model metadata parsing.
//!
//! Regressors exported with `skl2onnx` can carry custom metadata properties
//! describing the feature order, the target columns and the expected input
//! precision. All keys are optional; missing keys fall back to defaults that
//! match the four-feature NPK model.

use std::collections::HashMap;

use crate::error::{PredictError, Result};
use crate::features::{FEATURE_NAMES, NUM_FEATURES};

/// Custom metadata keys read from the ONNX model.
pub const METADATA_KEYS: [&str; 7] = [
    "description",
    "author",
    "version",
    "date",
    "features",
    "targets",
    "input_type",
];

/// Element type of the model input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputPrecision {
    /// 32-bit floats (`skl2onnx` `FloatTensorType`).
    #[default]
    F32,
    /// 64-bit floats (`skl2onnx` `DoubleTensorType`).
    F64,
}

impl std::str::FromStr for InputPrecision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "float" | "float32" | "f32" | "tensor(float)" => Ok(Self::F32),
            "double" | "float64" | "f64" | "tensor(double)" => Ok(Self::F64),
            other => Err(format!("Unsupported input type: {other}")),
        }
    }
}

/// Metadata extracted from a regression ONNX model.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Model description.
    pub description: String,
    /// Model author.
    pub author: String,
    /// Model version.
    pub version: String,
    /// Export date.
    pub date: String,
    /// Input feature names, in column order.
    pub features: Vec<String>,
    /// Output column names. Empty when the model does not declare them.
    pub targets: Vec<String>,
    /// Element type of the input tensor.
    pub input_precision: InputPrecision,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            author: String::new(),
            version: String::new(),
            date: String::new(),
            features: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
            targets: Vec::new(),
            input_precision: InputPrecision::default(),
        }
    }
}

impl ModelMetadata {
    /// Parse metadata from ONNX model custom metadata properties.
    ///
    /// # Errors
    ///
    /// Returns an error if `features` does not list exactly four names or
    /// `input_type` names an unsupported element type.
    pub fn from_custom_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut metadata = Self::default();

        for (key, value) in map {
            let value = unquote(value);
            match key.as_str() {
                "description" => metadata.description = value.to_string(),
                "author" => metadata.author = value.to_string(),
                "version" => metadata.version = value.to_string(),
                "date" => metadata.date = value.to_string(),
                "features" => {
                    let features = parse_list(value);
                    if features.len() != NUM_FEATURES {
                        return Err(PredictError::MetadataError(format!(
                            "Model declares {} features, expected {NUM_FEATURES}",
                            features.len()
                        )));
                    }
                    let in_order = features
                        .iter()
                        .zip(FEATURE_NAMES)
                        .all(|(declared, expected)| declared.eq_ignore_ascii_case(expected));
                    if !in_order {
                        return Err(PredictError::MetadataError(format!(
                            "Model features [{}] do not match input order [{}]",
                            features.join(", "),
                            FEATURE_NAMES.join(", ")
                        )));
                    }
                    metadata.features = features;
                }
                "targets" => metadata.targets = parse_list(value),
                "input_type" => {
                    metadata.input_precision =
                        value.parse().map_err(PredictError::MetadataError)?;
                }
                _ => {}
            }
        }

        Ok(metadata)
    }

    /// Provenance line (author, version, export date) for logs, if any is set.
    #[must_use]
    pub fn provenance(&self) -> Option<String> {
        let parts: Vec<String> = [
            ("author", &self.author),
            ("version", &self.version),
            ("date", &self.date),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label}={value}"))
        .collect();

        (!parts.is_empty()).then(|| parts.join(", "))
    }

    /// Short human-readable name for logs.
    #[must_use]
    pub fn model_name(&self) -> &str {
        if self.description.is_empty() {
            "NPK regressor"
        } else {
            &self.description
        }
    }
}

/// Strip matching quotes around a value.
fn unquote(value: &str) -> &str {
    value.trim().trim_matches('\'').trim_matches('"')
}

/// Parse `a, b, c` or `['a', 'b', 'c']` into a list of names.
fn parse_list(value: &str) -> Vec<String> {
    let inner = value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');

    inner
        .split(',')
        .map(unquote)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let meta = ModelMetadata::from_custom_map(&HashMap::new()).unwrap();
        assert_eq!(meta.features, vec!["temperature", "humidity", "ph", "rainfall"]);
        assert!(meta.targets.is_empty());
        assert_eq!(meta.input_precision, InputPrecision::F32);
        assert_eq!(meta.model_name(), "NPK regressor");
    }

    #[test]
    fn test_parse_full() {
        let meta = ModelMetadata::from_custom_map(&map(&[
            ("description", "'RandomForest NPK'"),
            ("version", "1.2"),
            ("features", "[temperature, humidity, ph, rainfall]"),
            ("targets", "['N', 'P', 'K']"),
            ("input_type", "double"),
            ("unrelated", "ignored"),
        ]))
        .unwrap();

        assert_eq!(meta.description, "RandomForest NPK");
        assert_eq!(meta.model_name(), "RandomForest NPK");
        assert_eq!(meta.version, "1.2");
        assert_eq!(meta.targets, vec!["N", "P", "K"]);
        assert_eq!(meta.input_precision, InputPrecision::F64);
    }

    #[test]
    fn test_plain_comma_list() {
        let meta =
            ModelMetadata::from_custom_map(&map(&[("targets", "nitrogen,phosphorus")])).unwrap();
        assert_eq!(meta.targets, vec!["nitrogen", "phosphorus"]);
    }

    #[test]
    fn test_wrong_feature_count() {
        let result = ModelMetadata::from_custom_map(&map(&[("features", "a, b, c")]));
        assert!(matches!(result, Err(PredictError::MetadataError(_))));
    }

    #[test]
    fn test_feature_order_checked() {
        let meta = ModelMetadata::from_custom_map(&map(&[(
            "features",
            "['Temperature', 'Humidity', 'pH', 'Rainfall']",
        )]))
        .unwrap();
        assert_eq!(meta.features[2], "pH");

        let result = ModelMetadata::from_custom_map(&map(&[(
            "features",
            "humidity, temperature, ph, rainfall",
        )]));
        match result {
            Err(PredictError::MetadataError(msg)) => assert!(msg.contains("do not match")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_provenance() {
        assert_eq!(ModelMetadata::default().provenance(), None);

        let meta = ModelMetadata::from_custom_map(&map(&[
            ("author", "agronomy-lab"),
            ("date", "2024-01-01"),
        ]))
        .unwrap();
        assert_eq!(
            meta.provenance().as_deref(),
            Some("author=agronomy-lab, date=2024-01-01")
        );
    }

    #[test]
    fn test_unknown_input_type() {
        let result = ModelMetadata::from_custom_map(&map(&[("input_type", "int8")]));
        assert!(matches!(result, Err(PredictError::MetadataError(_))));
    }

    #[test]
    fn test_precision_parse() {
        assert_eq!("float32".parse::<InputPrecision>(), Ok(InputPrecision::F32));
        assert_eq!("tensor(double)".parse::<InputPrecision>(), Ok(InputPrecision::F64));
    }
}
