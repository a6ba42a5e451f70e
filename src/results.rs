// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Prediction results and the single-line JSON response.

use serde::Serialize;

use crate::error::{PredictError, Result};

const NITROGEN_NAMES: [&str; 3] = ["n", "nitrogen", "predicted_nitrogen"];
const PHOSPHORUS_NAMES: [&str; 3] = ["p", "phosphorus", "predicted_phosphorus"];
const POTASSIUM_NAMES: [&str; 3] = ["k", "potassium", "predicted_potassium"];

/// Timing information in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Speed {
    /// Model load time.
    pub load: Option<f64>,
    /// Inference time.
    pub inference: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance.
    #[must_use]
    pub const fn new(load: f64, inference: f64) -> Self {
        Self {
            load: Some(load),
            inference: Some(inference),
        }
    }
}

/// Predicted nutrient levels. Only nitrogen is guaranteed; single-output
/// models leave phosphorus and potassium empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientPrediction {
    /// Predicted nitrogen (N).
    pub predicted_nitrogen: f64,
    /// Predicted phosphorus (P), if the model outputs it.
    pub predicted_phosphorus: Option<f64>,
    /// Predicted potassium (K), if the model outputs it.
    pub predicted_potassium: Option<f64>,
}

impl NutrientPrediction {
    /// Map one output row of the model onto nutrients.
    ///
    /// When `targets` names every output column, values are placed by name.
    /// Otherwise the columns are read positionally as N, P, K.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::InferenceError`] if the output row is empty.
    pub fn from_outputs(values: &[f64], targets: &[String]) -> Result<Self> {
        let Some(&first) = values.first() else {
            return Err(PredictError::InferenceError(
                "Model returned an empty prediction".to_string(),
            ));
        };

        if targets.len() == values.len()
            && let Some(n) = find_target(targets, &NITROGEN_NAMES)
        {
            return Ok(Self {
                predicted_nitrogen: values[n],
                predicted_phosphorus: find_target(targets, &PHOSPHORUS_NAMES).map(|i| values[i]),
                predicted_potassium: find_target(targets, &POTASSIUM_NAMES).map(|i| values[i]),
            });
        }

        Ok(Self {
            predicted_nitrogen: first,
            predicted_phosphorus: values.get(1).copied(),
            predicted_potassium: values.get(2).copied(),
        })
    }
}

/// Output of one [`crate::NutrientModel::predict`] call.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Nutrient levels mapped from the model output.
    pub nutrients: NutrientPrediction,
    /// Raw first output row, before mapping.
    pub raw: Vec<f64>,
    /// Timing information.
    pub speed: Speed,
}

/// Index of the first target whose name matches one of `aliases`.
fn find_target(targets: &[String], aliases: &[&str]) -> Option<usize> {
    targets.iter().position(|t| {
        let t = t.trim().to_lowercase();
        aliases.contains(&t.as_str())
    })
}

/// Body of the JSON line written to stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Successful prediction.
    Prediction(NutrientPrediction),
    /// Any failure, reported as `{"error": "..."}`.
    Error {
        /// Human-readable error message.
        error: String,
    },
}

impl Response {
    /// Build an error response from a [`PredictError`].
    #[must_use]
    pub fn from_error(err: &PredictError) -> Self {
        Self::Error {
            error: err.payload_message(),
        }
    }

    /// Whether this response carries an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Serialize as a single line of JSON.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"error": "Serialization error: {e}"}}"#)
        })
    }
}

impl From<Result<NutrientPrediction>> for Response {
    fn from(result: Result<NutrientPrediction>) -> Self {
        match result {
            Ok(prediction) => Self::Prediction(prediction),
            Err(err) => Self::from_error(&err),
        }
    }
}
