// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Field measurements fed to the regressor.
//!
//! The model is trained on exactly four features, always in this order:
//! temperature, humidity, pH and rainfall.

use ndarray::Array2;

use crate::error::{PredictError, Result};

/// Number of input features the regressor expects.
pub const NUM_FEATURES: usize = 4;

/// Feature names in model input order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = ["temperature", "humidity", "ph", "rainfall"];

/// One row of field conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilConditions {
    /// Air temperature (°C).
    pub temperature: f64,
    /// Relative humidity (%).
    pub humidity: f64,
    /// Soil pH.
    pub ph: f64,
    /// Rainfall (mm).
    pub rainfall: f64,
}

impl SoilConditions {
    /// Create a new set of conditions.
    #[must_use]
    pub const fn new(temperature: f64, humidity: f64, ph: f64, rainfall: f64) -> Self {
        Self {
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    /// Parse conditions from raw command-line values.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::ArgumentCount`] unless exactly four values are given,
    /// and [`PredictError::ArgumentType`] for the first value that is not a number.
    pub fn from_args<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        if values.len() != NUM_FEATURES {
            return Err(PredictError::ArgumentCount {
                expected: NUM_FEATURES,
                got: values.len(),
            });
        }

        let mut parsed = [0.0_f64; NUM_FEATURES];
        for (slot, raw) in parsed.iter_mut().zip(values) {
            *slot = parse_measurement(raw.as_ref())?;
        }

        let [temperature, humidity, ph, rainfall] = parsed;
        Ok(Self::new(temperature, humidity, ph, rainfall))
    }

    /// Values in model input order.
    #[must_use]
    pub const fn as_row(&self) -> [f64; NUM_FEATURES] {
        [self.temperature, self.humidity, self.ph, self.rainfall]
    }

    /// Single-row `[1, 4]` batch at double precision.
    #[must_use]
    pub fn to_array_f64(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, NUM_FEATURES), |(_, j)| self.as_row()[j])
    }

    /// Single-row `[1, 4]` batch at single precision.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_array_f32(&self) -> Array2<f32> {
        self.to_array_f64().mapv(|v| v as f32)
    }
}

impl std::fmt::Display for SoilConditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "temperature={}, humidity={}, ph={}, rainfall={}",
            self.temperature, self.humidity, self.ph, self.rainfall
        )
    }
}

/// Parse one measurement, tolerating surrounding whitespace.
fn parse_measurement(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| PredictError::ArgumentType(raw.to_string()))
}
