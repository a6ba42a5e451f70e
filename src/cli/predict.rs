// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use crate::cli::args::Cli;
use crate::error::Result;
use crate::{InferenceConfig, NutrientModel, NutrientPrediction, Response, SoilConditions, VERSION};
use crate::{error, verbose, warn};

/// Run one prediction and build the JSON response.
///
/// Measurements are validated before the model is touched, so argument errors
/// never depend on the artifact being present.
pub fn run(args: &Cli) -> Response {
    let result = predict(args);
    if let Err(ref e) = result {
        error!("{e}");
    }
    Response::from(result)
}

fn predict(args: &Cli) -> Result<NutrientPrediction> {
    let conditions = SoilConditions::from_args(&args.values)?;
    verbose!("NPK inference {VERSION} 🌱 {conditions}");

    let mut config = InferenceConfig::new().with_threads(args.threads);
    if let Some(device) = &args.device {
        config = config.with_device(device.clone());
    }

    let mut model = NutrientModel::load_with_config(&args.model, config)?;
    let metadata = model.metadata();
    verbose!(
        "Loaded {} from {} (input '{}', {:?}, device {})",
        metadata.model_name(),
        model.model_path().display(),
        model.input_name(),
        metadata.input_precision,
        model.execution_provider()
    );
    if let Some(provenance) = metadata.provenance() {
        verbose!("Model {provenance}");
    }
    verbose!("Features: {}", metadata.features.join(", "));
    if !metadata.targets.is_empty() {
        verbose!("Targets: {}", metadata.targets.join(", "));
    }

    let prediction = model.predict(&conditions)?;
    if prediction.raw.len() < 3 {
        warn!(
            "Model returned {} value(s); missing nutrients are reported as null",
            prediction.raw.len()
        );
    }
    verbose!(
        "Speed: {:.1}ms load, {:.1}ms inference",
        prediction.speed.load.unwrap_or(0.0),
        prediction.speed.inference.unwrap_or(0.0)
    );

    Ok(prediction.nutrients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_wrong_count_response() {
        let cli = Cli::parse_from(["app", "--model", "nonexistent.onnx", "1", "2"]);
        let response = run(&cli);
        assert!(response.is_error());
        assert_eq!(
            response.to_json_line(),
            r#"{"error":"Invalid number of arguments"}"#
        );
    }

    #[test]
    fn test_non_numeric_response() {
        let cli = Cli::parse_from(["app", "--model", "nonexistent.onnx", "1", "x", "3", "4"]);
        let response = run(&cli);
        assert_eq!(response.to_json_line(), r#"{"error":"Invalid argument types"}"#);
    }

    #[test]
    fn test_prediction_response() {
        let model = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/npk_nitrogen_only.onnx");
        let cli = Cli::parse_from(["app", "--model", model, "24.5", "70", "6.5", "200"]);
        let response = run(&cli);
        assert_eq!(
            response.to_json_line(),
            r#"{"predicted_nitrogen":95.5,"predicted_phosphorus":null,"predicted_potassium":null}"#
        );
    }

    #[test]
    fn test_missing_model_response() {
        let cli = Cli::parse_from(["app", "--model", "nonexistent.onnx", "1", "2", "3", "4"]);
        match run(&cli) {
            Response::Error { error } => {
                assert!(error.starts_with("Model error: "));
                assert!(error.contains("nonexistent.onnx"));
            }
            Response::Prediction(p) => panic!("unexpected prediction: {p:?}"),
        }
    }
}
