//! Prediction handler

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::dataset::FEATURE_COLUMNS;
use crate::{AppError, AppResult, AppState};

const INVALID_JSON: &str = "Invalid JSON input. Please provide the data in JSON format.";

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(rename = "Downtime")]
    pub downtime: &'static str,
    #[serde(rename = "Confidence")]
    pub confidence: f64,
}

/// Classify a single record against the trained model.
///
/// The no-model check comes before body parsing, matching the endpoint's
/// contract that out-of-order calls fail with the no-model message.
pub async fn run(State(state): State<AppState>, body: Bytes) -> AppResult<Json<PredictResponse>> {
    let pipeline = state.pipeline.read().await;
    let model = pipeline.model().ok_or(AppError::NoModel)?;

    let input = parse_input(&body)?;

    let mut features = Vec::with_capacity(FEATURE_COLUMNS.len());
    for column in FEATURE_COLUMNS {
        let value = input
            .get(column)
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Missing or non-numeric value for '{}'", column))
            })?;
        features.push(value);
    }

    let prediction = model.predict(&features);
    Ok(Json(PredictResponse {
        downtime: if prediction.downtime { "Yes" } else { "No" },
        confidence: round2(prediction.confidence),
    }))
}

/// The body must be a non-empty flat JSON object.
fn parse_input(body: &[u8]) -> Result<serde_json::Map<String, Value>, AppError> {
    if body.is_empty() {
        return Err(AppError::InvalidInput(INVALID_JSON.to_string()));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::InvalidInput(INVALID_JSON.to_string()))?;

    match value {
        Value::Object(map) if !map.is_empty() => Ok(map),
        _ => Err(AppError::InvalidInput(INVALID_JSON.to_string())),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
