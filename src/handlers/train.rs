//! Training handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::ml::metrics::Metrics;
use crate::ml::training;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub message: &'static str,
    pub metrics: Metrics,
}

/// Fit a classifier on the stored dataset and install it in the model slot.
///
/// Holds the pipeline write lock across the fit so the dataset cannot be
/// swapped out mid-training.
pub async fn run(State(state): State<AppState>) -> AppResult<Json<TrainResponse>> {
    let mut pipeline = state.pipeline.write().await;
    let dataset = pipeline.dataset().ok_or(AppError::NoData)?;

    let (model, metrics) = training::train(dataset)?;

    model
        .save(&state.config.model_path)
        .map_err(|e| AppError::InternalError(format!("Failed to persist model: {}", e)))?;

    tracing::info!(
        accuracy = metrics.accuracy,
        f1_score = metrics.f1_score,
        path = %state.config.model_path.display(),
        "Model trained"
    );
    pipeline.install_model(model);

    Ok(Json(TrainResponse {
        message: "Model trained successfully!",
        metrics,
    }))
}
