//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    dataset_loaded: bool,
    model_trained: bool,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pipeline = state.pipeline.read().await;
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        dataset_loaded: pipeline.dataset().is_some(),
        model_trained: pipeline.model().is_some(),
    })
}
