//! Dataset upload handler

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::dataset::Dataset;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub columns: Vec<String>,
}

/// Accept a multipart CSV upload into the dataset slot.
pub async fn accept(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart request: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Could not read upload: {}", e)))?;

        let dataset = Dataset::from_csv(&bytes)?;
        let columns = dataset.columns().to_vec();
        tracing::info!(
            rows = dataset.num_rows(),
            columns = columns.len(),
            "Dataset uploaded"
        );

        let mut pipeline = state.pipeline.write().await;
        pipeline.load_dataset(dataset);

        return Ok(Json(UploadResponse {
            message: "Data uploaded successfully!",
            columns,
        }));
    }

    Err(AppError::InvalidInput(
        "Missing multipart field 'file'".to_string(),
    ))
}
