//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::dataset::DatasetError;
use crate::ml::training::TrainError;

pub type AppResult<T> = Result<T, AppError>;

/// Closed set of client-visible failures.
///
/// Messages are stable strings; raw parser/IO diagnostics only go to the
/// server-side logs.
#[derive(Debug)]
pub enum AppError {
    // Upload errors
    MissingColumns(Vec<String>),
    CsvParse(String),

    // Pipeline-order errors
    NoData,
    NoModel,

    // Predict errors
    InvalidInput(String),

    // Train errors
    Training(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::MissingColumns(columns) => (
                StatusCode::BAD_REQUEST,
                format!("Missing columns: {}", columns.join(", ")),
            ),
            AppError::CsvParse(msg) => {
                tracing::warn!("Rejected unparseable upload: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    "Could not parse the uploaded file as CSV".to_string(),
                )
            }
            AppError::NoData => (
                StatusCode::BAD_REQUEST,
                "No data uploaded. Please upload data first.".to_string(),
            ),
            AppError::NoModel => (
                StatusCode::BAD_REQUEST,
                "No model trained. Please train a model first.".to_string(),
            ),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Training(msg) => {
                (StatusCode::BAD_REQUEST, format!("Training failed: {}", msg))
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));

        (status, body).into_response()
    }
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::MissingColumns(columns) => AppError::MissingColumns(columns),
            DatasetError::Parse(msg) => AppError::CsvParse(msg),
            other => AppError::Training(other.to_string()),
        }
    }
}

impl From<TrainError> for AppError {
    fn from(err: TrainError) -> Self {
        match err {
            TrainError::Dataset(inner) => inner.into(),
            other => AppError::Training(other.to_string()),
        }
    }
}
