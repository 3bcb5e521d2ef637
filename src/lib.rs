//! Downtime prediction API
//!
//! A small JSON-over-HTTP service around a single dataset slot and a single
//! model slot:
//!
//! ```text
//! POST /upload   multipart CSV  ->  dataset slot
//! POST /train    dataset slot   ->  fitted decision tree + metrics
//! POST /predict  JSON record    ->  {"Downtime", "Confidence"}
//! GET  /health   liveness + pipeline stage
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod handlers;
pub mod ml;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};
pub use state::AppState;

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/upload", post(handlers::upload::accept))
        .route("/train", post(handlers::train::run))
        .route("/predict", post(handlers::predict::run))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
