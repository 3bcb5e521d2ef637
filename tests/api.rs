//! End-to-end tests for the upload -> train -> predict pipeline.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use downtime_api::config::Config;
use downtime_api::{create_router, AppState};

const BOUNDARY: &str = "test-boundary";

fn test_app(dir: &TempDir) -> Router {
    let config = Config {
        port: 0,
        model_path: dir.path().join("model.json"),
        max_upload_bytes: 10 * 1024 * 1024,
    };
    create_router(AppState::new(config))
}

fn upload_request(csv: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"data.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

// Two well-separated temperature bands; downtime tracks the hot band.
fn sample_csv(rows: usize) -> String {
    let mut csv = String::from("Machine_ID,Temperature,Run_Time,Downtime_Flag\n");
    for i in 0..rows {
        let temperature = if i % 2 == 0 {
            60.0 + (i % 10) as f64
        } else {
            100.0 + (i % 10) as f64
        };
        let run_time = 60 + (i * 7) % 180;
        let downtime = u8::from(temperature >= 100.0);
        csv.push_str(&format!(
            "M{:03},{},{},{}\n",
            i, temperature, run_time, downtime
        ));
    }
    csv
}

#[tokio::test]
async fn upload_returns_the_column_list() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = send(&app, upload_request(&sample_csv(10))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data uploaded successfully!");
    assert_eq!(
        body["columns"],
        serde_json::json!(["Machine_ID", "Temperature", "Run_Time", "Downtime_Flag"])
    );
}

#[tokio::test]
async fn upload_missing_columns_lists_exactly_the_missing_names() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let csv = "Machine_ID,Temperature\nM001,80.5\n";
    let (status, body) = send(&app, upload_request(csv)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing columns: Run_Time, Downtime_Flag");
}

#[tokio::test]
async fn unparseable_upload_is_a_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    // Ragged row: header declares four fields, the record has two.
    let csv = "Machine_ID,Temperature,Run_Time,Downtime_Flag\nM001,80.5\n";
    let (status, body) = send(&app, upload_request(csv)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Could not parse the uploaded file as CSV");
}

#[tokio::test]
async fn train_before_upload_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = send(&app, post_empty("/train")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data uploaded. Please upload data first.");
}

#[tokio::test]
async fn predict_before_train_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = send(
        &app,
        post_json("/predict", r#"{"Temperature": 80, "Run_Time": 120}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No model trained. Please train a model first.");
}

#[tokio::test]
async fn training_twice_reports_identical_metrics() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, _) = send(&app, upload_request(&sample_csv(100))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, first) = send(&app, post_empty("/train")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = send(&app, post_empty("/train")).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(first["metrics"], second["metrics"]);
}

#[tokio::test]
async fn predict_returns_label_and_rounded_confidence() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    send(&app, upload_request(&sample_csv(100))).await;
    let (status, _) = send(&app, post_empty("/train")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        post_json("/predict", r#"{"Temperature": 105, "Run_Time": 120}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let downtime = body["Downtime"].as_str().unwrap();
    assert!(downtime == "Yes" || downtime == "No");

    let confidence = body["Confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
    // Rounded to 2 decimal places.
    assert!(((confidence * 100.0).round() - confidence * 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn predict_with_empty_body_is_invalid_json_not_a_server_error() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    send(&app, upload_request(&sample_csv(100))).await;
    send(&app, post_empty("/train")).await;

    for request in [post_empty("/predict"), post_json("/predict", "{}")] {
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Invalid JSON input. Please provide the data in JSON format."
        );
    }
}

#[tokio::test]
async fn predict_with_missing_feature_names_the_column() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    send(&app, upload_request(&sample_csv(100))).await;
    send(&app, post_empty("/train")).await;

    let (status, body) = send(&app, post_json("/predict", r#"{"Temperature": 80}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing or non-numeric value for 'Run_Time'");
}

#[tokio::test]
async fn end_to_end_pipeline() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, _) = send(&app, upload_request(&sample_csv(100))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, post_empty("/train")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Model trained successfully!");
    assert!(body["metrics"]["accuracy"].is_f64());
    assert!(body["metrics"]["f1_score"].is_f64());

    let (status, body) = send(
        &app,
        post_json("/predict", r#"{"Temperature": 80, "Run_Time": 120}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("Downtime").is_some());
    assert!(body.get("Confidence").is_some());
}

#[tokio::test]
async fn train_persists_the_model_file() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    send(&app, upload_request(&sample_csv(100))).await;
    let (status, _) = send(&app, post_empty("/train")).await;
    assert_eq!(status, StatusCode::OK);

    let path = dir.path().join("model.json");
    assert!(path.exists());
    let contents = std::fs::read_to_string(&path).unwrap();
    let model: Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        model["feature_columns"],
        serde_json::json!(["Temperature", "Run_Time"])
    );
}

#[tokio::test]
async fn new_upload_invalidates_the_model() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    send(&app, upload_request(&sample_csv(100))).await;
    let (status, _) = send(&app, post_empty("/train")).await;
    assert_eq!(status, StatusCode::OK);

    // Re-upload: the previous model was fit on discarded data.
    let (status, _) = send(&app, upload_request(&sample_csv(50))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        post_json("/predict", r#"{"Temperature": 80, "Run_Time": 120}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No model trained. Please train a model first.");
}

#[tokio::test]
async fn training_on_headers_only_upload_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let csv = "Machine_ID,Temperature,Run_Time,Downtime_Flag\n";
    let (status, _) = send(&app, upload_request(csv)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, post_empty("/train")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Training failed:"), "got: {message}");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"other\"\r\n\r\n\
         hello\r\n\
         --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing multipart field 'file'");
}

#[tokio::test]
async fn health_reports_pipeline_stage() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = send(
        &app,
        Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["dataset_loaded"], false);
    assert_eq!(body["model_trained"], false);
}
