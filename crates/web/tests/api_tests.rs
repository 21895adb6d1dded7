//! Integration tests for the HTTP endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use price_predictor::api::{create_router, AppState};
use pricing_lib::{
    health::{components, HealthRegistry},
    observability::{PricingMetrics, StructuredLogger},
    predictor::PriceModel,
    CarNameTable, FeatureVector, PredictionError, PricingService, ResourceLoadError,
    ResourceLoader, ResourceSource,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

/// Model answering every request with the same value
struct FixedModel(Result<f64, String>);

impl PriceModel for FixedModel {
    fn predict(&self, _features: &FeatureVector) -> pricing_lib::error::Result<f64> {
        self.0.clone().map_err(PredictionError::Inference)
    }

    fn version(&self) -> &str {
        "fixed"
    }
}

struct MemorySource {
    model: Option<Result<f64, String>>,
    cars: Vec<&'static str>,
}

impl ResourceSource for MemorySource {
    fn load_model(&self) -> Result<Box<dyn PriceModel>, ResourceLoadError> {
        match &self.model {
            Some(response) => Ok(Box::new(FixedModel(response.clone()))),
            None => Err(ResourceLoadError::model(
                Path::new("models/car_price.onnx"),
                "No such file or directory",
            )),
        }
    }

    fn load_car_table(&self) -> Result<CarNameTable, ResourceLoadError> {
        Ok(CarNameTable::from_names(self.cars.iter().copied()))
    }
}

async fn setup_app(source: MemorySource) -> (Router, Arc<AppState>) {
    let loader = Arc::new(ResourceLoader::new(source));
    let service = Arc::new(PricingService::new(loader, StructuredLogger::new("test")));

    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODEL).await;
    health_registry.register(components::CAR_TABLE).await;
    health_registry.register(components::PREDICTOR).await;

    let state = Arc::new(AppState::new(service, health_registry));
    (create_router(state.clone()), state)
}

fn working(price: f64) -> MemorySource {
    MemorySource {
        model: Some(Ok(price)),
        cars: vec!["Avanza", "Innova"],
    }
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let json = serde_json::from_str(&body_string(response).await).unwrap();
    (status, json)
}

fn avanza() -> serde_json::Value {
    serde_json::json!({
        "model": "Avanza",
        "year": 2018,
        "transmission": "Manual",
        "sunroof": true,
        "vehicle_stability": true
    })
}

#[tokio::test]
async fn test_index_lists_cars_and_defaults() {
    let (app, _state) = setup_app(working(1.0)).await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<option value=\"Avanza\" selected>Avanza</option>"));
    assert!(html.contains("<option value=\"Innova\">Innova</option>"));
    assert!(html.contains("value=\"2018\""));
    assert!(html.contains("value=\"Manual\" checked"));
}

#[tokio::test]
async fn test_index_escapes_car_names() {
    let (app, _state) = setup_app(MemorySource {
        model: Some(Ok(1.0)),
        cars: vec!["<script>alert(1)</script>"],
    })
    .await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let html = body_string(response).await;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_form_post_renders_price() {
    let (app, _state) = setup_app(working(12_345_678.9)).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "model=Innova&year=2020&transmission=Automatic&sunroof=on",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Prediksi Selesai!"));
    assert!(html.contains("Rp 12.345.678"));
    // submitted values are kept
    assert!(html.contains("<option value=\"Innova\" selected>Innova</option>"));
    assert!(html.contains("value=\"2020\""));
    assert!(html.contains("value=\"Automatic\" checked"));
    assert!(html.contains("name=\"sunroof\" value=\"on\" checked"));
}

#[tokio::test]
async fn test_form_post_shows_validation_error() {
    let (app, _state) = setup_app(working(1.0)).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("model=Avanza&year=1999&transmission=Manual"))
                .unwrap(),
        )
        .await
        .unwrap();

    let html = body_string(response).await;
    assert!(html.contains("Input tidak valid"));
    assert!(!html.contains("Prediksi Selesai!"));
}

#[tokio::test]
async fn test_api_cars() {
    let (app, _state) = setup_app(working(1.0)).await;

    let response = app
        .oneshot(Request::builder().uri("/api/cars").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["cars"], serde_json::json!(["Avanza", "Innova"]));
    assert_eq!(json["placeholder"], false);
}

#[tokio::test]
async fn test_api_cars_placeholder_when_table_empty() {
    let (app, _state) = setup_app(MemorySource {
        model: Some(Ok(1.0)),
        cars: vec![],
    })
    .await;

    let response = app
        .oneshot(Request::builder().uri("/api/cars").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["cars"], serde_json::json!(["Data Kosong"]));
    assert_eq!(json["placeholder"], true);
}

#[tokio::test]
async fn test_api_predict_success() {
    let (app, _state) = setup_app(working(150_000_000.0)).await;
    let metrics = PricingMetrics::new();
    let before = metrics.predictions_total();

    let (status, json) = post_json(app, avanza()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["amount"], 150_000_000);
    assert_eq!(json["formatted"], "Rp 150.000.000");
    assert_eq!(json["label"], "Estimasi Harga Jual");
    assert!(metrics.predictions_total() > before);
}

#[tokio::test]
async fn test_api_predict_unknown_car() {
    let (app, _state) = setup_app(working(1.0)).await;

    let mut input = avanza();
    input["model"] = serde_json::json!("Civic");
    let (status, json) = post_json(app, input).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], "error");
    assert_eq!(json["category"], "unknown_car_name");
}

#[tokio::test]
async fn test_api_predict_invalid_year() {
    let (app, _state) = setup_app(working(1.0)).await;

    let mut input = avanza();
    input["year"] = serde_json::json!(2026);
    let (status, json) = post_json(app, input).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["category"], "invalid_input");
}

async fn post_raw(app: Router, body: &'static str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let json = serde_json::from_str(&body_string(response).await).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_api_predict_unknown_transmission_is_categorized() {
    let (app, _state) = setup_app(working(1.0)).await;

    let mut input = avanza();
    input["transmission"] = serde_json::json!("CVT");
    let (status, json) = post_json(app, input).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], "error");
    assert_eq!(json["category"], "invalid_input");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Input tidak valid: "));
}

#[tokio::test]
async fn test_api_predict_undecodable_bodies_are_categorized() {
    for body in [
        r#"{"year":2018,"transmission":"Manual"}"#,
        r#"{"model":"Avanza","year":"2018","transmission":"Manual"}"#,
        r#"{"model":"Avanza""#,
    ] {
        let (app, _state) = setup_app(working(1.0)).await;
        let (status, json) = post_raw(app, body).await;

        assert!(status.is_client_error(), "{}", body);
        assert_eq!(json["category"], "invalid_input", "{}", body);
    }
}

#[tokio::test]
async fn test_api_predict_model_missing() {
    let (app, _state) = setup_app(MemorySource {
        model: None,
        cars: vec!["Avanza"],
    })
    .await;

    let (status, json) = post_json(app, avanza()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["category"], "resource_load");
    assert_eq!(
        json["message"],
        "Model belum dimuat, tidak bisa melakukan prediksi."
    );
}

#[tokio::test]
async fn test_api_predict_inference_failure() {
    let (app, _state) = setup_app(MemorySource {
        model: Some(Err("unexpected input shape".to_string())),
        cars: vec!["Avanza"],
    })
    .await;

    let (status, json) = post_json(app, avanza()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["category"], "inference");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Terjadi kesalahan saat memprediksi:"));
}

#[tokio::test]
async fn test_healthz_reflects_startup_checks() {
    let (app, state) = setup_app(MemorySource {
        model: None,
        cars: vec!["Avanza"],
    })
    .await;

    for check in state.service.startup_checks() {
        state
            .health_registry
            .update(check.component, check.health)
            .await;
    }

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let health: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health["status"], "unhealthy");
    assert_eq!(health["components"]["model"]["status"], "unhealthy");
    assert_eq!(health["components"]["car_table"]["status"], "healthy");
}

#[tokio::test]
async fn test_healthz_ok_when_degraded() {
    let (app, state) = setup_app(working(1.0)).await;
    state
        .health_registry
        .set_degraded(components::CAR_TABLE, "2 duplicate car names, last row wins")
        .await;

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Degraded still returns 200 (operational)
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readyz() {
    let (app, state) = setup_app(working(1.0)).await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    state.health_registry.set_ready(true).await;

    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let readiness: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _state) = setup_app(working(1.0)).await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_string(response).await;
    assert!(text.contains("price_predictor_predictions_total"));
    assert!(text.contains("price_predictor_car_table_entries"));
}
