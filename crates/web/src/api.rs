//! HTTP API: form page, prediction endpoints, health checks and metrics

use crate::page;
use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use pricing_lib::{
    form::FormSubmission,
    health::HealthRegistry,
    presenter::DisplayOutput,
    ErrorCategory, FormInput, PricingService,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PricingService>,
    pub health_registry: HealthRegistry,
}

impl AppState {
    pub fn new(service: Arc<PricingService>, health_registry: HealthRegistry) -> Self {
        Self {
            service,
            health_registry,
        }
    }
}

/// Blank form with default values
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let spec = state.service.form_spec();
    let values = spec.defaults();
    Html(page::render(&spec, &values, None))
}

/// Form post: the page again, with the submitted values and the outcome
async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(raw): Form<FormSubmission>,
) -> Html<String> {
    let outcome = state.service.submit_form(&raw);
    let spec = state.service.form_spec();
    let values = raw.values(&spec);
    Html(page::render(&spec, &values, Some(&outcome.output)))
}

#[derive(Debug, Serialize)]
struct CarsResponse {
    cars: Vec<String>,
    placeholder: bool,
}

/// Car names offered on the form
async fn cars(State(state): State<Arc<AppState>>) -> Json<CarsResponse> {
    let spec = state.service.form_spec();
    Json(CarsResponse {
        cars: spec.cars.options,
        placeholder: spec.cars.placeholder,
    })
}

/// JSON prediction endpoint; undecodable bodies become `invalid_input`
async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FormInput>, JsonRejection>,
) -> impl IntoResponse {
    let outcome = match payload {
        Ok(Json(input)) => state.service.submit(&input),
        Err(rejection) => state.service.submit_malformed(rejection.body_text()),
    };
    let status_code = match &outcome.output {
        DisplayOutput::Success { .. } => StatusCode::OK,
        DisplayOutput::Error { category, .. } => status_for(*category),
    };
    (status_code, Json(outcome.output))
}

fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::ResourceLoad => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCategory::UnknownCarName | ErrorCategory::InvalidInput => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorCategory::Inference => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn available(up: bool) -> StatusCode {
    if up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Component health; degraded components still answer 200
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;
    (available(health.status.is_operational()), Json(health))
}

/// Readiness; 503 until startup finishes or while a component is down
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;
    (available(readiness.ready), Json(readiness))
}

/// Prometheus text exposition of the default registry
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&prometheus::gather(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            buffer,
        ),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string())],
                Vec::new(),
            )
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(submit_form))
        .route("/api/cars", get(cars))
        .route("/api/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server, stopping when `shutdown` resolves
pub async fn serve<F>(port: u16, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
