//! Price Predictor - used-car price estimation service
//!
//! Loads the trained model and the car name table once, then serves the
//! prediction form and a JSON API.

use anyhow::Result;
use price_predictor::{api, config::AppConfig};
use pricing_lib::{
    health::{components, HealthRegistry},
    observability::StructuredLogger,
    FileSource, PricingService, ResourceLoader,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting price-predictor");

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        instance = %config.instance_name,
        model_path = %config.model_path.display(),
        car_table_path = %config.car_table_path.display(),
        "Service configured"
    );

    let mut source = FileSource::new(&config.model_path, &config.car_table_path)
        .with_slow_inference(Duration::from_millis(config.slow_inference_ms));
    if let Some(column) = &config.car_name_column {
        source = source.with_car_name_column(column);
    }

    let logger = StructuredLogger::new(&config.instance_name);
    let loader = Arc::new(ResourceLoader::new(source));
    let service = Arc::new(
        PricingService::new(loader, logger.clone()).with_max_car_id(config.max_car_id),
    );

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODEL).await;
    health_registry.register(components::CAR_TABLE).await;
    health_registry.register(components::PREDICTOR).await;

    // Load resources up front; failures are reported, not fatal
    for check in service.startup_checks() {
        health_registry.update(check.component, check.health).await;
    }

    let app_state = Arc::new(api::AppState::new(service, health_registry.clone()));

    health_registry.set_ready(true).await;

    let listen_addr = format!("0.0.0.0:{}", config.port);
    logger.log_startup(SERVICE_VERSION, &listen_addr);

    api::serve(config.port, app_state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
