//! Observability infrastructure for the price predictor
//!
//! Provides:
//! - Prometheus metrics (inference latency, prediction counts, error
//!   categories, car table size, model version)
//! - Structured JSON logging with tracing

use crate::error::{ErrorCategory, ResourceLoadError};
use crate::models::FormInput;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, GaugeVec, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PricingMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct PricingMetricsInner {
    inference_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounterVec,
    car_table_entries: IntGauge,
    model_version_info: GaugeVec,
}

impl PricingMetricsInner {
    fn new() -> Self {
        Self {
            inference_latency_seconds: register_histogram!(
                "price_predictor_inference_latency_seconds",
                "Time spent running model inference for one submission",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register inference_latency_seconds"),

            predictions_total: register_int_counter!(
                "price_predictor_predictions_total",
                "Total number of prices shown to users"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "price_predictor_prediction_errors_total",
                "Total number of failed submissions by error category",
                &["category"]
            )
            .expect("Failed to register prediction_errors_total"),

            car_table_entries: register_int_gauge!(
                "price_predictor_car_table_entries",
                "Number of distinct car names offered on the form"
            )
            .expect("Failed to register car_table_entries"),

            model_version_info: register_gauge_vec!(
                "price_predictor_model_version_info",
                "Information about the currently loaded price model",
                &["version"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct PricingMetrics {
    _private: (),
}

impl Default for PricingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PricingMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PricingMetricsInner {
        GLOBAL_METRICS.get_or_init(PricingMetricsInner::new)
    }

    pub fn observe_inference_latency(&self, duration_secs: f64) {
        self.inner().inference_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self, category: ErrorCategory) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[category.as_str()])
            .inc();
    }

    pub fn set_car_table_entries(&self, count: usize) {
        self.inner().car_table_entries.set(count as i64);
    }

    /// Update model version info
    pub fn set_model_version(&self, version: &str) {
        // Reset previous version
        self.inner().model_version_info.reset();
        self.inner()
            .model_version_info
            .with_label_values(&[version])
            .set(1.0);
    }

    pub fn predictions_total(&self) -> u64 {
        self.inner().predictions_total.get()
    }

    pub fn prediction_errors(&self, category: ErrorCategory) -> u64 {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[category.as_str()])
            .get()
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for predictions, resource
/// loading and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log a successful prediction
    pub fn log_prediction(&self, input: &FormInput, amount: i64, model_version: &str) {
        info!(
            event = "prediction_generated",
            instance = %self.instance,
            car_name = %input.car_name,
            year = input.year,
            transmission = %input.transmission,
            sunroof = input.sunroof,
            auto_retract = input.auto_retract,
            electric_parking = input.electric_parking,
            vehicle_stability = input.vehicle_stability,
            auto_cruise = input.auto_cruise,
            amount = amount,
            model_version = %model_version,
            "Generated price prediction"
        );
    }

    /// Log a failed submission
    pub fn log_prediction_failure(&self, category: ErrorCategory, details: &str) {
        match category {
            ErrorCategory::Inference | ErrorCategory::ResourceLoad => {
                warn!(
                    event = "prediction_failed",
                    instance = %self.instance,
                    category = category.as_str(),
                    details = %details,
                    "Prediction failed"
                );
            }
            _ => {
                info!(
                    event = "prediction_failed",
                    instance = %self.instance,
                    category = category.as_str(),
                    details = %details,
                    "Submission rejected"
                );
            }
        }
    }

    /// Log a resource that became available
    pub fn log_resource_loaded(&self, resource: &str, detail: &str) {
        info!(
            event = "resource_loaded",
            instance = %self.instance,
            resource = %resource,
            detail = %detail,
            "Resource loaded"
        );
    }

    /// Log a resource that could not be loaded
    pub fn log_resource_failure(&self, error: &ResourceLoadError) {
        warn!(
            event = "resource_load_failed",
            instance = %self.instance,
            resource = %error.kind,
            path = %error.path.display(),
            reason = %error.reason,
            "Resource unavailable, predictions disabled"
        );
    }

    /// Log the outcome of startup validation
    pub fn log_startup_validation(&self, check: &str, passed: bool, details: &str) {
        if passed {
            info!(
                event = "startup_validation",
                instance = %self.instance,
                check = %check,
                passed = true,
                details = %details,
                "Startup check passed"
            );
        } else {
            warn!(
                event = "startup_validation",
                instance = %self.instance,
                check = %check,
                passed = false,
                details = %details,
                "Startup check failed"
            );
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, listen_addr: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            listen_addr = %listen_addr,
            "Price predictor started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Price predictor shutting down"
        );
    }
}
