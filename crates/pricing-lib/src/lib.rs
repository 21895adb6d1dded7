//! Core library for used-car price prediction
//!
//! This crate provides the core functionality for:
//! - Loading the trained model and the car name table once per process
//! - Describing and validating the prediction form
//! - Building the model's feature vector and running inference
//! - Presenting prices and categorized errors
//! - Health checks and observability

pub mod error;
pub mod form;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod presenter;
pub mod resources;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{ErrorCategory, PredictionError, ResourceKind, ResourceLoadError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{PricingMetrics, StructuredLogger};
pub use presenter::DisplayOutput;
pub use resources::{CarNameTable, FileSource, ResourceLoader, ResourceSource};
pub use service::{PricingService, StartupCheck, SubmissionOutcome, SubmissionStage};
