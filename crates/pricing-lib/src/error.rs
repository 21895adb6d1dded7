//! Error types for the pricing pipeline
//!
//! Every failure of a submission cycle is one of the variants of
//! [`PredictionError`]. The web layer turns them into user-facing messages
//! through the presenter; nothing here is allowed to abort the process.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The two read-only resources the service depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Model,
    CarTable,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Model => write!(f, "model"),
            ResourceKind::CarTable => write!(f, "car table"),
        }
    }
}

/// A resource could not be read or deserialized
///
/// Cloneable so that a memoized failure can be handed out to every caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to load {kind} from {}: {reason}", path.display())]
pub struct ResourceLoadError {
    pub kind: ResourceKind,
    pub path: PathBuf,
    pub reason: String,
}

impl ResourceLoadError {
    pub fn new(kind: ResourceKind, path: &Path, reason: impl fmt::Display) -> Self {
        Self {
            kind,
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn model(path: &Path, reason: impl fmt::Display) -> Self {
        Self::new(ResourceKind::Model, path, reason)
    }

    pub fn car_table(path: &Path, reason: impl fmt::Display) -> Self {
        Self::new(ResourceKind::CarTable, path, reason)
    }
}

/// Errors that can occur during one prediction cycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Model or car table is unavailable
    #[error(transparent)]
    ResourceLoad(#[from] ResourceLoadError),

    /// Car table loaded but holds no rows
    #[error("Car table is empty")]
    EmptyCarTable,

    /// Submitted car name is not a key of the car table
    #[error("Unknown car name: {0}")]
    UnknownCarName(String),

    /// Raw submission is outside the form's domains
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The model rejected the feature vector or returned nothing usable
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl PredictionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PredictionError::ResourceLoad(_) | PredictionError::EmptyCarTable => {
                ErrorCategory::ResourceLoad
            }
            PredictionError::UnknownCarName(_) => ErrorCategory::UnknownCarName,
            PredictionError::InvalidInput(_) => ErrorCategory::InvalidInput,
            PredictionError::Inference(_) => ErrorCategory::Inference,
        }
    }
}

/// Coarse error classes shown to users and used as metric labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    ResourceLoad,
    UnknownCarName,
    InvalidInput,
    Inference,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::ResourceLoad => "resource_load",
            ErrorCategory::UnknownCarName => "unknown_car_name",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Inference => "inference",
        }
    }
}

/// Result type for pricing operations
pub type Result<T> = std::result::Result<T, PredictionError>;
