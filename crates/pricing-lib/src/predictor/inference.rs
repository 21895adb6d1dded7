//! ONNX inference using tract
//!
//! The trained regressor is exported to ONNX and executed with tract. The
//! input fact is pinned to `f32 [1, 8]` at load time, so an artifact built
//! for a different feature count is rejected before it can serve requests.

use super::PriceModel;
use crate::error::{PredictionError, ResourceLoadError, Result};
use crate::models::{FeatureVector, FEATURE_COUNT};
use anyhow::Context;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::{Duration, Instant};
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning (5ms target)
pub const MAX_INFERENCE_MS: u64 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based price model
pub struct OnnxPriceModel {
    plan: TractModel,
    version: String,
    slow_threshold: Duration,
}

impl OnnxPriceModel {
    /// Create a model from serialized ONNX bytes
    ///
    /// The version is the hex SHA-256 of the bytes.
    pub fn from_bytes(model_bytes: &[u8]) -> TractResult<Self> {
        let plan = Self::load_plan(model_bytes)?;
        Ok(Self {
            plan,
            version: hex::encode(Sha256::digest(model_bytes)),
            slow_threshold: Duration::from_millis(MAX_INFERENCE_MS),
        })
    }

    /// Read and compile a model file
    pub fn from_path(path: &Path) -> std::result::Result<Self, ResourceLoadError> {
        let bytes = std::fs::read(path).map_err(|e| ResourceLoadError::model(path, e))?;
        Self::from_bytes(&bytes).map_err(|e| ResourceLoadError::model(path, format!("{:#}", e)))
    }

    /// Override the latency above which an inference is reported as slow
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Load and optimize an ONNX model from bytes
    fn load_plan(model_bytes: &[u8]) -> TractResult<TractModel> {
        tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")
    }

    fn features_to_tensor(features: &FeatureVector) -> TractResult<Tensor> {
        Tensor::from_shape(&[1, FEATURE_COUNT], features.as_slice())
    }

    /// First element of the first output, widened to f64 without rounding
    fn first_output(outputs: &TVec<TValue>) -> TractResult<f64> {
        let output = outputs.first().context("No output from model")?;
        let output = output.cast_to::<f64>()?;
        output
            .as_slice::<f64>()?
            .first()
            .copied()
            .context("Model output is empty")
    }
}

impl PriceModel for OnnxPriceModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let start = Instant::now();

        let input = Self::features_to_tensor(features)
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;
        let value =
            Self::first_output(&outputs).map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;

        let elapsed = start.elapsed();
        if elapsed > self.slow_threshold {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "Inference exceeded latency target"
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros() as u64, "Inference completed");
        }

        Ok(value)
    }

    fn version(&self) -> &str {
        &self.version
    }
}
