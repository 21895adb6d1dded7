//! ML prediction engine

mod features;
mod inference;

pub use features::build_feature_vector;
pub use inference::{OnnxPriceModel, MAX_INFERENCE_MS};

use crate::error::{PredictionError, Result};
use crate::models::{FeatureVector, PriceEstimate};

/// Trait for trained price models
///
/// Implementations accept exactly one 8-element feature vector and return a
/// single scalar. Nothing else about the algorithm is assumed.
pub trait PriceModel: Send + Sync {
    /// Run inference on one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Identifier of the loaded artifact
    fn version(&self) -> &str;
}

/// Ask the model for a price, rejecting values that cannot be shown
pub fn predict(features: &FeatureVector, model: &dyn PriceModel) -> Result<PriceEstimate> {
    let value = model.predict(features)?;
    if !value.is_finite() {
        return Err(PredictionError::Inference(format!(
            "model returned a non-finite value ({})",
            value
        )));
    }
    Ok(PriceEstimate(value))
}
