//! Feature vector assembly
//!
//! Converts a validated form submission into the fixed-order vector the
//! model was trained on. The element order must never change.

use crate::error::{PredictionError, Result};
use crate::models::{FeatureVector, FormInput};
use crate::resources::CarNameTable;

/// Build the model input for one submission
pub fn build_feature_vector(input: &FormInput, cars: &CarNameTable) -> Result<FeatureVector> {
    let car_id = cars
        .get(&input.car_name)
        .ok_or_else(|| PredictionError::UnknownCarName(input.car_name.clone()))?;

    Ok(FeatureVector::new([
        input.year as f32,
        car_id as f32,
        input.transmission.code() as f32,
        flag(input.sunroof),
        flag(input.auto_retract),
        flag(input.electric_parking),
        flag(input.vehicle_stability),
        flag(input.auto_cruise),
    ]))
}

fn flag(present: bool) -> f32 {
    if present {
        1.0
    } else {
        0.0
    }
}
