//! Core data models for the price predictor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of input features expected by the model
pub const FEATURE_COUNT: usize = 8;

/// Gearbox type as offered on the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transmission {
    #[default]
    Manual,
    Automatic,
}

impl Transmission {
    /// All choices, in the order the form lists them
    pub const ALL: [Transmission; 2] = [Transmission::Manual, Transmission::Automatic];

    /// Numeric code used during training: Automatic = 0, Manual = 1
    pub fn code(&self) -> u8 {
        match self {
            Transmission::Automatic => 0,
            Transmission::Manual => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Manual => "Manual",
            Transmission::Automatic => "Automatic",
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transmission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Transmission::Manual),
            "automatic" => Ok(Transmission::Automatic),
            other => Err(format!("unknown transmission '{}'", other)),
        }
    }
}

/// One form submission, already parsed into typed fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(rename = "model")]
    pub car_name: String,
    pub year: i32,
    pub transmission: Transmission,
    #[serde(default)]
    pub sunroof: bool,
    #[serde(default)]
    pub auto_retract: bool,
    #[serde(default)]
    pub electric_parking: bool,
    #[serde(default)]
    pub vehicle_stability: bool,
    #[serde(default)]
    pub auto_cruise: bool,
}

/// Feature vector for ML inference
///
/// Order matches the training columns: year, car name, transmission,
/// sun roof, auto retract mirror, electric parking brake, vehicle stability
/// control, auto cruise control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn values(&self) -> [f32; FEATURE_COUNT] {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Raw price estimate returned by the model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceEstimate(pub f64);

impl PriceEstimate {
    pub fn value(&self) -> f64 {
        self.0
    }
}
