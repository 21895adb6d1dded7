//! Input form description and submission parsing
//!
//! [`FormSpec`] describes the controls to render (choices, bounds and
//! defaults). [`FormSubmission`] is the raw, untrusted shape of a posted
//! form; converting it yields a validated [`FormInput`].

use crate::error::{PredictionError, Result};
use crate::models::{FormInput, Transmission};
use crate::resources::CarNameTable;
use serde::{Deserialize, Serialize};

/// Lowest selectable manufacturing year
pub const YEAR_MIN: i32 = 2000;

/// Highest selectable manufacturing year
pub const YEAR_MAX: i32 = 2025;

/// Year preselected on a fresh form
pub const DEFAULT_YEAR: i32 = 2018;

/// Sole option shown when no car names are available
pub const EMPTY_TABLE_PLACEHOLDER: &str = "Data Kosong";

/// One boolean toggle on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureFlag {
    /// Form field name
    pub field: &'static str,
    /// Label shown next to the checkbox
    pub label: &'static str,
}

/// The five optional features, in display order
pub const FEATURE_FLAGS: [FeatureFlag; 5] = [
    FeatureFlag { field: "sunroof", label: "Sun Roof" },
    FeatureFlag { field: "auto_retract", label: "Auto Retract Mirror" },
    FeatureFlag { field: "electric_parking", label: "Electric Parking Brake" },
    FeatureFlag { field: "vehicle_stability", label: "Vehicle Stability Control" },
    FeatureFlag { field: "auto_cruise", label: "Auto Cruise Control" },
];

/// Car model options offered to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarChoices {
    pub options: Vec<String>,
    /// True when `options` only holds the disabled placeholder
    pub placeholder: bool,
}

/// Controls of the prediction form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSpec {
    pub cars: CarChoices,
    pub year_min: i32,
    pub year_max: i32,
    pub default_year: i32,
    pub transmissions: [Transmission; 2],
    pub default_transmission: Transmission,
    pub flags: [FeatureFlag; 5],
}

impl FormSpec {
    /// Describe the form for the given table; `None` means it failed to load
    pub fn new(cars: Option<&CarNameTable>) -> Self {
        let options: Vec<String> = cars
            .map(|table| table.names().map(str::to_string).collect())
            .unwrap_or_default();

        let cars = if options.is_empty() {
            CarChoices {
                options: vec![EMPTY_TABLE_PLACEHOLDER.to_string()],
                placeholder: true,
            }
        } else {
            CarChoices {
                options,
                placeholder: false,
            }
        };

        Self {
            cars,
            year_min: YEAR_MIN,
            year_max: YEAR_MAX,
            default_year: DEFAULT_YEAR,
            transmissions: Transmission::ALL,
            default_transmission: Transmission::default(),
            flags: FEATURE_FLAGS,
        }
    }

    /// Check the fields whose domain the form controls enforce
    ///
    /// The car name is left to the table lookup; a blank name is a valid key
    /// when the table has a blank row.
    pub fn validate(&self, input: &FormInput) -> Result<()> {
        if !(self.year_min..=self.year_max).contains(&input.year) {
            return Err(PredictionError::InvalidInput(format!(
                "year {} is outside {}-{}",
                input.year, self.year_min, self.year_max
            )));
        }
        Ok(())
    }

    /// The form's initial values
    pub fn defaults(&self) -> FormValues {
        FormValues {
            car_name: self.cars.options.first().cloned().unwrap_or_default(),
            year: self.default_year.to_string(),
            transmission: self.default_transmission,
            flags: [false; 5],
        }
    }
}

/// Values to prefill the rendered form with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub car_name: String,
    pub year: String,
    pub transmission: Transmission,
    pub flags: [bool; 5],
}

/// A posted form, exactly as received
///
/// Checkboxes are only sent when ticked, so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormSubmission {
    pub model: Option<String>,
    pub year: Option<String>,
    pub transmission: Option<String>,
    pub sunroof: Option<String>,
    pub auto_retract: Option<String>,
    pub electric_parking: Option<String>,
    pub vehicle_stability: Option<String>,
    pub auto_cruise: Option<String>,
}

impl FormSubmission {
    /// Parse and validate against the form's domains
    pub fn parse(&self, spec: &FormSpec) -> Result<FormInput> {
        let car_name = self
            .model
            .clone()
            .ok_or_else(|| PredictionError::InvalidInput("car model is required".to_string()))?;

        let year = match self.year.as_deref().map(str::trim) {
            None | Some("") => spec.default_year,
            Some(raw) => raw.parse::<i32>().map_err(|_| {
                PredictionError::InvalidInput(format!("year '{}' is not a whole number", raw))
            })?,
        };

        let transmission = match self.transmission.as_deref() {
            None | Some("") => spec.default_transmission,
            Some(raw) => raw
                .parse::<Transmission>()
                .map_err(PredictionError::InvalidInput)?,
        };

        let input = FormInput {
            car_name,
            year,
            transmission,
            sunroof: checkbox(&self.sunroof),
            auto_retract: checkbox(&self.auto_retract),
            electric_parking: checkbox(&self.electric_parking),
            vehicle_stability: checkbox(&self.vehicle_stability),
            auto_cruise: checkbox(&self.auto_cruise),
        };
        spec.validate(&input)?;
        Ok(input)
    }

    /// Values to redisplay after a submission, valid or not
    pub fn values(&self, spec: &FormSpec) -> FormValues {
        let defaults = spec.defaults();
        FormValues {
            car_name: self.model.clone().unwrap_or(defaults.car_name),
            year: self.year.clone().unwrap_or(defaults.year),
            transmission: self
                .transmission
                .as_deref()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.transmission),
            flags: [
                checkbox(&self.sunroof),
                checkbox(&self.auto_retract),
                checkbox(&self.electric_parking),
                checkbox(&self.vehicle_stability),
                checkbox(&self.auto_cruise),
            ],
        }
    }
}

fn checkbox(value: &Option<String>) -> bool {
    match value.as_deref().map(str::trim) {
        None => false,
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "" | "false" | "off" | "0"),
    }
}
