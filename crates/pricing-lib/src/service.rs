//! Submission cycle
//!
//! Runs one form submission through collection, feature building,
//! inference and presentation:
//!
//! ```text
//! Idle -> Submitted -> Building -> Predicting -> Presenting -> Idle
//!              \            \            \
//!               +------------+------------+--> Failed -> Idle
//! ```
//!
//! Only the memoized resources outlive a cycle.

use crate::error::{PredictionError, Result};
use crate::form::{FormSpec, FormSubmission, DEFAULT_YEAR};
use crate::health::{components, ComponentHealth};
use crate::models::{FormInput, PriceEstimate, Transmission};
use crate::observability::{PricingMetrics, StructuredLogger};
use crate::predictor::{build_feature_vector, predict, PriceModel};
use crate::presenter::{present, DisplayOutput};
use crate::resources::{CarNameTable, ResourceLoader};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Stages of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Idle,
    Submitted,
    Building,
    Predicting,
    Presenting,
    Failed,
}

/// Result of one submission plus the stages it went through
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub output: DisplayOutput,
    pub stages: Vec<SubmissionStage>,
}

impl SubmissionOutcome {
    /// Whether the cycle passed through `stage`
    pub fn reached(&self, stage: SubmissionStage) -> bool {
        self.stages.contains(&stage)
    }
}

struct Cycle {
    stages: Vec<SubmissionStage>,
}

impl Cycle {
    fn start() -> Self {
        Self {
            stages: vec![SubmissionStage::Idle],
        }
    }

    fn enter(&mut self, stage: SubmissionStage) {
        if let Some(from) = self.stages.last() {
            debug!(from = ?from, to = ?stage, "Submission stage transition");
        }
        self.stages.push(stage);
    }
}

/// Health verdict of one startup check
#[derive(Debug, Clone)]
pub struct StartupCheck {
    pub component: &'static str,
    pub health: ComponentHealth,
}

/// Runs submissions against the shared resources
pub struct PricingService {
    loader: Arc<ResourceLoader>,
    metrics: PricingMetrics,
    logger: StructuredLogger,
    max_car_id: Option<u32>,
}

impl PricingService {
    pub fn new(loader: Arc<ResourceLoader>, logger: StructuredLogger) -> Self {
        Self {
            loader,
            metrics: PricingMetrics::new(),
            logger,
            max_car_id: None,
        }
    }

    /// Highest car identifier the model was trained on, if known
    pub fn with_max_car_id(mut self, max_car_id: Option<u32>) -> Self {
        self.max_car_id = max_car_id;
        self
    }

    /// Form controls for the current car table
    pub fn form_spec(&self) -> FormSpec {
        let cars = self.loader.load_car_table().ok();
        FormSpec::new(cars.as_deref())
    }

    /// Run a typed submission (JSON API)
    pub fn submit(&self, input: &FormInput) -> SubmissionOutcome {
        self.process(|spec| {
            spec.validate(input)?;
            Ok(input.clone())
        })
    }

    /// Run a raw form post
    pub fn submit_form(&self, raw: &FormSubmission) -> SubmissionOutcome {
        self.process(|spec| raw.parse(spec))
    }

    /// Run a submission whose body could not be decoded
    ///
    /// Resources are still checked first, so an unavailable model wins.
    pub fn submit_malformed(&self, reason: impl Into<String>) -> SubmissionOutcome {
        let reason = reason.into();
        self.process(move |_| Err(PredictionError::InvalidInput(reason)))
    }

    fn process<F>(&self, collect: F) -> SubmissionOutcome
    where
        F: FnOnce(&FormSpec) -> Result<FormInput>,
    {
        let mut cycle = Cycle::start();
        cycle.enter(SubmissionStage::Submitted);

        let output = match self.run_cycle(&mut cycle, collect) {
            Ok((input, estimate, model_version)) => {
                cycle.enter(SubmissionStage::Presenting);
                let output = present(&Ok(estimate));
                if let DisplayOutput::Success { amount, .. } = &output {
                    self.logger.log_prediction(&input, *amount, &model_version);
                }
                self.metrics.inc_predictions();
                output
            }
            Err(err) => {
                cycle.enter(SubmissionStage::Failed);
                let category = err.category();
                self.metrics.inc_prediction_errors(category);
                self.logger.log_prediction_failure(category, &err.to_string());
                present(&Err(err))
            }
        };

        cycle.enter(SubmissionStage::Idle);
        SubmissionOutcome {
            output,
            stages: cycle.stages,
        }
    }

    fn run_cycle<F>(
        &self,
        cycle: &mut Cycle,
        collect: F,
    ) -> Result<(FormInput, PriceEstimate, String)>
    where
        F: FnOnce(&FormSpec) -> Result<FormInput>,
    {
        let (model, cars) = self.resources()?;
        let input = collect(&FormSpec::new(Some(cars.as_ref())))?;

        cycle.enter(SubmissionStage::Building);
        let features = build_feature_vector(&input, &cars)?;

        cycle.enter(SubmissionStage::Predicting);
        let start = Instant::now();
        let estimate = predict(&features, model.as_ref());
        self.metrics
            .observe_inference_latency(start.elapsed().as_secs_f64());

        Ok((input, estimate?, model.version().to_string()))
    }

    /// Both resources, model first; an empty table counts as unavailable
    fn resources(&self) -> Result<(Arc<dyn PriceModel>, Arc<CarNameTable>)> {
        let model = self.loader.load_model()?;
        let cars = self.loader.load_car_table()?;
        if cars.is_empty() {
            return Err(PredictionError::EmptyCarTable);
        }
        Ok((model, cars))
    }

    /// Load both resources and check they fit together
    ///
    /// The row-position mapping is kept as is; these checks only report.
    pub fn startup_checks(&self) -> Vec<StartupCheck> {
        let mut checks = Vec::new();

        let model = self.loader.load_model();
        match &model {
            Ok(model) => {
                self.metrics.set_model_version(model.version());
                self.logger.log_resource_loaded("model", model.version());
                checks.push(StartupCheck {
                    component: components::MODEL,
                    health: ComponentHealth::healthy(),
                });
            }
            Err(e) => {
                self.logger.log_resource_failure(e);
                checks.push(StartupCheck {
                    component: components::MODEL,
                    health: ComponentHealth::unhealthy(e.to_string()),
                });
            }
        }

        let cars = self.loader.load_car_table();
        match &cars {
            Ok(table) => {
                self.metrics.set_car_table_entries(table.len());
                self.logger
                    .log_resource_loaded("car_table", &format!("{} cars", table.len()));
                checks.push(StartupCheck {
                    component: components::CAR_TABLE,
                    health: self.check_car_table(table),
                });
            }
            Err(e) => {
                self.metrics.set_car_table_entries(0);
                self.logger.log_resource_failure(e);
                checks.push(StartupCheck {
                    component: components::CAR_TABLE,
                    health: ComponentHealth::unhealthy(e.to_string()),
                });
            }
        }

        let probe = match (&model, &cars) {
            (Ok(model), Ok(table)) => self.probe(model.as_ref(), table),
            _ => ComponentHealth::unhealthy("Resources unavailable"),
        };
        checks.push(StartupCheck {
            component: components::PREDICTOR,
            health: probe,
        });

        checks
    }

    fn check_car_table(&self, table: &CarNameTable) -> ComponentHealth {
        if table.is_empty() {
            self.logger
                .log_startup_validation("car_table_rows", false, "table has no rows");
            return ComponentHealth::unhealthy("Car table is empty");
        }

        let mut issues = Vec::new();
        if table.duplicate_count() > 0 {
            issues.push(format!(
                "{} duplicate car names, last row wins",
                table.duplicate_count()
            ));
        }

        match (self.max_car_id, table.max_id()) {
            (Some(limit), Some(max_id)) if max_id > limit => {
                let details = format!("car id {} above trained maximum {}", max_id, limit);
                self.logger
                    .log_startup_validation("car_id_range", false, &details);
                issues.push(details);
            }
            (Some(limit), Some(max_id)) => {
                self.logger.log_startup_validation(
                    "car_id_range",
                    true,
                    &format!("max car id {} within {}", max_id, limit),
                );
            }
            _ => {
                self.logger.log_startup_validation(
                    "car_id_range",
                    true,
                    "no trained maximum configured, skipped",
                );
            }
        }

        if issues.is_empty() {
            ComponentHealth::healthy()
        } else {
            ComponentHealth::degraded(issues.join("; "))
        }
    }

    /// One inference with the first car and default form values
    fn probe(&self, model: &dyn PriceModel, table: &CarNameTable) -> ComponentHealth {
        let Some((car_name, _)) = table.first() else {
            return ComponentHealth::unhealthy("Car table is empty");
        };

        let input = FormInput {
            car_name: car_name.to_string(),
            year: DEFAULT_YEAR,
            transmission: Transmission::default(),
            sunroof: false,
            auto_retract: false,
            electric_parking: false,
            vehicle_stability: false,
            auto_cruise: false,
        };

        let outcome = build_feature_vector(&input, table).and_then(|f| predict(&f, model));
        match outcome {
            Ok(estimate) => {
                self.logger.log_startup_validation(
                    "probe_inference",
                    true,
                    &format!("{} -> {}", car_name, estimate.value()),
                );
                ComponentHealth::healthy()
            }
            Err(e) => {
                self.logger
                    .log_startup_validation("probe_inference", false, &e.to_string());
                ComponentHealth::unhealthy(format!("Probe inference failed: {}", e))
            }
        }
    }
}
