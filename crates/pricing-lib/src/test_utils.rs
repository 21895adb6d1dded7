//! Fixtures shared by unit tests

use crate::error::{PredictionError, ResourceLoadError, Result};
use crate::models::FeatureVector;
use crate::predictor::PriceModel;
use crate::resources::{CarNameTable, ResourceSource};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Model returning a fixed value (or a fixed error) and recording its inputs
///
/// Clones share their call log.
#[derive(Clone)]
pub struct StubModel {
    response: std::result::Result<f64, String>,
    calls: Arc<AtomicUsize>,
    last_input: Arc<Mutex<Option<FeatureVector>>>,
}

impl StubModel {
    pub fn constant(value: f64) -> Self {
        Self::with_response(Ok(value))
    }

    pub fn failing(reason: &str) -> Self {
        Self::with_response(Err(reason.to_string()))
    }

    fn with_response(response: std::result::Result<f64, String>) -> Self {
        Self {
            response,
            calls: Arc::new(AtomicUsize::new(0)),
            last_input: Arc::new(Mutex::new(None)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<FeatureVector> {
        *self.last_input.lock().unwrap()
    }
}

impl PriceModel for StubModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(*features);
        self.response.clone().map_err(PredictionError::Inference)
    }

    fn version(&self) -> &str {
        "stub"
    }
}

/// How often a [`CountingSource`] was read
#[derive(Default)]
pub struct Counters {
    pub model_reads: AtomicUsize,
    pub table_reads: AtomicUsize,
}

/// In-memory resource source that counts reads
pub struct CountingSource {
    model: Option<StubModel>,
    names: Vec<String>,
    counters: Arc<Counters>,
}

impl CountingSource {
    pub fn new<I, S>(model: StubModel, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: Some(model),
            names: names.into_iter().map(Into::into).collect(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Source whose model cannot be loaded
    pub fn failing_model<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: None,
            ..Self::new(StubModel::constant(0.0), names)
        }
    }

    pub fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }
}

impl ResourceSource for CountingSource {
    fn load_model(&self) -> std::result::Result<Box<dyn PriceModel>, ResourceLoadError> {
        self.counters.model_reads.fetch_add(1, Ordering::SeqCst);
        match &self.model {
            Some(model) => Ok(Box::new(model.clone())),
            None => Err(ResourceLoadError::model(
                Path::new("models/car_price.onnx"),
                "No such file or directory",
            )),
        }
    }

    fn load_car_table(&self) -> std::result::Result<CarNameTable, ResourceLoadError> {
        self.counters.table_reads.fetch_add(1, Ordering::SeqCst);
        Ok(CarNameTable::from_names(self.names.iter().cloned()))
    }
}
