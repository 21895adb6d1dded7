//! Read-only resources: the trained model and the car name table
//!
//! Both are loaded at most once per process. The first load attempt,
//! successful or not, is memoized and every later caller shares its result.

mod car_table;

pub use car_table::CarNameTable;

use crate::error::ResourceLoadError;
use crate::predictor::{OnnxPriceModel, PriceModel, MAX_INFERENCE_MS};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Where resources are read from
pub trait ResourceSource: Send + Sync {
    /// Read and deserialize the model
    fn load_model(&self) -> Result<Box<dyn PriceModel>, ResourceLoadError>;

    /// Read the car reference table
    fn load_car_table(&self) -> Result<CarNameTable, ResourceLoadError>;
}

/// Resources stored as files on local disk
#[derive(Debug, Clone)]
pub struct FileSource {
    pub model_path: PathBuf,
    pub car_table_path: PathBuf,
    /// Header of the column holding display names; first column when unset
    pub car_name_column: Option<String>,
    /// Inference latency reported as slow by the loaded model
    pub slow_inference: Duration,
}

impl FileSource {
    pub fn new(model_path: impl Into<PathBuf>, car_table_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            car_table_path: car_table_path.into(),
            car_name_column: None,
            slow_inference: Duration::from_millis(MAX_INFERENCE_MS),
        }
    }

    pub fn with_car_name_column(mut self, column: impl Into<String>) -> Self {
        self.car_name_column = Some(column.into());
        self
    }

    pub fn with_slow_inference(mut self, threshold: Duration) -> Self {
        self.slow_inference = threshold;
        self
    }
}

impl ResourceSource for FileSource {
    fn load_model(&self) -> Result<Box<dyn PriceModel>, ResourceLoadError> {
        let model = OnnxPriceModel::from_path(&self.model_path)?
            .with_slow_threshold(self.slow_inference);
        Ok(Box::new(model))
    }

    fn load_car_table(&self) -> Result<CarNameTable, ResourceLoadError> {
        CarNameTable::load(&self.car_table_path, self.car_name_column.as_deref())
    }
}

/// Write-once cell holding the outcome of a single load attempt
pub struct ResourceCache<T: ?Sized> {
    cell: OnceLock<Result<Arc<T>, ResourceLoadError>>,
}

impl<T: ?Sized> ResourceCache<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the cached value, running `load` only if nothing is cached yet
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<T>, ResourceLoadError>
    where
        F: FnOnce() -> Result<Arc<T>, ResourceLoadError>,
    {
        self.cell.get_or_init(load).clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide handle to the memoized resources
pub struct ResourceLoader {
    source: Box<dyn ResourceSource>,
    model: ResourceCache<dyn PriceModel>,
    car_table: ResourceCache<CarNameTable>,
}

impl ResourceLoader {
    pub fn new(source: impl ResourceSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            model: ResourceCache::new(),
            car_table: ResourceCache::new(),
        }
    }

    /// Get the model, loading it on first use
    pub fn load_model(&self) -> Result<Arc<dyn PriceModel>, ResourceLoadError> {
        self.model.get_or_load(|| {
            let start = Instant::now();
            debug!("Reading model from storage");
            match self.source.load_model() {
                Ok(model) => {
                    info!(
                        model_version = %model.version(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Model loaded"
                    );
                    Ok(Arc::from(model))
                }
                Err(e) => {
                    warn!(error = %e, "Model unavailable, predictions disabled");
                    Err(e)
                }
            }
        })
    }

    /// Get the car name table, loading it on first use
    pub fn load_car_table(&self) -> Result<Arc<CarNameTable>, ResourceLoadError> {
        self.car_table.get_or_load(|| {
            debug!("Reading car table from storage");
            match self.source.load_car_table() {
                Ok(table) => {
                    info!(
                        cars = table.len(),
                        rows = table.row_count(),
                        "Car table loaded"
                    );
                    Ok(Arc::new(table))
                }
                Err(e) => {
                    warn!(error = %e, "Car table unavailable");
                    Err(e)
                }
            }
        })
    }

    /// True once both resources have been attempted
    pub fn is_warm(&self) -> bool {
        self.model.is_initialized() && self.car_table.is_initialized()
    }
}
