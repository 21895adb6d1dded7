//! Service configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an alternative config file
pub const CONFIG_FILE_ENV: &str = "PRICER_CONFIG";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "PRICER";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Serialized ONNX price model
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// CSV listing one car model per row
    #[serde(default = "default_car_table_path")]
    pub car_table_path: PathBuf,

    /// Header of the column holding car names; first column when unset
    #[serde(default)]
    pub car_name_column: Option<String>,

    /// Highest car id seen during training; range check skipped when unset
    #[serde(default)]
    pub max_car_id: Option<u32>,

    /// Inference latency above which a warning is logged
    #[serde(default = "default_slow_inference_ms")]
    pub slow_inference_ms: u64,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_port() -> u16 {
    8080
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/car_price.onnx")
}

fn default_car_table_path() -> PathBuf {
    PathBuf::from("data/car_model_id.csv")
}

fn default_slow_inference_ms() -> u64 {
    pricing_lib::predictor::MAX_INFERENCE_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            port: default_port(),
            model_path: default_model_path(),
            car_table_path: default_car_table_path(),
            car_name_column: None,
            max_car_id: None,
            slow_inference_ms: default_slow_inference_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables (`PRICER_PORT`, `PRICER_MODEL_PATH`, ...) take
    /// precedence over the file.
    pub fn load() -> Result<Self> {
        let file =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| "price-predictor".to_string());
        Self::load_from(&file)
    }

    pub fn load_from(file: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }
}
