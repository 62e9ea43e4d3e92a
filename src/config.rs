use std::path::PathBuf;

/// Malignancy probability a prediction must exceed (strictly) to be labelled
/// malignant.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Value substituted for features absent from a request.
pub const DEFAULT_MISSING_VALUE: f64 = 0.0;

pub const DEFAULT_MODEL_PATH: &str = "AI_Model.json";

pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 256 * 1024;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingRequired { field: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub threshold: f64,
    pub missing_value: f64,
    pub max_payload_size: usize,
    pub log_level: log::LevelFilter,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            threshold: DEFAULT_THRESHOLD,
            missing_value: DEFAULT_MISSING_VALUE,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            log_level: log::LevelFilter::Info,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "host".to_string(),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: self.port.to_string(),
                reason: "Must be non-zero".to_string(),
            });
        }

        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "model_path".to_string(),
            });
        }

        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidValue {
                field: "threshold".to_string(),
                value: self.threshold.to_string(),
                reason: "Must be between 0.0 and 1.0".to_string(),
            });
        }

        if !self.missing_value.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "missing_value".to_string(),
                value: self.missing_value.to_string(),
                reason: "Must be a finite number".to_string(),
            });
        }

        if self.max_payload_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_payload_size".to_string(),
                value: self.max_payload_size.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }

        Ok(())
    }
}
