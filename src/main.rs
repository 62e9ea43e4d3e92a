use clap::Parser;
use std::path::PathBuf;
use tumor_diagnosis_rs::config::{
    DEFAULT_MAX_PAYLOAD_SIZE, DEFAULT_MISSING_VALUE, DEFAULT_MODEL_PATH, DEFAULT_THRESHOLD,
    ServiceConfig,
};
use tumor_diagnosis_rs::logging;

#[derive(Parser, Debug)]
#[command(name = "tumor-diagnosis")]
#[command(about = "Serve a pre-trained tumor classifier over HTTP")]
#[command(long_about = r#"
Serve a pre-trained tumor classifier over HTTP

POST /predict accepts a JSON object of the 30 tumor measurement features and
returns a Malignant/Benign label with the malignancy probability. Missing
features are filled with a default value.

Examples:
  tumor-diagnosis --model-path models/AI_Model.json
  tumor-diagnosis --host 0.0.0.0 --port 8080 --threshold 0.5
"#)]
struct CliArgs {
    /// Host address to bind the server
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Path to the JSON-exported classifier
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model_path: PathBuf,

    /// Malignancy probability above which a tumor is labelled malignant
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Value used for features missing from a request
    #[arg(long, default_value_t = DEFAULT_MISSING_VALUE, allow_negative_numbers = true)]
    missing_value: f64,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD_SIZE)]
    max_payload_size: usize,

    /// Set the logging level
    #[arg(long, default_value = "info", value_parser = ["off", "trace", "debug", "info", "warn", "error"])]
    log_level: String,
}

impl CliArgs {
    fn to_service_config(&self) -> anyhow::Result<ServiceConfig> {
        Ok(ServiceConfig {
            host: self.host.clone(),
            port: self.port,
            model_path: self.model_path.clone(),
            threshold: self.threshold,
            missing_value: self.missing_value,
            max_payload_size: self.max_payload_size,
            log_level: self
                .log_level
                .parse::<log::LevelFilter>()
                .map_err(|e| anyhow::anyhow!("Invalid log level {}: {}", self.log_level, e))?,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = args.to_service_config()?;
    logging::init_logging(config.log_level);
    tumor_diagnosis_rs::run(config)
}
