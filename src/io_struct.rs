use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnosis {
    Malignant,
    Benign,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnosis::Malignant => write!(f, "Malignant"),
            Diagnosis::Benign => write!(f, "Benign"),
        }
    }
}

/// Label and positive-class probability for one payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub diagnosis: Diagnosis,
    pub malignancy_probability: f64,
}

/// Body of every `/predict` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Diagnosis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub malignancy_probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        PredictResponse {
            success: false,
            prediction: None,
            malignancy_probability: None,
            error: Some(error.into()),
        }
    }
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        PredictResponse {
            success: true,
            prediction: Some(prediction.diagnosis),
            malignancy_probability: Some(prediction.malignancy_probability),
            error: None,
        }
    }
}

/// Body of `/model_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub loaded: bool,
    pub algorithm: Option<String>,
    pub n_features: usize,
    pub threshold: f64,
    pub missing_value: f64,
    pub feature_names: Vec<String>,
    pub error: Option<String>,
}
