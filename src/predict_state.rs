use crate::config::ServiceConfig;
use crate::error::PredictError;
use crate::io_struct::{Diagnosis, ModelInfo, Prediction};
use crate::model::{self, ProbabilityModel};
use crate::schema::{self, FEATURE_SCHEMA, NUM_FEATURES};
use serde_json::Value;
use std::sync::Arc;

/// Outcome of the one-time model load.
#[derive(Clone)]
pub enum ModelState {
    Ready(Arc<dyn ProbabilityModel>),
    LoadFailed(String),
}

impl ModelState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

#[derive(Clone)]
pub struct PredictState {
    pub model: ModelState,
    pub threshold: f64,
    pub missing_value: f64,
}

impl PredictState {
    pub fn new(model: ModelState, threshold: f64, missing_value: f64) -> Self {
        Self {
            model,
            threshold,
            missing_value,
        }
    }

    /// Load the configured artifact. A failed load is logged and kept as
    /// state so the server still starts.
    pub fn load(config: &ServiceConfig) -> Self {
        let model = match model::load_model(&config.model_path) {
            Ok(model) => {
                log::info!(
                    "Model loaded successfully from {} ({})",
                    config.model_path.display(),
                    model.algorithm()
                );
                ModelState::Ready(model)
            }
            Err(e) => {
                log::error!("Error loading model: {}", e);
                ModelState::LoadFailed(e.to_string())
            }
        };
        Self::new(model, config.threshold, config.missing_value)
    }

    pub fn with_model(model: Arc<dyn ProbabilityModel>, config: &ServiceConfig) -> Self {
        Self::new(
            ModelState::Ready(model),
            config.threshold,
            config.missing_value,
        )
    }

    pub fn predict(&self, payload: &Value) -> Result<Prediction, PredictError> {
        let model = match &self.model {
            ModelState::Ready(model) => model,
            ModelState::LoadFailed(reason) => {
                return Err(PredictError::ModelUnavailable(reason.clone()));
            }
        };

        let payload = payload.as_object().ok_or_else(|| {
            PredictError::MalformedInput(format!(
                "expected a JSON object of feature values, got {}",
                json_type_name(payload)
            ))
        })?;
        let features = schema::to_feature_vector(payload, self.missing_value)?;

        let proba = model
            .predict_proba(&features)
            .map_err(|e| PredictError::Inference(e.to_string()))?;
        let malignancy_probability = *proba.get(1).ok_or_else(|| {
            PredictError::Inference(format!(
                "model returned {} class probabilities, expected at least 2",
                proba.len()
            ))
        })?;
        if !(0.0..=1.0).contains(&malignancy_probability) {
            return Err(PredictError::Inference(format!(
                "malignancy probability {} is outside [0, 1]",
                malignancy_probability
            )));
        }

        Ok(Prediction {
            diagnosis: self.classify(malignancy_probability),
            malignancy_probability,
        })
    }

    pub fn classify(&self, malignancy_probability: f64) -> Diagnosis {
        if malignancy_probability > self.threshold {
            Diagnosis::Malignant
        } else {
            Diagnosis::Benign
        }
    }

    pub fn model_info(&self) -> ModelInfo {
        let (algorithm, error) = match &self.model {
            ModelState::Ready(model) => (Some(model.algorithm().to_string()), None),
            ModelState::LoadFailed(reason) => (None, Some(reason.clone())),
        };
        ModelInfo {
            loaded: self.model.is_ready(),
            algorithm,
            n_features: NUM_FEATURES,
            threshold: self.threshold,
            missing_value: self.missing_value,
            feature_names: FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect(),
            error,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use crate::schema::FeatureVector;
    use serde_json::json;

    /// Returns a fixed probability regardless of input.
    struct FixedModel(Vec<f64>);

    impl ProbabilityModel for FixedModel {
        fn algorithm(&self) -> &str {
            "fixed"
        }

        fn predict_proba(&self, _: &FeatureVector) -> Result<Vec<f64>, ModelError> {
            Ok(self.0.clone())
        }
    }

    /// Probability equals the first feature, so tests can steer the output.
    struct EchoModel;

    impl ProbabilityModel for EchoModel {
        fn algorithm(&self) -> &str {
            "echo"
        }

        fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
            Ok(vec![1.0 - features[0], features[0]])
        }
    }

    struct FailingModel;

    impl ProbabilityModel for FailingModel {
        fn algorithm(&self) -> &str {
            "failing"
        }

        fn predict_proba(&self, _: &FeatureVector) -> Result<Vec<f64>, ModelError> {
            Err(ModelError::Evaluation("tree walk failed".to_string()))
        }
    }

    fn state_with(model: impl ProbabilityModel + 'static) -> PredictState {
        PredictState::with_model(Arc::new(model), &ServiceConfig::default())
    }

    #[test]
    fn test_threshold_is_strict() {
        let state = state_with(FixedModel(vec![0.7, 0.3]));
        let prediction = state.predict(&json!({})).unwrap();
        assert_eq!(prediction.diagnosis, Diagnosis::Benign);
        assert_eq!(prediction.malignancy_probability, 0.3);

        assert_eq!(state.classify(0.30000001), Diagnosis::Malignant);
        assert_eq!(state.classify(0.0), Diagnosis::Benign);
        assert_eq!(state.classify(1.0), Diagnosis::Malignant);
    }

    #[test]
    fn test_label_matches_probability() {
        let state = state_with(EchoModel);
        for p in [0.0, 0.1, 0.29, 0.31, 0.5, 0.99, 1.0] {
            let prediction = state.predict(&json!({"radius_mean": p})).unwrap();
            assert_eq!(prediction.malignancy_probability, p);
            assert_eq!(
                prediction.diagnosis == Diagnosis::Malignant,
                p > 0.3,
                "p = {}",
                p
            );
        }
    }

    #[test]
    fn test_custom_threshold() {
        let mut state = state_with(EchoModel);
        state.threshold = 0.5;
        let prediction = state.predict(&json!({"radius_mean": 0.4})).unwrap();
        assert_eq!(prediction.diagnosis, Diagnosis::Benign);
    }

    #[test]
    fn test_predict_is_idempotent() {
        let state = state_with(EchoModel);
        let payload = json!({"radius_mean": 0.42, "texture_mean": 10.38});
        assert_eq!(
            state.predict(&payload).unwrap(),
            state.predict(&payload).unwrap()
        );
    }

    #[test]
    fn test_model_unavailable() {
        let state = PredictState::new(
            ModelState::LoadFailed("no such file".to_string()),
            0.3,
            0.0,
        );
        match state.predict(&json!({})) {
            Err(PredictError::ModelUnavailable(reason)) => assert_eq!(reason, "no such file"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let state = state_with(EchoModel);
        for payload in [json!([1, 2, 3]), json!("radius_mean"), json!(null), json!(3.5)] {
            assert!(matches!(
                state.predict(&payload),
                Err(PredictError::MalformedInput(_))
            ));
        }
    }

    #[test]
    fn test_non_numeric_feature_is_malformed() {
        let state = state_with(EchoModel);
        assert!(matches!(
            state.predict(&json!({"radius_mean": "abc"})),
            Err(PredictError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_bad_model_output_is_inference_error() {
        for proba in [vec![1.0], vec![-0.5, 1.5], vec![0.5, f64::NAN]] {
            let state = state_with(FixedModel(proba));
            assert!(matches!(
                state.predict(&json!({})),
                Err(PredictError::Inference(_))
            ));
        }

        let state = state_with(FailingModel);
        match state.predict(&json!({})) {
            Err(PredictError::Inference(msg)) => assert!(msg.contains("tree walk failed")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_artifact_keeps_service_alive() {
        let config = ServiceConfig {
            model_path: "/nonexistent/AI_Model.json".into(),
            ..Default::default()
        };
        let state = PredictState::load(&config);
        assert!(!state.model.is_ready());
        let info = state.model_info();
        assert!(!info.loaded);
        assert!(info.error.is_some());
        assert_eq!(info.feature_names.len(), NUM_FEATURES);
    }
}
