//! Fixed feature schema and the reconciliation of request payloads into
//! model-ready feature vectors.

use serde_json::{Map, Value};

/// Number of features the classifier consumes.
pub const NUM_FEATURES: usize = 30;

/// Column order expected by the model. Names are matched case-sensitively.
pub const FEATURE_SCHEMA: [&str; NUM_FEATURES] = [
    "radius_mean",
    "texture_mean",
    "perimeter_mean",
    "area_mean",
    "smoothness_mean",
    "compactness_mean",
    "concavity_mean",
    "concave points_mean",
    "symmetry_mean",
    "fractal_dimension_mean",
    "radius_se",
    "texture_se",
    "perimeter_se",
    "area_se",
    "smoothness_se",
    "compactness_se",
    "concavity_se",
    "concave points_se",
    "symmetry_se",
    "fractal_dimension_se",
    "radius_worst",
    "texture_worst",
    "perimeter_worst",
    "area_worst",
    "smoothness_worst",
    "compactness_worst",
    "concavity_worst",
    "concave points_worst",
    "symmetry_worst",
    "fractal_dimension_worst",
];

/// Feature values in schema order.
pub type FeatureVector = [f64; NUM_FEATURES];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required feature '{0}'")]
    MissingField(&'static str),

    #[error("Feature '{field}' must be numeric, got {value}")]
    NonNumeric { field: &'static str, value: String },
}

/// Fill every schema field absent from `payload` with `missing_value`.
///
/// Keys outside the schema are left untouched; they are dropped later by
/// [`project`].
pub fn reconcile(payload: &mut Map<String, Value>, missing_value: f64) {
    for name in FEATURE_SCHEMA {
        if !payload.contains_key(name) {
            payload.insert(name.to_string(), Value::from(missing_value));
        }
    }
}

/// Extract schema values in canonical order.
pub fn project(payload: &Map<String, Value>) -> Result<FeatureVector, SchemaError> {
    let mut features = [0.0; NUM_FEATURES];
    for (slot, name) in features.iter_mut().zip(FEATURE_SCHEMA) {
        let value = payload.get(name).ok_or(SchemaError::MissingField(name))?;
        *slot = coerce_number(value).ok_or_else(|| SchemaError::NonNumeric {
            field: name,
            value: value.to_string(),
        })?;
    }
    Ok(features)
}

/// Reconcile and project in one step, leaving the caller's payload intact.
pub fn to_feature_vector(
    payload: &Map<String, Value>,
    missing_value: f64,
) -> Result<FeatureVector, SchemaError> {
    let mut reconciled = payload.clone();
    reconcile(&mut reconciled, missing_value);
    project(&reconciled)
}

// Numbers and numeric strings are accepted; anything non-finite is rejected.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}
