#![allow(dead_code)]

use serde_json::{Map, Value, json};
use tumor_diagnosis_rs::schema::FEATURE_SCHEMA;

/// Two-tree forest splitting on `radius_mean` and `concave points_worst`.
///
/// Both at or below their thresholds gives 0.075, both above gives 0.925.
/// Only radius_mean above gives 0.475, only concave points_worst above 0.525.
pub fn forest_json() -> String {
    json!({
        "algorithm": "random_forest",
        "n_features": 30,
        "n_classes": 2,
        "trees": [
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [0, -2, -2],
                "threshold": [15.0, -2.0, -2.0],
                "value": [[50.0, 50.0], [45.0, 5.0], [5.0, 45.0]]
            },
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [27, -2, -2],
                "threshold": [0.14, -2.0, -2.0],
                "value": [[50.0, 50.0], [0.95, 0.05], [0.05, 0.95]]
            }
        ]
    })
    .to_string()
}

/// A full payload with measurements typical of a malignant sample.
pub fn malignant_payload() -> Map<String, Value> {
    let values = [
        17.99, 10.38, 122.8, 1001.0, 0.1184, 0.2776, 0.3001, 0.1471, 0.2419, 0.07871, 1.095,
        0.9053, 8.589, 153.4, 0.006399, 0.04904, 0.05373, 0.01587, 0.03003, 0.006193, 25.38,
        17.33, 184.6, 2019.0, 0.1622, 0.6656, 0.7119, 0.2654, 0.4601, 0.1189,
    ];
    FEATURE_SCHEMA
        .iter()
        .zip(values)
        .map(|(name, v)| (name.to_string(), json!(v)))
        .collect()
}

/// A full payload with measurements typical of a benign sample.
pub fn benign_payload() -> Map<String, Value> {
    let values = [
        13.54, 14.36, 87.46, 566.3, 0.09779, 0.08129, 0.06664, 0.04781, 0.1885, 0.05766,
        0.2699, 0.7886, 2.058, 23.56, 0.008462, 0.0146, 0.02387, 0.01315, 0.0198, 0.0023,
        15.11, 19.26, 99.7, 711.2, 0.144, 0.1773, 0.239, 0.1288, 0.2977, 0.07259,
    ];
    FEATURE_SCHEMA
        .iter()
        .zip(values)
        .map(|(name, v)| (name.to_string(), json!(v)))
        .collect()
}
