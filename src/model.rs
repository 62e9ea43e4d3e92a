//! Classifier artifacts and their probability-prediction capability.
//!
//! Training happens elsewhere; the fitted classifier is exported to JSON and
//! loaded here once at startup. Two families are understood:
//!
//! - Random forest: per-tree node arrays, probabilities averaged over trees
//! - Logistic regression: p = sigmoid(w·x + b)

use crate::schema::{FeatureVector, NUM_FEATURES};
use ndarray::{Array1, ArrayView1};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Anything that maps a feature vector to class probabilities.
///
/// Implementations are shared across actix workers and must never mutate
/// after construction.
pub trait ProbabilityModel: Send + Sync {
    fn algorithm(&self) -> &str;

    /// Class probabilities, index 1 being the malignant class.
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    #[error("Model evaluation failed: {0}")]
    Evaluation(String),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
enum ModelArtifact {
    RandomForest(ForestData),
    LogisticRegression(LogisticData),
}

#[derive(Debug, Deserialize)]
struct ForestData {
    n_features: usize,
    n_classes: usize,
    trees: Vec<TreeData>,
}

#[derive(Debug, Deserialize)]
struct TreeData {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<NodeValue>,
}

/// Per-node class weights. scikit-learn's `tree_.value` is shaped
/// nodes x outputs x classes; a flat nodes x classes export is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeValue {
    Classes(Vec<f64>),
    Outputs(Vec<Vec<f64>>),
}

impl NodeValue {
    fn class_weights(&self) -> Result<&[f64], usize> {
        match self {
            NodeValue::Classes(weights) => Ok(weights),
            NodeValue::Outputs(outputs) if outputs.len() == 1 => Ok(&outputs[0]),
            NodeValue::Outputs(outputs) => Err(outputs.len()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LogisticData {
    coef: Vec<f64>,
    intercept: f64,
}

/// Load a model artifact from disk.
pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn ProbabilityModel>, ModelError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    model_from_json(&raw)
}

/// Build a model from its JSON export.
pub fn model_from_json(json: &str) -> Result<Arc<dyn ProbabilityModel>, ModelError> {
    let model: Arc<dyn ProbabilityModel> = match serde_json::from_str(json)? {
        ModelArtifact::RandomForest(data) => Arc::new(ForestModel::from_data(data)?),
        ModelArtifact::LogisticRegression(data) => Arc::new(LogisticModel::from_data(data)?),
    };
    Ok(model)
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_data(index: usize, data: TreeData, n_classes: usize) -> Result<Self, ModelError> {
        let len = data.children_left.len();
        if len == 0 {
            return Err(ModelError::Invalid(format!("tree {} has no nodes", index)));
        }
        if [
            data.children_right.len(),
            data.feature.len(),
            data.threshold.len(),
            data.value.len(),
        ]
        .iter()
        .any(|l| *l != len)
        {
            return Err(ModelError::Invalid(format!(
                "tree {} node arrays differ in length",
                index
            )));
        }

        let mut nodes = Vec::with_capacity(len);
        for i in 0..len {
            let left = data.children_left[i];
            let right = data.children_right[i];
            let node = if left < 0 {
                let counts = data.value[i].class_weights().map_err(|outputs| {
                    ModelError::Invalid(format!(
                        "tree {} node {} has {} outputs, expected a single-output classifier",
                        index, i, outputs
                    ))
                })?;
                if counts.len() != n_classes {
                    return Err(ModelError::Invalid(format!(
                        "tree {} node {} has {} class weights, expected {}",
                        index,
                        i,
                        counts.len(),
                        n_classes
                    )));
                }
                let total: f64 = counts.iter().sum();
                if counts.iter().any(|c| !c.is_finite() || *c < 0.0) || total <= 0.0 {
                    return Err(ModelError::Invalid(format!(
                        "tree {} leaf {} has an invalid class distribution",
                        index, i
                    )));
                }
                Node::Leaf {
                    proba: counts.iter().map(|c| c / total).collect(),
                }
            } else {
                // Children must come after their parent, which also rules out cycles.
                let left = left as usize;
                let right = usize::try_from(right).unwrap_or(usize::MAX);
                if left <= i || right <= i || left >= len || right >= len {
                    return Err(ModelError::Invalid(format!(
                        "tree {} node {} has out-of-range children",
                        index, i
                    )));
                }
                let feature = usize::try_from(data.feature[i])
                    .ok()
                    .filter(|f| *f < NUM_FEATURES)
                    .ok_or_else(|| {
                        ModelError::Invalid(format!(
                            "tree {} node {} splits on unknown feature {}",
                            index, i, data.feature[i]
                        ))
                    })?;
                Node::Split {
                    feature,
                    threshold: data.threshold[i],
                    left,
                    right,
                }
            };
            nodes.push(node);
        }
        Ok(Self { nodes })
    }

    fn leaf_proba(&self, features: &FeatureVector) -> &[f64] {
        let mut current = 0;
        loop {
            match &self.nodes[current] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    current = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { proba } => return proba,
            }
        }
    }
}

/// Random forest; class probabilities are the mean of each tree's leaf
/// distribution.
#[derive(Debug, Clone)]
pub struct ForestModel {
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl ForestModel {
    fn from_data(data: ForestData) -> Result<Self, ModelError> {
        if data.n_features != NUM_FEATURES {
            return Err(ModelError::Invalid(format!(
                "expected {} features, artifact declares {}",
                NUM_FEATURES, data.n_features
            )));
        }
        if data.n_classes < 2 {
            return Err(ModelError::Invalid(format!(
                "binary classifier needs at least 2 classes, artifact declares {}",
                data.n_classes
            )));
        }
        if data.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".to_string()));
        }
        let trees = data
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| DecisionTree::from_data(i, tree, data.n_classes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            n_classes: data.n_classes,
            trees,
        })
    }
}

impl ProbabilityModel for ForestModel {
    fn algorithm(&self) -> &str {
        "random_forest"
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_proba(features)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(proba.into_iter().map(|p| p / n).collect())
    }
}

/// Binary logistic regression.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    coef: Array1<f64>,
    intercept: f64,
}

impl LogisticModel {
    fn from_data(data: LogisticData) -> Result<Self, ModelError> {
        if data.coef.len() != NUM_FEATURES {
            return Err(ModelError::Invalid(format!(
                "expected {} coefficients, artifact has {}",
                NUM_FEATURES,
                data.coef.len()
            )));
        }
        if data.coef.iter().any(|c| !c.is_finite()) || !data.intercept.is_finite() {
            return Err(ModelError::Invalid(
                "coefficients must be finite".to_string(),
            ));
        }
        Ok(Self {
            coef: Array1::from_vec(data.coef),
            intercept: data.intercept,
        })
    }
}

impl ProbabilityModel for LogisticModel {
    fn algorithm(&self) -> &str {
        "logistic_regression"
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let z = self.coef.dot(&ArrayView1::from(&features[..])) + self.intercept;
        let p = 1.0 / (1.0 + (-z).exp());
        if !p.is_finite() {
            return Err(ModelError::Evaluation(format!(
                "decision function produced {}",
                z
            )));
        }
        Ok(vec![1.0 - p, p])
    }
}
