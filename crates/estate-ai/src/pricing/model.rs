use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Inference seam between the predictor and a trained regression artifact.
pub trait PriceModel: Send + Sync {
    /// Score a single feature row; the first output is the price.
    fn predict(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// Training-time column order, when the artifact recorded one.
    fn expected_columns(&self) -> Option<&[String]>;
}

/// Failure raised while loading or evaluating a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unable to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("model artifact is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
    #[error("feature row has {actual} values but the model expects {expected}")]
    RowWidth { expected: usize, actual: usize },
    #[error("model evaluation failed: {0}")]
    Runtime(String),
}

/// Averaging ensemble of regressors, serialized as JSON.
///
/// ```json
/// {
///   "feature_names_in": ["area", "bedrooms"],
///   "estimators": [
///     { "kind": "linear", "coefficients": [310.5, 90000.0], "intercept": 125000.0 },
///     { "kind": "tree", "nodes": [
///         { "split": { "feature": 0, "threshold": 3000.0, "left": 1, "right": 2 } },
///         { "leaf": { "value": 4200000.0 } },
///         { "leaf": { "value": 6100000.0 } }
///     ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingRegressor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
    pub estimators: Vec<Estimator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    Tree {
        nodes: Vec<TreeNode>,
    },
}

/// Node of an array-encoded regression tree; node 0 is the root. Rows with
/// `row[feature] <= threshold` descend left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl VotingRegressor {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let model: VotingRegressor = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    /// Number of values each row must carry, if any estimator pins it.
    pub fn input_width(&self) -> Option<usize> {
        if let Some(names) = &self.feature_names_in {
            return Some(names.len());
        }
        self.estimators.iter().find_map(|estimator| match estimator {
            Estimator::Linear { coefficients, .. } => Some(coefficients.len()),
            Estimator::Tree { .. } => None,
        })
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.estimators.is_empty() {
            return Err(ModelError::Invalid("no estimators".to_string()));
        }

        let width = self.input_width();
        for (index, estimator) in self.estimators.iter().enumerate() {
            match estimator {
                Estimator::Linear { coefficients, .. } => {
                    if Some(coefficients.len()) != width {
                        return Err(ModelError::Invalid(format!(
                            "estimator {index} has {} coefficients, expected {}",
                            coefficients.len(),
                            width.unwrap_or_default()
                        )));
                    }
                }
                Estimator::Tree { nodes } => validate_tree(index, nodes, width)?,
            }
        }

        Ok(())
    }
}

fn validate_tree(index: usize, nodes: &[TreeNode], width: Option<usize>) -> Result<(), ModelError> {
    if nodes.is_empty() {
        return Err(ModelError::Invalid(format!("tree {index} has no nodes")));
    }

    for (position, node) in nodes.iter().enumerate() {
        if let TreeNode::Split {
            feature,
            left,
            right,
            ..
        } = node
        {
            // Children must point forward, which also rules out cycles.
            let forward = |child: usize| child > position && child < nodes.len();
            if !forward(*left) || !forward(*right) {
                return Err(ModelError::Invalid(format!(
                    "tree {index} node {position} has out-of-range children"
                )));
            }
            if width.is_some_and(|width| *feature >= width) {
                return Err(ModelError::Invalid(format!(
                    "tree {index} node {position} splits on unknown feature {feature}"
                )));
            }
        }
    }

    Ok(())
}

impl Estimator {
    fn evaluate(&self, row: &[f64]) -> Result<f64, ModelError> {
        match self {
            Estimator::Linear {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != row.len() {
                    return Err(ModelError::RowWidth {
                        expected: coefficients.len(),
                        actual: row.len(),
                    });
                }
                Ok(coefficients
                    .iter()
                    .zip(row)
                    .fold(*intercept, |acc, (weight, value)| acc + weight * value))
            }
            Estimator::Tree { nodes } => {
                let mut position = 0;
                loop {
                    match nodes.get(position) {
                        Some(TreeNode::Leaf { value }) => return Ok(*value),
                        Some(TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        }) => {
                            let value = row.get(*feature).ok_or(ModelError::RowWidth {
                                expected: feature + 1,
                                actual: row.len(),
                            })?;
                            position = if value <= threshold { *left } else { *right };
                        }
                        None => {
                            return Err(ModelError::Runtime(format!(
                                "tree node {position} does not exist"
                            )))
                        }
                    }
                }
            }
        }
    }
}

impl PriceModel for VotingRegressor {
    fn predict(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if let Some(expected) = self.input_width() {
            if expected != row.len() {
                return Err(ModelError::RowWidth {
                    expected,
                    actual: row.len(),
                });
            }
        }

        let mut total = 0.0;
        for estimator in &self.estimators {
            total += estimator.evaluate(row)?;
        }

        Ok(vec![total / self.estimators.len() as f64])
    }

    fn expected_columns(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }
}
