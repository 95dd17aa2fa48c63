use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DecisionPolicy;
use crate::error::AlgoError;
use crate::state::StateVector;

pub const POLICY_FORMAT_VERSION: &str = "1";

/// Fully connected layer, `weights` is `[out][in]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl DenseLayer {
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Self {
        Self { weights, bias }
    }

    pub fn input_dim(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    pub fn output_dim(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(self.bias.iter())
            .map(|(row, b)| row.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect()
    }

    fn validate(&self, index: usize, expected_input: usize) -> Result<(), AlgoError> {
        if self.bias.is_empty() {
            return Err(AlgoError::PolicyShape(format!("layer {index} has no outputs")));
        }
        if self.weights.len() != self.bias.len() {
            return Err(AlgoError::PolicyShape(format!(
                "layer {index} has {} weight rows but {} biases",
                self.weights.len(),
                self.bias.len()
            )));
        }
        if let Some(row) = self.weights.iter().position(|r| r.len() != expected_input) {
            return Err(AlgoError::PolicyShape(format!(
                "layer {index} row {row} has {} inputs, expected {expected_input}",
                self.weights[row].len()
            )));
        }
        let finite = self.weights.iter().flatten().chain(self.bias.iter()).all(|v| v.is_finite());
        if !finite {
            return Err(AlgoError::PolicyShape(format!(
                "layer {index} contains non-finite parameters"
            )));
        }
        Ok(())
    }
}

/// Feed-forward Q-network: ReLU between layers, linear output head.
/// A single layer is a plain linear Q-function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QNetworkPolicy {
    #[serde(default = "default_version")]
    version: String,
    state_dim: usize,
    action_count: usize,
    layers: Vec<DenseLayer>,
}

fn default_version() -> String {
    POLICY_FORMAT_VERSION.to_string()
}

impl QNetworkPolicy {
    pub fn new(
        state_dim: usize,
        action_count: usize,
        layers: Vec<DenseLayer>,
    ) -> Result<Self, AlgoError> {
        let policy = Self {
            version: default_version(),
            state_dim,
            action_count,
            layers,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn linear(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Result<Self, AlgoError> {
        let layer = DenseLayer::new(weights, bias);
        Self::new(layer.input_dim(), layer.output_dim(), vec![layer])
    }

    fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn validate(&self) -> Result<(), AlgoError> {
        if self.layers.is_empty() {
            return Err(AlgoError::PolicyShape("network has no layers".into()));
        }
        if self.state_dim == 0 || self.action_count == 0 {
            return Err(AlgoError::PolicyShape(format!(
                "invalid dimensions state_dim={} action_count={}",
                self.state_dim, self.action_count
            )));
        }
        let mut expected_input = self.state_dim;
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate(i, expected_input)?;
            expected_input = layer.output_dim();
        }
        if expected_input != self.action_count {
            return Err(AlgoError::PolicyShape(format!(
                "output layer has {expected_input} units, expected {}",
                self.action_count
            )));
        }
        Ok(())
    }
}

impl DecisionPolicy for QNetworkPolicy {
    fn state_dim(&self) -> usize {
        self.state_dim
    }

    fn action_count(&self) -> usize {
        self.action_count
    }

    fn q_values(&self, state: &StateVector) -> Result<Vec<f64>, AlgoError> {
        if state.len() != self.state_dim {
            return Err(AlgoError::StateDimension {
                expected: self.state_dim,
                actual: state.len(),
            });
        }
        let last = self.layers.len() - 1;
        let mut activations = state.values().to_vec();
        for (i, layer) in self.layers.iter().enumerate() {
            activations = layer.forward(&activations);
            if i < last {
                for v in activations.iter_mut() {
                    *v = v.max(0.0);
                }
            }
        }
        Ok(activations)
    }
}

/// Read and validate a policy export
pub fn load_policy(path: impl AsRef<Path>) -> Result<QNetworkPolicy, AlgoError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| AlgoError::PolicyIo {
        path: path.to_path_buf(),
        source,
    })?;
    let policy = QNetworkPolicy::from_json(&text).map_err(|source| AlgoError::PolicyParse {
        path: path.to_path_buf(),
        source,
    })?;
    policy.validate()?;
    Ok(policy)
}
