//! Common Types and Constants
//!
//! Shared data structures used across all algorithm modules.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Value used for any category label or scalar that cannot be resolved
pub const NEUTRAL_VALUE: f64 = 0.5;

/// Rating assumed when the user skipped the satisfaction prompt
pub const DEFAULT_RATING: f64 = 3.0;

/// Lowest point of the satisfaction scale
pub const RATING_MIN: f64 = 1.0;

/// Width of the 1..=5 satisfaction scale
pub const RATING_SPAN: f64 = 4.0;

/// Weight of the graded task score in the composed reward
pub const TASK_SCORE_WEIGHT: f64 = 0.7;

/// Weight of the normalized user rating in the composed reward
pub const USER_RATING_WEIGHT: f64 = 0.3;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

// ==================== Selection Types ====================

/// How an action was chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Argmax of the pretrained policy
    Policy,
    /// Uniform random choice because no policy is loaded
    Fallback,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Fallback => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

/// Probability with which `mode` picks any particular action.
///
/// Logged with every experience so offline retraining can reweight the
/// uniform fallback samples against greedy policy samples.
pub fn propensity(mode: SelectionMode, catalog_len: usize) -> f64 {
    match mode {
        SelectionMode::Policy => 1.0,
        SelectionMode::Fallback if catalog_len > 0 => 1.0 / catalog_len as f64,
        SelectionMode::Fallback => 0.0,
    }
}

/// Result of resolving an action index against a catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAction {
    pub index: usize,
    pub mode: SelectionMode,
}
