//! Pretrained Decision Policy
//!
//! The policy is an opaque scoring function `state -> action index`. The
//! bundled implementation is a small feed-forward Q-network exported from
//! training as JSON; any other discrete-action policy can be plugged in by
//! implementing [`DecisionPolicy`].

mod network;

pub use network::{load_policy, DenseLayer, QNetworkPolicy, POLICY_FORMAT_VERSION};

use crate::error::AlgoError;
use crate::state::StateVector;

pub trait DecisionPolicy: Send + Sync {
    fn state_dim(&self) -> usize;

    fn action_count(&self) -> usize;

    /// Action values for every catalog index
    fn q_values(&self, state: &StateVector) -> Result<Vec<f64>, AlgoError>;

    /// Deterministic greedy action
    fn predict(&self, state: &StateVector) -> Result<usize, AlgoError> {
        let values = self.q_values(state)?;
        argmax(&values)
            .ok_or_else(|| AlgoError::PolicyShape("policy produced no finite action values".into()))
    }
}

/// Index of the largest finite value; ties resolve to the lowest index
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 0.9, 0.3]), Some(1));
    }

    #[test]
    fn argmax_breaks_ties_low() {
        assert_eq!(argmax(&[0.5, 0.9, 0.9]), Some(1));
    }

    #[test]
    fn argmax_skips_non_finite() {
        assert_eq!(argmax(&[f64::NAN, 0.2, f64::INFINITY]), Some(1));
        assert_eq!(argmax(&[f64::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn argmax_handles_negative_values() {
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), Some(1));
    }
}
