//! History Signals
//!
//! Derives the engagement and success scalars from a user's past exercise
//! sessions: engagement is the number of sessions, success is the mean of
//! the scores that were recorded (0.5 when none were).

use serde::{Deserialize, Serialize};

use crate::state::RawScalar;
use crate::types::NEUTRAL_VALUE;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySignals {
    pub engagement: f64,
    pub success: f64,
}

impl HistorySignals {
    /// One entry per session, `None` for sessions without a graded score
    pub fn from_scores(scores: &[Option<f64>]) -> Self {
        let graded: Vec<f64> = scores
            .iter()
            .filter_map(|s| *s)
            .filter(|s| s.is_finite())
            .collect();
        let success = if graded.is_empty() {
            NEUTRAL_VALUE
        } else {
            graded.iter().sum::<f64>() / graded.len() as f64
        };
        Self {
            engagement: scores.len() as f64,
            success,
        }
    }

    pub fn engagement_scalar(&self) -> RawScalar {
        RawScalar::Number(self.engagement)
    }

    pub fn success_scalar(&self) -> RawScalar {
        RawScalar::Number(self.success)
    }
}

impl Default for HistorySignals {
    fn default() -> Self {
        Self::from_scores(&[])
    }
}
