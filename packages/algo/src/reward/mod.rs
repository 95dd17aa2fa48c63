//! Reward Composition
//!
//! reward = 0.7 * task_score + 0.3 * (rating - 1) / 4
//!
//! The rating is on a 1..=5 scale; a missing rating counts as the midpoint 3.
//! Inputs are not clamped, the arithmetic is kept exact.

use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_RATING, RATING_MIN, RATING_SPAN, TASK_SCORE_WEIGHT, USER_RATING_WEIGHT};

/// Map a 1..=5 rating onto [0, 1]; `None` is the midpoint
pub fn normalize_rating(rating: Option<f64>) -> f64 {
    (rating.unwrap_or(DEFAULT_RATING) - RATING_MIN) / RATING_SPAN
}

pub fn compose_reward(score: f64, rating: Option<f64>) -> f64 {
    RewardWeights::default().compose(score, rating)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardWeights {
    pub task_score: f64,
    pub user_rating: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            task_score: TASK_SCORE_WEIGHT,
            user_rating: USER_RATING_WEIGHT,
        }
    }
}

impl RewardWeights {
    pub fn compose(&self, score: f64, rating: Option<f64>) -> f64 {
        self.task_score * score + self.user_rating * normalize_rating(rating)
    }
}
