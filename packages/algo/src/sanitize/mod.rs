//! Data Sanitization
//!
//! Numerical stability utilities for state features and rewards.

use crate::types::NEUTRAL_VALUE;

/// Clamp a feature into [0, 1]; non-finite values become neutral
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        NEUTRAL_VALUE
    }
}

/// Clamp every state component in place
pub fn sanitize_state(values: &mut [f64]) {
    for val in values.iter_mut() {
        *val = clamp_unit(*val);
    }
}

/// Rewards are recorded as-is but must be finite
pub fn is_valid_reward(reward: f64) -> bool {
    reward.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(7.0), 1.0);
        assert_eq!(clamp_unit(0.42), 0.42);
        assert_eq!(clamp_unit(f64::NAN), NEUTRAL_VALUE);
        assert_eq!(clamp_unit(f64::INFINITY), NEUTRAL_VALUE);
    }

    #[test]
    fn test_sanitize_state() {
        let mut x = vec![1.5, f64::NAN, 0.3, -1.0];
        sanitize_state(&mut x);
        assert_eq!(x, vec![1.0, NEUTRAL_VALUE, 0.3, 0.0]);
    }

    #[test]
    fn test_is_valid_reward() {
        assert!(is_valid_reward(0.71));
        assert!(is_valid_reward(-3.0));
        assert!(!is_valid_reward(f64::NAN));
    }
}
