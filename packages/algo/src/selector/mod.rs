//! Action Selection
//!
//! Resolves a state into a catalog index. With a policy loaded the greedy
//! action is used; without one a uniform random index is drawn so the caller
//! always gets a usable action.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::catalog::ActionCatalog;
use crate::error::AlgoError;
use crate::policy::DecisionPolicy;
use crate::state::StateVector;
use crate::types::{ResolvedAction, SelectionMode};

/// Uniform sampler used in fallback mode
#[derive(Clone, Debug)]
pub struct FallbackSampler {
    rng: ChaCha8Rng,
}

impl FallbackSampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }

    /// Create a new instance with a specific seed (for testing)
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    pub fn sample(&mut self, len: usize) -> Result<usize, AlgoError> {
        if len == 0 {
            return Err(AlgoError::EmptyCatalog);
        }
        Ok(self.rng.gen_range(0..len))
    }
}

impl Default for FallbackSampler {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Pick an index for `state`.
///
/// The only error is a policy that answers with an index the catalog does not
/// have (or cannot score the state at all); that is an integration fault
/// between the exported policy and the catalog and is not masked.
pub fn resolve_action(
    policy: Option<&dyn DecisionPolicy>,
    catalog: &ActionCatalog,
    state: &StateVector,
    sampler: &mut FallbackSampler,
) -> Result<ResolvedAction, AlgoError> {
    match policy {
        Some(policy) => {
            let index = policy.predict(state)?;
            catalog.get(index)?;
            Ok(ResolvedAction {
                index,
                mode: SelectionMode::Policy,
            })
        }
        None => Ok(ResolvedAction {
            index: sampler.sample(catalog.len())?,
            mode: SelectionMode::Fallback,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::QNetworkPolicy;
    use std::collections::HashSet;

    struct FixedPolicy(usize);

    impl DecisionPolicy for FixedPolicy {
        fn state_dim(&self) -> usize {
            5
        }

        fn action_count(&self) -> usize {
            10
        }

        fn q_values(&self, _state: &StateVector) -> Result<Vec<f64>, AlgoError> {
            let mut q = vec![0.0; self.0 + 1];
            q[self.0] = 1.0;
            Ok(q)
        }
    }

    fn neutral_state() -> StateVector {
        StateVector::new(vec![0.5; 5])
    }

    #[test]
    fn fallback_stays_in_catalog() {
        let catalog = ActionCatalog::exercises();
        let mut sampler = FallbackSampler::with_seed(42);
        for _ in 0..200 {
            let resolved = resolve_action(None, &catalog, &neutral_state(), &mut sampler).unwrap();
            assert_eq!(resolved.mode, SelectionMode::Fallback);
            assert!(resolved.index < catalog.len());
        }
    }

    #[test]
    fn fallback_covers_catalog() {
        let catalog = ActionCatalog::interventions();
        let mut sampler = FallbackSampler::with_seed(7);
        let seen: HashSet<usize> = (0..500)
            .map(|_| {
                resolve_action(None, &catalog, &neutral_state(), &mut sampler)
                    .unwrap()
                    .index
            })
            .collect();
        assert_eq!(seen.len(), catalog.len());
    }

    #[test]
    fn seeded_samplers_are_reproducible() {
        let mut a = FallbackSampler::with_seed(99);
        let mut b = FallbackSampler::with_seed(99);
        let xs: Vec<usize> = (0..20).map(|_| a.sample(10).unwrap()).collect();
        let ys: Vec<usize> = (0..20).map(|_| b.sample(10).unwrap()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn sampler_rejects_empty_catalog() {
        let mut sampler = FallbackSampler::with_seed(1);
        assert!(matches!(sampler.sample(0), Err(AlgoError::EmptyCatalog)));
    }

    #[test]
    fn policy_selection_is_deterministic() {
        let catalog = ActionCatalog::exercises();
        let mut bias = vec![0.0; 10];
        bias[4] = 2.0;
        let policy = QNetworkPolicy::linear(vec![vec![0.1; 5]; 10], bias).unwrap();
        let mut sampler = FallbackSampler::with_seed(0);
        let first = resolve_action(Some(&policy), &catalog, &neutral_state(), &mut sampler).unwrap();
        for _ in 0..20 {
            let again =
                resolve_action(Some(&policy), &catalog, &neutral_state(), &mut sampler).unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(first.index, 4);
        assert_eq!(first.mode, SelectionMode::Policy);
    }

    #[test]
    fn out_of_range_policy_index_is_error() {
        let catalog = ActionCatalog::interventions();
        let policy = FixedPolicy(7);
        let mut sampler = FallbackSampler::with_seed(0);
        let err = resolve_action(Some(&policy), &catalog, &neutral_state(), &mut sampler)
            .unwrap_err();
        assert!(matches!(err, AlgoError::ActionOutOfRange { index: 7, len: 5 }));
    }
}
