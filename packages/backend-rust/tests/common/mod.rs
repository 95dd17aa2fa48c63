#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reframe_algo::{ActionCatalog, DecisionPolicy, QNetworkPolicy, StateProfile};
use reframe_backend::experience::MemorySink;
use reframe_backend::personalizer::{
    Personalizer, PersonalizerOptions, EXERCISE_PERSONALIZER, INTERVENTION_PERSONALIZER,
};
use reframe_backend::state::AppState;

pub fn options(seed: u64) -> PersonalizerOptions {
    PersonalizerOptions {
        pending_ttl: Duration::from_secs(600),
        max_pending: 1_000,
        fallback_seed: Some(seed),
    }
}

pub fn fallback_exercise(sink: Arc<MemorySink>) -> Personalizer {
    Personalizer::new(
        EXERCISE_PERSONALIZER,
        StateProfile::exercise(),
        ActionCatalog::exercises(),
        None,
        sink,
        options(7),
    )
    .unwrap()
}

/// Linear policy keyed on the distortion feature: values below 0.5 pick
/// the last exercise, values above 0.5 the first, exactly 0.5 ties to 0.
pub fn distortion_policy() -> QNetworkPolicy {
    let weights = (0..10)
        .map(|a| {
            let centre = a as f64 / 10.0;
            vec![-(centre * 2.0), 0.0, 0.0, 0.0, 0.0]
        })
        .collect();
    let bias = (0..10).map(|a| a as f64 / 10.0).collect();
    QNetworkPolicy::linear(weights, bias).unwrap()
}

pub fn policy_exercise(sink: Arc<MemorySink>) -> Personalizer {
    let policy: Arc<dyn DecisionPolicy> = Arc::new(distortion_policy());
    Personalizer::new(
        EXERCISE_PERSONALIZER,
        StateProfile::exercise(),
        ActionCatalog::exercises(),
        Some(policy),
        sink,
        options(7),
    )
    .unwrap()
}

pub fn fallback_intervention(sink: Arc<MemorySink>) -> Personalizer {
    Personalizer::new(
        INTERVENTION_PERSONALIZER,
        StateProfile::intervention(),
        ActionCatalog::interventions(),
        None,
        sink,
        options(13),
    )
    .unwrap()
}

pub fn memory_state() -> (AppState, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let state = AppState::new(
        Arc::new(fallback_exercise(Arc::clone(&sink))),
        Arc::new(fallback_intervention(Arc::clone(&sink))),
        sink.clone(),
    );
    (state, sink)
}

pub fn write_policy(dir: &Path, name: &str, policy: &QNetworkPolicy) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, policy.to_json().unwrap()).unwrap();
    path
}
