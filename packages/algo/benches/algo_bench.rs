//! Benchmark suite for reframe-algo
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reframe_algo::{
    ActionCatalog, ContextFields, DecisionPolicy, DenseLayer, ExerciseContext, FallbackSampler,
    QNetworkPolicy, StateProfile,
};

fn sample_context() -> ContextFields {
    ContextFields::from(&ExerciseContext {
        distortion: Some("mind reading".into()),
        emotion: Some(" Anxious ".into()),
        engagement: 3.0.into(),
        success: "0.62".into(),
        domain: Some("stress management".into()),
    })
}

fn dqn_shaped_policy() -> QNetworkPolicy {
    let hidden = 64;
    let layer = |inputs: usize, outputs: usize, scale: f64| {
        let weights = (0..outputs)
            .map(|o| {
                (0..inputs)
                    .map(|i| ((o * 31 + i * 17) % 13) as f64 * scale - 0.3)
                    .collect()
            })
            .collect();
        DenseLayer::new(weights, vec![0.01; outputs])
    };
    QNetworkPolicy::new(
        5,
        10,
        vec![layer(5, hidden, 0.05), layer(hidden, hidden, 0.01), layer(hidden, 10, 0.01)],
    )
    .expect("valid bench policy")
}

fn bench_encode(c: &mut Criterion) {
    let profile = StateProfile::exercise();
    let fields = sample_context();
    c.bench_function("StateProfile::encode", |b| {
        b.iter(|| profile.encode(black_box(&fields)))
    });
}

fn bench_predict(c: &mut Criterion) {
    let profile = StateProfile::exercise();
    let state = profile.encode(&sample_context());
    let policy = dqn_shaped_policy();
    c.bench_function("QNetworkPolicy::predict", |b| {
        b.iter(|| policy.predict(black_box(&state)))
    });
}

fn bench_fallback(c: &mut Criterion) {
    let catalog = ActionCatalog::exercises();
    let mut sampler = FallbackSampler::with_seed(42);
    c.bench_function("FallbackSampler::sample", |b| {
        b.iter(|| sampler.sample(black_box(catalog.len())))
    });
}

criterion_group!(benches, bench_encode, bench_predict, bench_fallback);
criterion_main!(benches);
