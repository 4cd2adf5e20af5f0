//! Criterion benchmarks for grove-iforest: forest training and batch scoring.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use grove_iforest::{IsolationForest, IsolationForestConfig};

fn make_data(n_samples: usize, n_features: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_samples)
        .map(|_| (0..n_features).map(|_| rng.r#gen::<f64>() * 10.0).collect())
        .collect()
}

fn bench_iforest_train(c: &mut Criterion) {
    let features = make_data(2000, 8, 42);
    let config = IsolationForestConfig::default().with_seed(Some(42));

    c.bench_function("iforest_train_2000x8_100trees", |b| {
        b.iter(|| {
            let mut forest = IsolationForest::new(config.clone());
            forest.fit(&features).unwrap();
        });
    });
}

fn bench_iforest_predict_batch(c: &mut Criterion) {
    let features = make_data(2000, 8, 42);
    let mut forest = IsolationForest::new(IsolationForestConfig::default().with_seed(Some(42)));
    forest.fit(&features).unwrap();

    c.bench_function("iforest_predict_batch_2000x8_100trees", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

criterion_group!(benches, bench_iforest_train, bench_iforest_predict_batch);
criterion_main!(benches);
