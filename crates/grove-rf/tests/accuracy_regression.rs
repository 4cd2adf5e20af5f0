//! Accuracy regression tests for grove-rf.
//!
//! These tests verify that algorithmic changes do not degrade decision tree
//! and Random Forest accuracy on small deterministic datasets.

use std::cell::RefCell;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use grove_rf::{
    CrossValidation, DecisionTree, DecisionTreeConfig, MaxFeatures, RandomForest,
    RandomForestConfig, Scalar,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Five fruit rows with one categorical and one numeric column.
fn fruit() -> (Vec<Vec<Scalar>>, Vec<Scalar>) {
    let features = vec![
        vec![Scalar::from("green"), Scalar::from(3)],
        vec![Scalar::from("yellow"), Scalar::from(3)],
        vec![Scalar::from("red"), Scalar::from(1)],
        vec![Scalar::from("red"), Scalar::from(1)],
        vec![Scalar::from("yellow"), Scalar::from(3)],
    ];
    let labels = ["apple", "apple", "grape", "grape", "lemon"]
        .into_iter()
        .map(Scalar::from)
        .collect();
    (features, labels)
}

/// Generate a 300-sample, 6-feature, 3-class dataset.
///
/// Features 0-1 are informative (class * 3.0 + noise in [0, 0.5]).
/// Features 2-5 are pure noise in [0, 0.5].
/// Samples are assigned round-robin across classes.
fn make_classification() -> (Vec<Vec<Scalar>>, Vec<Scalar>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let class_names = ["setosa", "versicolor", "virginica"];
    let mut features = Vec::with_capacity(300);
    let mut labels = Vec::with_capacity(300);
    for i in 0..300 {
        let class = i % class_names.len();
        labels.push(Scalar::from(class_names[class]));
        let row = (0..6)
            .map(|f| {
                let base = if f < 2 { class as f64 * 3.0 } else { 0.0 };
                Scalar::from(base + rng.r#gen::<f64>() * 0.5)
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

// ---------------------------------------------------------------------------
// Fruit
// ---------------------------------------------------------------------------

/// A training row that only grapes share is voted grape across seeds.
#[test]
fn red_one_is_grape_across_seeds() {
    let (features, labels) = fruit();
    for seed in 0..20 {
        let mut forest =
            RandomForest::new(RandomForestConfig::new(100).unwrap().with_seed(Some(seed)));
        forest.fit(&features, &labels).unwrap();
        let p = forest
            .predict(&[Scalar::from("red"), Scalar::from(1)])
            .unwrap();
        assert_eq!(p.label, Scalar::from("grape"), "seed {seed}");
        assert!(p.confidence > 0.5, "seed {seed}: {}", p.confidence);
    }
}

/// `["red", 13]` draws a large share of grape votes: every tree rooted on the
/// colour column sends red to a grape leaf.
#[test]
fn red_thirteen_draws_grape_votes() {
    let (features, labels) = fruit();
    let sample = [Scalar::from("red"), Scalar::from(13)];
    let grape = Scalar::from("grape");

    let mut grape_votes = 0usize;
    let mut total_votes = 0usize;
    for seed in 0..20 {
        let mut forest =
            RandomForest::new(RandomForestConfig::new(100).unwrap().with_seed(Some(seed)));
        forest.fit(&features, &labels).unwrap();
        for tree in forest.trees() {
            if tree.predict(&sample).unwrap().label == grape {
                grape_votes += 1;
            }
            total_votes += 1;
        }
        let p = forest.predict(&sample).unwrap();
        assert!(p.confidence > 0.0 && p.confidence <= 1.0);
    }

    let share = grape_votes as f64 / total_votes as f64;
    assert!(share > 0.3, "grape vote share {share} <= 0.3");
}

/// `["red", 13]` is predicted grape by a clear majority of seeded forests.
#[test]
fn red_thirteen_is_mostly_predicted_grape() {
    let (features, labels) = fruit();
    let sample = [Scalar::from("red"), Scalar::from(13)];
    let grape = Scalar::from("grape");

    let n_seeds = 200u64;
    let mut grape_wins = 0u64;
    for seed in 0..n_seeds {
        let mut forest = RandomForest::new(RandomForestConfig::default().with_seed(Some(seed)));
        forest.fit(&features, &labels).unwrap();
        if forest.predict(&sample).unwrap().label == grape {
            grape_wins += 1;
        }
    }

    assert!(
        grape_wins * 10 >= n_seeds * 6,
        "grape predicted for {grape_wins} of {n_seeds} seeds"
    );
}

/// A single tree considering every column splits off the red rows first.
#[test]
fn single_tree_isolates_grapes() {
    let (features, labels) = fruit();
    let mut tree = DecisionTree::new(DecisionTreeConfig::new().with_seed(Some(0)));
    tree.fit(&features, &labels).unwrap();

    let p = tree
        .predict(&[Scalar::from("red"), Scalar::from(1)])
        .unwrap();
    assert_eq!(p.label, Scalar::from("grape"));
    assert_eq!(p.confidence, 1.0);
}

// ---------------------------------------------------------------------------
// Synthetic three-class data
// ---------------------------------------------------------------------------

/// 5-fold cross-validation accuracy with "setosa" as the positive class.
#[test]
fn cv_accuracy_above_threshold() {
    let (features, labels) = make_classification();
    let forest = RefCell::new(RandomForest::new(
        RandomForestConfig::new(30).unwrap().with_seed(Some(42)),
    ));
    let cv = CrossValidation::new(5).unwrap().with_seed(Some(42));

    let result = cv
        .evaluate(
            &features,
            &labels,
            &Scalar::from("setosa"),
            |x, y| forest.borrow_mut().fit(x, y),
            |x| forest.borrow().predict(x).map(|p| p.label),
        )
        .unwrap();

    assert_eq!(result.n_evaluated, 300);
    assert!(
        result.metrics.accuracy > 0.9,
        "cv accuracy {} <= 0.9",
        result.metrics.accuracy
    );
    assert!(
        result.metrics.f1_score > 0.9,
        "cv f1 {} <= 0.9",
        result.metrics.f1_score
    );
}

/// Training accuracy of a full-feature forest on separable data.
#[test]
fn training_accuracy_with_all_features() {
    let (features, labels) = make_classification();
    let config = RandomForestConfig::new(20)
        .unwrap()
        .with_max_features(MaxFeatures::All)
        .with_seed(Some(7));
    let mut forest = RandomForest::new(config);
    forest.fit(&features, &labels).unwrap();

    let predictions = forest.predict_batch(&features).unwrap();
    let correct = predictions
        .iter()
        .zip(&labels)
        .filter(|(p, y)| p.label == **y)
        .count();
    let accuracy = correct as f64 / labels.len() as f64;
    assert!(accuracy > 0.95, "training accuracy {accuracy} <= 0.95");
}
