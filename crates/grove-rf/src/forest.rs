//! Random Forest training.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::scalar::Scalar;
use crate::tree::{DecisionTree, DecisionTreeConfig};
use crate::validate::validate_training_set;

/// A bagged ensemble of decision trees voting by majority.
///
/// Empty until [`RandomForest::fit`] succeeds; every fit replaces the
/// previous ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) config: RandomForestConfig,
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
}

/// Draw `n_samples` row indices uniformly with replacement.
pub(crate) fn bootstrap_indices<R: Rng>(n_samples: usize, rng: &mut R) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

impl RandomForest {
    /// Create an untrained forest.
    #[must_use]
    pub fn new(config: RandomForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }

    /// Train the ensemble on `features[sample][feature]` and parallel `labels`.
    ///
    /// Uses the configured seed, or the thread-local generator when unset.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | `features` is empty |
    /// | [`RfError::LabelCountMismatch`] | label and row counts differ |
    /// | [`RfError::ZeroFeatures`] | rows have zero feature columns |
    /// | [`RfError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`RfError::NonFiniteValue`] | a numeric value is NaN or infinite |
    /// | [`RfError::InvalidTreeCount`] | `n_estimators` is zero |
    /// | [`RfError::InvalidMaxDepth`] | `max_depth` is zero |
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split` < 2 |
    pub fn fit(&mut self, features: &[Vec<Scalar>], labels: &[Scalar]) -> Result<(), RfError> {
        match self.config.seed {
            Some(seed) => self.fit_with_rng(features, labels, &mut ChaCha8Rng::seed_from_u64(seed)),
            None => self.fit_with_rng(features, labels, &mut rand::thread_rng()),
        }
    }

    /// Train using the supplied random generator.
    ///
    /// Each tree is grown on its own bootstrap sample (`n` draws with
    /// replacement) with `max_features` resolved once from the column count.
    ///
    /// # Errors
    ///
    /// Same as [`RandomForest::fit`].
    #[instrument(skip_all, fields(n_estimators = self.config.n_estimators, n_samples = features.len()))]
    pub fn fit_with_rng<R: Rng>(
        &mut self,
        features: &[Vec<Scalar>],
        labels: &[Scalar],
        rng: &mut R,
    ) -> Result<(), RfError> {
        self.trees.clear();
        self.n_features = 0;

        if self.config.n_estimators == 0 {
            return Err(RfError::InvalidTreeCount {
                n_estimators: self.config.n_estimators,
            });
        }

        let n_samples = features.len();
        let n_features = validate_training_set(features, labels)?;
        let max_features = self.config.max_features.resolve(n_features);

        let tree_config = DecisionTreeConfig::new()
            .with_max_depth(self.config.max_depth)
            .with_min_samples_split(self.config.min_samples_split)
            .with_max_features(Some(max_features));
        tree_config.validate()?;

        info!(
            n_estimators = self.config.n_estimators,
            n_samples,
            n_features,
            max_features,
            "training random forest"
        );

        let mut trees = Vec::with_capacity(self.config.n_estimators);
        for tree_index in 0..self.config.n_estimators {
            let indices = bootstrap_indices(n_samples, rng);
            let boot_features: Vec<Vec<Scalar>> =
                indices.iter().map(|&i| features[i].clone()).collect();
            let boot_labels: Vec<Scalar> = indices.iter().map(|&i| labels[i].clone()).collect();

            let mut tree = DecisionTree::new(tree_config.clone());
            tree.grow(boot_features, boot_labels, rng);
            debug!(tree_index, n_nodes = tree.n_nodes(), depth = tree.depth(), "tree trained");
            trees.push(tree);
        }

        self.trees = trees;
        self.n_features = n_features;

        info!(n_trees = self.trees.len(), "random forest training complete");
        Ok(())
    }

    /// Return `true` once the forest holds trained trees.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Return the member trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{RandomForest, bootstrap_indices};
    use crate::config::{MaxFeatures, RandomForestConfig};
    use crate::{RfError, Scalar};

    /// A simple 3-class dataset separable on column 0.
    fn make_separable_data() -> (Vec<Vec<Scalar>>, Vec<Scalar>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for (class, offset) in [("a", 0.0), ("b", 10.0), ("c", 20.0)] {
            for i in 0..20 {
                features.push(vec![
                    Scalar::from(offset + i as f64 * 0.15),
                    Scalar::from(0.5),
                ]);
                labels.push(Scalar::from(class));
            }
        }
        (features, labels)
    }

    #[test]
    fn bootstrap_draws_with_replacement() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let indices = bootstrap_indices(50, &mut rng);
        assert_eq!(indices.len(), 50);
        assert!(indices.iter().all(|&i| i < 50));
        let mut unique = indices.clone();
        unique.sort_unstable();
        unique.dedup();
        // Drawing 50 of 50 with replacement virtually never hits every row.
        assert!(unique.len() < 50);
    }

    #[test]
    fn trains_requested_tree_count() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(RandomForestConfig::new(7).unwrap().with_seed(Some(1)));
        forest.fit(&features, &labels).unwrap();
        assert_eq!(forest.trees().len(), 7);
        assert!(forest.trees().iter().all(|t| t.depth() <= 10));
    }

    #[test]
    fn trees_use_sqrt_feature_bagging() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(RandomForestConfig::new(3).unwrap().with_seed(Some(1)));
        forest.fit(&features, &labels).unwrap();
        for tree in forest.trees() {
            assert_eq!(tree.config().max_features(), Some(1));
            assert_eq!(tree.config().max_depth(), 10);
        }
    }

    #[test]
    fn refit_replaces_trees() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(RandomForestConfig::new(5).unwrap().with_seed(Some(1)));
        forest.fit(&features, &labels).unwrap();
        forest.fit(&features, &labels).unwrap();
        assert_eq!(forest.trees().len(), 5);
    }

    #[test]
    fn failed_fit_clears_previous_trees() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(RandomForestConfig::new(5).unwrap().with_seed(Some(1)));
        forest.fit(&features, &labels).unwrap();
        let err = forest.fit(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
        assert!(!forest.is_fitted());
    }

    #[test]
    fn all_features_config_reaches_high_training_accuracy() {
        let (features, labels) = make_separable_data();
        let config = RandomForestConfig::new(25)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .with_seed(Some(42));
        let mut forest = RandomForest::new(config);
        forest.fit(&features, &labels).unwrap();

        let correct = features
            .iter()
            .zip(&labels)
            .filter(|(x, y)| forest.predict(x).unwrap().label == **y)
            .count();
        let accuracy = correct as f64 / labels.len() as f64;
        assert!(accuracy > 0.9, "accuracy = {accuracy}");
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels) = make_separable_data();
        let config = RandomForestConfig::new(10).unwrap().with_seed(Some(99));
        let mut f1 = RandomForest::new(config.clone());
        let mut f2 = RandomForest::new(config);
        f1.fit(&features, &labels).unwrap();
        f2.fit(&features, &labels).unwrap();
        assert_eq!(
            f1.predict_batch(&features).unwrap(),
            f2.predict_batch(&features).unwrap()
        );
    }
}
