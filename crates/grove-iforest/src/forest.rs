//! Isolation forest training and anomaly scoring.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::error::IforestError;
use crate::path::average_path_length;
use crate::tree::{IsolationTree, IsolationTreeConfig};
use crate::validate::validate_training_set;

/// Configuration for isolation forest training.
///
/// Construct via [`IsolationForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter        | Default             |
/// |------------------|---------------------|
/// | `n_estimators`   | 100                 |
/// | `max_depth`      | `None` (unbounded)  |
/// | `subsample_size` | 256                 |
/// | `seed`           | `None` (thread RNG) |
#[derive(Debug, Clone)]
pub struct IsolationForestConfig {
    pub(crate) n_estimators: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) subsample_size: usize,
    pub(crate) seed: Option<u64>,
}

impl IsolationForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`IforestError::InvalidTreeCount`] if `n_estimators` is zero.
    pub fn new(n_estimators: usize) -> Result<Self, IforestError> {
        if n_estimators == 0 {
            return Err(IforestError::InvalidTreeCount { n_estimators });
        }
        Ok(Self {
            n_estimators,
            ..Self::default()
        })
    }

    /// Cap every tree's depth (root is depth 1).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set how many rows each tree is grown on.
    #[must_use]
    pub fn with_subsample_size(mut self, subsample_size: usize) -> Self {
        self.subsample_size = subsample_size;
        self
    }

    /// Seed the random generator used by [`IsolationForest::fit`].
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Return the depth cap.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the requested subsample size.
    #[must_use]
    pub fn subsample_size(&self) -> usize {
        self.subsample_size
    }

    /// Return the random seed, if set.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            subsample_size: 256,
            seed: None,
        }
    }
}

/// An ensemble of isolation trees scoring how easily points are isolated.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    config: IsolationForestConfig,
    trees: Vec<IsolationTree>,
    subsample_size: usize,
    n_features: usize,
}

impl IsolationForest {
    /// Create an untrained forest.
    #[must_use]
    pub fn new(config: IsolationForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            subsample_size: 0,
            n_features: 0,
        }
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &IsolationForestConfig {
        &self.config
    }

    /// Train the forest on unlabeled `features[sample][feature]`.
    ///
    /// Uses the configured seed, or the thread-local generator when unset.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`IforestError::InvalidTreeCount`] | `n_estimators` is zero |
    /// | [`IforestError::InvalidSubsampleSize`] | `subsample_size` is zero |
    /// | [`IforestError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`IforestError::EmptyDataset`] | `features` is empty |
    /// | [`IforestError::ZeroFeatures`] | rows have zero columns |
    /// | [`IforestError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`IforestError::NonFiniteValue`] | a value is NaN or infinite |
    pub fn fit(&mut self, features: &[Vec<f64>]) -> Result<(), IforestError> {
        match self.config.seed {
            Some(seed) => self.fit_with_rng(features, &mut ChaCha8Rng::seed_from_u64(seed)),
            None => self.fit_with_rng(features, &mut rand::thread_rng()),
        }
    }

    /// Train using the supplied random generator.
    ///
    /// Each tree is grown on `s = min(subsample_size, n)` rows drawn with
    /// replacement.
    ///
    /// # Errors
    ///
    /// Same as [`IsolationForest::fit`].
    #[instrument(skip_all, fields(n_estimators = self.config.n_estimators, n_samples = features.len()))]
    pub fn fit_with_rng<R: Rng>(
        &mut self,
        features: &[Vec<f64>],
        rng: &mut R,
    ) -> Result<(), IforestError> {
        self.trees.clear();
        self.subsample_size = 0;
        self.n_features = 0;

        if self.config.n_estimators == 0 {
            return Err(IforestError::InvalidTreeCount {
                n_estimators: self.config.n_estimators,
            });
        }
        if self.config.subsample_size == 0 {
            return Err(IforestError::InvalidSubsampleSize {
                subsample_size: self.config.subsample_size,
            });
        }

        let tree_config = IsolationTreeConfig::new().with_max_depth(self.config.max_depth);
        tree_config.validate()?;
        let n_features = validate_training_set(features)?;

        let n_samples = features.len();
        let subsample_size = self.config.subsample_size.min(n_samples);

        info!(
            n_estimators = self.config.n_estimators,
            n_samples,
            n_features,
            subsample_size,
            "training isolation forest"
        );

        let mut trees = Vec::with_capacity(self.config.n_estimators);
        for tree_index in 0..self.config.n_estimators {
            let rows: Vec<usize> = (0..subsample_size)
                .map(|_| rng.gen_range(0..n_samples))
                .collect();
            let mut tree = IsolationTree::new(tree_config.clone());
            tree.grow(features, rows, rng);
            debug!(tree_index, n_nodes = tree.nodes().len(), depth = tree.depth(), "tree trained");
            trees.push(tree);
        }

        self.trees = trees;
        self.subsample_size = subsample_size;
        self.n_features = n_features;

        info!(n_trees = self.trees.len(), "isolation forest training complete");
        Ok(())
    }

    /// Return the anomaly score of `sample`.
    ///
    /// `score = 2^(-mean_path / c(s))`. Scores near 1 mark anomalies, scores
    /// near 0.5 or below mark normal points. When every tree was grown on a
    /// single row, `c(s)` is zero and every score is 0.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`IforestError::UntrainedModel`] | no trees have been trained |
    /// | [`IforestError::PredictionFeatureMismatch`] | `sample.len() != n_features` |
    /// | [`IforestError::InvalidTreeState`] | a member tree is malformed |
    pub fn predict(&self, sample: &[f64]) -> Result<f64, IforestError> {
        if self.trees.is_empty() {
            return Err(IforestError::UntrainedModel);
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.path_length(sample)?;
        }
        let mean_path = total / self.trees.len() as f64;

        Ok(2f64.powf(-mean_path / average_path_length(self.subsample_size)))
    }

    /// Score a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first error any row produces; see [`IsolationForest::predict`].
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, IforestError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Effective subsample size `s` from the last fit (0 when unfitted).
    #[must_use]
    pub fn subsample_size(&self) -> usize {
        self.subsample_size
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the number of features the forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Returns `true` once the forest holds trained trees.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Return the member trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }
}
