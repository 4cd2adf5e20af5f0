//! Configuration builder for Random Forest training.

use crate::error::RfError;

/// Strategy for determining the number of features to consider at each split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// Square root of total features, rounded down.
    Sqrt,
    /// Log base 2 of total features, rounded down.
    Log2,
    /// A fixed count (clamped to the number of features).
    Fixed(usize),
    /// All features (no subsampling).
    All,
}

impl MaxFeatures {
    /// Resolve the strategy to a concrete count for `n_features` columns.
    ///
    /// The result is always in `[1, n_features]` for `n_features >= 1`.
    #[must_use]
    pub fn resolve(self, n_features: usize) -> usize {
        let resolved = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        };
        resolved.clamp(1, n_features.max(1))
    }
}

/// Configuration for Random Forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default            |
/// |---------------------|--------------------|
/// | `n_estimators`      | 100                |
/// | `max_depth`         | 10                 |
/// | `min_samples_split` | 2                  |
/// | `max_features`      | `Sqrt`             |
/// | `seed`              | `None` (thread RNG) |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_estimators: usize,
    pub(crate) max_depth: usize,
    pub(crate) min_samples_split: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) seed: Option<u64>,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_estimators` is zero.
    pub fn new(n_estimators: usize) -> Result<Self, RfError> {
        if n_estimators == 0 {
            return Err(RfError::InvalidTreeCount { n_estimators });
        }
        Ok(Self {
            n_estimators,
            ..Self::default()
        })
    }

    // --- Setters ---

    /// Set the maximum tree depth (root is depth 1).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the max features strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Seed the random generator used by [`RandomForest::fit`](crate::RandomForest::fit).
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Return the maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the max features strategy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the random seed, if set.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            seed: None,
        }
    }
}
