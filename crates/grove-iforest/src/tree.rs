use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::error::IforestError;
use crate::node::{Cut, FeatureIndex, IsolationNode, NodeIndex};
use crate::path::average_path_length;
use crate::validate::validate_training_set;

/// Configuration for a single isolation tree.
///
/// # Defaults
///
/// | Parameter   | Default             |
/// |-------------|---------------------|
/// | `max_depth` | `None` (unbounded)  |
/// | `seed`      | `None` (thread RNG) |
///
/// Whatever `max_depth` says, a tree never grows past `ceil(log2(n))` for
/// `n` training rows.
#[derive(Debug, Clone, Default)]
pub struct IsolationTreeConfig {
    max_depth: Option<usize>,
    seed: Option<u64>,
}

impl IsolationTreeConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the depth (root is depth 1); `None` leaves only the `log2` cap.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Seed the random generator used by [`IsolationTree::fit`].
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Return the configured depth cap.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the random seed, if set.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub(crate) fn validate(&self) -> Result<(), IforestError> {
        match self.max_depth {
            Some(0) => Err(IforestError::InvalidMaxDepth { max_depth: 0 }),
            _ => Ok(()),
        }
    }
}

/// A randomized partition tree that isolates points with random cuts.
///
/// Stored as a flat arena of [`IsolationNode`]s rooted at [`NodeIndex::ROOT`].
#[derive(Debug, Clone)]
pub struct IsolationTree {
    config: IsolationTreeConfig,
    nodes: Vec<IsolationNode>,
    n_features: usize,
    depth_limit: usize,
}

/// Effective depth limit for a tree over `n_samples` rows.
fn depth_limit(max_depth: Option<usize>, n_samples: usize) -> usize {
    let default_max_depth = (n_samples as f64).log2().ceil() as usize;
    max_depth.map_or(default_max_depth, |d| d.min(default_max_depth))
}

impl IsolationTree {
    /// Create an untrained tree.
    #[must_use]
    pub fn new(config: IsolationTreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: 0,
            depth_limit: 0,
        }
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &IsolationTreeConfig {
        &self.config
    }

    /// Fit the tree on `features[sample][feature]`.
    ///
    /// Uses the configured seed, or the thread-local generator when unset.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`IforestError::EmptyDataset`] | `features` is empty |
    /// | [`IforestError::ZeroFeatures`] | rows have zero columns |
    /// | [`IforestError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`IforestError::NonFiniteValue`] | a value is NaN or infinite |
    /// | [`IforestError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    pub fn fit(&mut self, features: &[Vec<f64>]) -> Result<(), IforestError> {
        match self.config.seed {
            Some(seed) => self.fit_with_rng(features, &mut ChaCha8Rng::seed_from_u64(seed)),
            None => self.fit_with_rng(features, &mut rand::thread_rng()),
        }
    }

    /// Fit the tree using the supplied random generator.
    ///
    /// # Errors
    ///
    /// Same as [`IsolationTree::fit`].
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit_with_rng<R: Rng>(
        &mut self,
        features: &[Vec<f64>],
        rng: &mut R,
    ) -> Result<(), IforestError> {
        self.nodes.clear();
        self.n_features = 0;
        self.config.validate()?;
        validate_training_set(features)?;
        self.grow(features, (0..features.len()).collect(), rng);
        Ok(())
    }

    /// Build the tree over `rows` of an already validated matrix.
    ///
    /// `rows` may repeat indices; each occurrence counts as a separate sample.
    pub(crate) fn grow<R: Rng>(&mut self, features: &[Vec<f64>], rows: Vec<usize>, rng: &mut R) {
        let n_samples = rows.len();
        self.n_features = rows.first().map_or(0, |&r| features[r].len());
        self.depth_limit = depth_limit(self.config.max_depth, n_samples);
        self.nodes = vec![IsolationNode::new(n_samples, 1)];

        let mut worklist = vec![(NodeIndex::ROOT, rows)];
        while let Some((idx, rows)) = worklist.pop() {
            if let Some((left, right)) = self.split_node(idx, features, &rows, rng) {
                worklist.push(left);
                worklist.push(right);
            }
        }

        debug!(
            n_samples,
            depth_limit = self.depth_limit,
            n_nodes = self.nodes.len(),
            "isolation tree built"
        );
    }

    /// Cut one node at a random position; return each child with its rows.
    fn split_node<R: Rng>(
        &mut self,
        idx: NodeIndex,
        features: &[Vec<f64>],
        rows: &[usize],
        rng: &mut R,
    ) -> Option<((NodeIndex, Vec<usize>), (NodeIndex, Vec<usize>))> {
        let depth = self.nodes[idx.index()].depth;
        if depth >= self.depth_limit || rows.len() <= 2 {
            return None;
        }

        let feature = rng.gen_range(0..self.n_features);
        let (min, max) = rows
            .iter()
            .map(|&r| features[r][feature])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let threshold = min + rng.r#gen::<f64>() * (max - min);

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&r| features[r][feature] <= threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return None;
        }

        let left = NodeIndex::new(self.nodes.len());
        self.nodes.push(IsolationNode::new(left_rows.len(), depth + 1));
        let right = NodeIndex::new(self.nodes.len());
        self.nodes.push(IsolationNode::new(right_rows.len(), depth + 1));

        let node = &mut self.nodes[idx.index()];
        node.left = Some(left);
        node.right = Some(right);
        node.cut = Some(Cut {
            feature: FeatureIndex::new(feature),
            threshold,
        });

        Some(((left, left_rows), (right, right_rows)))
    }

    /// Return the isolation path length of `sample`.
    ///
    /// Descends by the recorded cuts until a node with a missing child, at
    /// most one row, or at the depth limit; returns that node's depth plus
    /// `c(n_samples)` to account for the unbuilt subtree.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`IforestError::UntrainedModel`] | the tree has not been fitted |
    /// | [`IforestError::PredictionFeatureMismatch`] | `sample.len() != n_features` |
    /// | [`IforestError::InvalidTreeState`] | an internal node has no cut |
    pub fn path_length(&self, sample: &[f64]) -> Result<f64, IforestError> {
        if self.nodes.is_empty() {
            return Err(IforestError::UntrainedModel);
        }
        if sample.len() != self.n_features {
            return Err(IforestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }

        let mut idx = NodeIndex::ROOT;
        loop {
            let node = self
                .nodes
                .get(idx.index())
                .ok_or(IforestError::InvalidTreeState { node: idx })?;

            let (left, right) = match (node.left, node.right) {
                (Some(left), Some(right))
                    if node.n_samples > 1 && node.depth < self.depth_limit =>
                {
                    (left, right)
                }
                _ => return Ok(node.depth as f64 + average_path_length(node.n_samples)),
            };

            let cut = node.cut.ok_or(IforestError::InvalidTreeState { node: idx })?;
            idx = if sample[cut.feature.index()] <= cut.threshold {
                left
            } else {
                right
            };
        }
    }

    // --- Introspection ---

    /// Returns `true` once the tree has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// The node arena; index 0 is the root.
    #[must_use]
    pub fn nodes(&self) -> &[IsolationNode] {
        &self.nodes
    }

    /// Number of feature columns seen during fitting.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Effective depth limit, `min(max_depth, ceil(log2(n)))`.
    #[must_use]
    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// Greatest node depth in the tree (0 when unfitted).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(IsolationNode::depth).max().unwrap_or(0)
    }

    /// Number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }
}
