use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    impurity::FrequencyTable,
    node::{Impurity, Node, NodeIndex},
    predict::Prediction,
    scalar::Scalar,
    split::find_best_split,
    validate::validate_training_set,
};

/// Configuration for a single decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `max_depth`         | 10                    |
/// | `min_samples_split` | 2                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | `None` (thread RNG)   |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) max_depth: usize,
    pub(crate) min_samples_split: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: Option<u64>,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            max_features: None,
            seed: None,
        }
    }

    /// Set the maximum tree depth.
    ///
    /// The root sits at depth 1, so `max_depth = 1` yields a single leaf.
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

    /// Set the number of candidate features drawn at each split.
    ///
    /// `None` means consider all features. Values above the column count
    /// are clamped.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Seed the random generator used by [`DecisionTree::fit`].
    ///
    /// `None` draws from the thread-local generator.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
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

    /// Return the maximum features to consider per split, if set.
    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    /// Return the random seed, if set.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub(crate) fn validate(&self) -> Result<(), RfError> {
        if self.max_depth == 0 {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.max_features == Some(0) {
            return Err(RfError::InvalidMaxFeatures { max_features: 0 });
        }
        Ok(())
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A greedy Gini decision tree over mixed numeric/categorical features.
///
/// Nodes live in an arena (`Vec<Node>`) and reference their children by
/// [`NodeIndex`]. The tree keeps its training set: every node owns the
/// indices of the rows that reached it, and leaves vote with those rows'
/// labels at prediction time.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: DecisionTreeConfig,
    nodes: Vec<Node>,
    features: Vec<Vec<Scalar>>,
    labels: Vec<Scalar>,
    n_features: usize,
}

impl DecisionTree {
    /// Create an untrained tree.
    #[must_use]
    pub fn new(config: DecisionTreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            features: Vec::new(),
            labels: Vec::new(),
            n_features: 0,
        }
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &DecisionTreeConfig {
        &self.config
    }

    /// Train on `features[sample][feature]` with one label per sample.
    ///
    /// Uses the configured seed, or the thread-local generator when unset.
    /// Any previous fit is discarded first.
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
    /// | [`RfError::InvalidMaxDepth`] | `max_depth` is 0 |
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split` < 2 |
    /// | [`RfError::InvalidMaxFeatures`] | `max_features` is `Some(0)` |
    pub fn fit(&mut self, features: &[Vec<Scalar>], labels: &[Scalar]) -> Result<(), RfError> {
        match self.config.seed {
            Some(seed) => self.fit_with_rng(features, labels, &mut ChaCha8Rng::seed_from_u64(seed)),
            None => self.fit_with_rng(features, labels, &mut rand::thread_rng()),
        }
    }

    /// Train using the supplied random generator.
    ///
    /// # Errors
    ///
    /// Same as [`DecisionTree::fit`].
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit_with_rng<R: Rng>(
        &mut self,
        features: &[Vec<Scalar>],
        labels: &[Scalar],
        rng: &mut R,
    ) -> Result<(), RfError> {
        self.clear();
        self.config.validate()?;
        validate_training_set(features, labels)?;
        self.grow(features.to_vec(), labels.to_vec(), rng);
        Ok(())
    }

    /// Build the tree from an already validated training set.
    pub(crate) fn grow<R: Rng>(&mut self, features: Vec<Vec<Scalar>>, labels: Vec<Scalar>, rng: &mut R) {
        let n_samples = features.len();
        self.n_features = features.first().map_or(0, Vec::len);
        self.features = features;
        self.labels = labels;
        self.nodes = vec![Node::new((0..n_samples).collect(), 1)];

        let max_features = self
            .config
            .max_features
            .unwrap_or(self.n_features)
            .min(self.n_features);

        // Nodes are independent once created, so visiting order is irrelevant.
        let mut worklist = vec![NodeIndex::ROOT];
        while let Some(idx) = worklist.pop() {
            if let Some((left, right)) = self.split_node(idx, max_features, rng) {
                worklist.push(left);
                worklist.push(right);
            }
        }

        debug!(
            n_samples,
            n_features = self.n_features,
            max_features,
            n_nodes = self.nodes.len(),
            depth = self.depth(),
            "decision tree built"
        );
    }

    /// Try to split one node; return its new children on success.
    fn split_node<R: Rng>(
        &mut self,
        idx: NodeIndex,
        max_features: usize,
        rng: &mut R,
    ) -> Option<(NodeIndex, NodeIndex)> {
        let node = &self.nodes[idx.index()];
        let table = FrequencyTable::from_labels(node.rows.iter().map(|&r| &self.labels[r]));
        let impurity = table.gini();
        let pure = table.n_distinct() <= 1;
        let n_samples = node.n_samples();
        let depth = node.depth;

        self.nodes[idx.index()].impurity = Impurity::new(impurity);

        if pure || n_samples < self.config.min_samples_split || depth >= self.config.max_depth {
            return None;
        }

        let split = find_best_split(
            &self.features,
            &self.labels,
            &self.nodes[idx.index()].rows,
            impurity,
            max_features,
            rng,
        )?;

        let left = NodeIndex::new(self.nodes.len());
        self.nodes.push(Node::new(split.left_rows, depth + 1));
        let right = NodeIndex::new(self.nodes.len());
        self.nodes.push(Node::new(split.right_rows, depth + 1));

        let node = &mut self.nodes[idx.index()];
        node.left = Some(left);
        node.right = Some(right);
        node.split = Some(split.rule);

        Some((left, right))
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.features.clear();
        self.labels.clear();
        self.n_features = 0;
    }

    /// Predict the label of a single sample.
    ///
    /// Returns the most frequent training label in the reached leaf, with
    /// `confidence` equal to its share of the leaf. Ties go to the label
    /// that occurs first among the leaf's rows.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`RfError::UntrainedModel`] | the tree has not been fitted |
    /// | [`RfError::PredictionFeatureMismatch`] | `sample.len() != n_features` |
    /// | [`RfError::InvalidTreeState`] | an internal node has no split rule |
    pub fn predict(&self, sample: &[Scalar]) -> Result<Prediction, RfError> {
        let leaf = self.traverse(sample)?;
        let node = &self.nodes[leaf.index()];
        let table = FrequencyTable::from_labels(node.rows.iter().map(|&r| &self.labels[r]));
        let (label, count) = table
            .most_frequent()
            .ok_or(RfError::InvalidTreeState { node: leaf })?;
        Ok(Prediction::new(
            label.clone(),
            count as f64 / node.n_samples() as f64,
        ))
    }

    /// Walk from the root to the leaf that `sample` falls into.
    fn traverse(&self, sample: &[Scalar]) -> Result<NodeIndex, RfError> {
        if self.nodes.is_empty() {
            return Err(RfError::UntrainedModel);
        }
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }

        let mut idx = NodeIndex::ROOT;
        loop {
            let node = &self.nodes[idx.index()];
            if node.is_leaf() {
                return Ok(idx);
            }
            let (Some(rule), Some(left), Some(right)) = (node.split.as_ref(), node.left, node.right)
            else {
                return Err(RfError::InvalidTreeState { node: idx });
            };
            idx = if rule.value.matches(&sample[rule.feature.index()]) {
                left
            } else {
                right
            };
        }
    }

    /// Return `true` once [`DecisionTree::fit`] has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Return the node arena; index 0 is the root.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of feature columns seen during training.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the training labels, indexed by the row ids stored in nodes.
    #[must_use]
    pub fn labels(&self) -> &[Scalar] {
        &self.labels
    }

    /// Return the total number of nodes in the tree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the depth of the deepest node, or 0 when untrained.
    ///
    /// A single-leaf tree has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Return the training rows owned by each leaf, in arena order.
    #[must_use]
    pub fn leaf_partitions(&self) -> Vec<&[usize]> {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .map(Node::rows)
            .collect()
    }
}
