use std::fmt;

use crate::scalar::Scalar;

/// Zero-based feature column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Create a new feature index from a zero-based column position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// The root of every fitted tree.
    pub const ROOT: NodeIndex = NodeIndex(0);

    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gini impurity of the labels owned by a node.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    /// Create a new impurity value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// The question asked at an internal node.
///
/// A sample goes left when `value.matches(&sample[feature])`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRule {
    /// Feature column tested.
    pub feature: FeatureIndex,
    /// Threshold (numeric) or category (categorical) compared against.
    pub value: Scalar,
}

/// A node in a decision tree arena.
///
/// Each node owns the training rows that reached it, stored as indices into
/// the tree's training set. A node is a leaf iff both children are absent,
/// and carries a [`SplitRule`] iff it is internal.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) rows: Vec<usize>,
    pub(crate) depth: usize,
    pub(crate) impurity: Impurity,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
    pub(crate) split: Option<SplitRule>,
}

impl Node {
    pub(crate) fn new(rows: Vec<usize>, depth: usize) -> Self {
        Self {
            rows,
            depth,
            impurity: Impurity::new(0.0),
            left: None,
            right: None,
            split: None,
        }
    }

    /// Return the training row indices owned by this node.
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    /// Return the depth of this node; the root has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Return the Gini impurity of this node's labels.
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        self.impurity
    }

    /// Return the split rule of an internal node.
    #[must_use]
    pub fn split(&self) -> Option<&SplitRule> {
        self.split.as_ref()
    }

    /// Return the left child, if any.
    #[must_use]
    pub fn left(&self) -> Option<NodeIndex> {
        self.left
    }

    /// Return the right child, if any.
    #[must_use]
    pub fn right(&self) -> Option<NodeIndex> {
        self.right
    }

    /// Return `true` if this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
