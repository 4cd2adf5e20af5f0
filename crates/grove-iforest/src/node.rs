use std::fmt;

/// Zero-based feature column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
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

/// Index into the node arena of an isolation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// The root of every fitted tree.
    pub const ROOT: NodeIndex = NodeIndex(0);

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

/// Random axis-aligned cut: samples with `sample[feature] <= threshold` go left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cut {
    /// Column the cut is made on.
    pub feature: FeatureIndex,
    /// Cut position, drawn uniformly in `[min, max)` of the node's rows.
    pub threshold: f64,
}

/// A node in an isolation tree arena.
///
/// Nodes keep only their row count: path lengths need nothing else.
#[derive(Debug, Clone)]
pub struct IsolationNode {
    pub(crate) n_samples: usize,
    pub(crate) depth: usize,
    pub(crate) cut: Option<Cut>,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
}

impl IsolationNode {
    pub(crate) fn new(n_samples: usize, depth: usize) -> Self {
        Self {
            n_samples,
            depth,
            cut: None,
            left: None,
            right: None,
        }
    }

    /// Number of training rows that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Depth of this node; the root is at depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The cut made at this node, if it was split.
    #[must_use]
    pub fn cut(&self) -> Option<Cut> {
        self.cut
    }

    /// Left child (rows at or below the cut).
    #[must_use]
    pub fn left(&self) -> Option<NodeIndex> {
        self.left
    }

    /// Right child (rows above the cut).
    #[must_use]
    pub fn right(&self) -> Option<NodeIndex> {
        self.right
    }

    /// Returns `true` if this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
