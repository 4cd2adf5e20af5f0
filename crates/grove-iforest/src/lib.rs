//! Isolation forest anomaly detection over numeric feature vectors.
//!
//! Trees isolate points with random axis-aligned cuts; points that are
//! isolated after few cuts score close to 1.

mod error;
mod forest;
mod node;
mod path;
mod tree;
mod validate;

pub use error::IforestError;
pub use forest::{IsolationForest, IsolationForestConfig};
pub use node::{Cut, FeatureIndex, IsolationNode, NodeIndex};
pub use path::average_path_length;
pub use tree::{IsolationTree, IsolationTreeConfig};
