//! Decision tree and Random Forest classification: train, evaluate, predict.
//!
//! Provides a CART-style decision tree over mixed numeric/categorical
//! features split by Gini impurity, a bagged Random Forest with per-split
//! feature subsampling and majority voting, and a shuffled k-fold
//! cross-validation harness with binary classification metrics.

mod config;
mod confusion;
mod error;
mod eval;
mod forest;
mod impurity;
mod node;
mod predict;
mod scalar;
mod split;
mod tree;
mod validate;

pub use config::{MaxFeatures, RandomForestConfig};
pub use confusion::{ConfusionCounts, Metrics, Outcome, evaluate_metrics};
pub use error::RfError;
pub use eval::{CrossValidation, CrossValidationResult};
pub use forest::RandomForest;
pub use impurity::{FrequencyTable, gini};
pub use node::{FeatureIndex, Impurity, Node, NodeIndex, SplitRule};
pub use predict::Prediction;
pub use scalar::Scalar;
pub use tree::{DecisionTree, DecisionTreeConfig};
