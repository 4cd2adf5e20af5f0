use crate::node::NodeIndex;

/// Errors from isolation tree and isolation forest operations.
#[derive(Debug, thiserror::Error)]
pub enum IforestError {
    /// Returned when an internal node lacks its split descriptor.
    #[error("invalid isolation tree node {node}: internal node without a split")]
    InvalidTreeState {
        /// The offending node.
        node: NodeIndex,
    },

    /// Returned when scoring with an estimator that has not been fitted.
    #[error("model has not been trained; call fit before predicting")]
    UntrainedModel,

    /// Returned when n_estimators is zero.
    #[error("n_estimators must be at least 1, got {n_estimators}")]
    InvalidTreeCount {
        /// The invalid n_estimators value provided.
        n_estimators: usize,
    },

    /// Returned when subsample_size is zero.
    #[error("subsample_size must be at least 1, got {subsample_size}")]
    InvalidSubsampleSize {
        /// The invalid subsample_size value provided.
        subsample_size: usize,
    },

    /// Returned when an explicit max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature.
        feature_index: usize,
    },

    /// Returned when a sample has a different number of features at scoring time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },
}
