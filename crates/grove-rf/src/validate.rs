use crate::error::RfError;
use crate::scalar::Scalar;

/// Check a labeled training set and return its feature column count.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RfError::EmptyDataset`] | `features` is empty |
/// | [`RfError::LabelCountMismatch`] | `labels.len() != features.len()` |
/// | [`RfError::ZeroFeatures`] | rows have zero feature columns |
/// | [`RfError::FeatureCountMismatch`] | rows have inconsistent lengths |
/// | [`RfError::NonFiniteValue`] | a numeric cell or label is NaN or infinite |
pub(crate) fn validate_training_set(
    features: &[Vec<Scalar>],
    labels: &[Scalar],
) -> Result<usize, RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }

    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }

    for (sample_index, (row, label)) in features.iter().zip(labels).enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index: Some(feature_index),
            });
        }
        if !label.is_finite() {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index: None,
            });
        }
    }

    Ok(n_features)
}

#[cfg(test)]
mod tests {
    use super::validate_training_set;
    use crate::{RfError, Scalar};

    fn row(values: &[f64]) -> Vec<Scalar> {
        values.iter().copied().map(Scalar::from).collect()
    }

    #[test]
    fn returns_column_count() {
        let features = vec![row(&[1.0, 2.0]), row(&[3.0, 4.0])];
        let labels = vec![Scalar::from("a"), Scalar::from("b")];
        assert_eq!(validate_training_set(&features, &labels).unwrap(), 2);
    }

    #[test]
    fn empty_dataset() {
        let err = validate_training_set(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn label_count_mismatch() {
        let features = vec![row(&[1.0]), row(&[2.0])];
        let labels = vec![Scalar::from("a")];
        let err = validate_training_set(&features, &labels).unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelCountMismatch {
                n_samples: 2,
                n_labels: 1
            }
        ));
    }

    #[test]
    fn ragged_rows() {
        let features = vec![row(&[1.0, 2.0]), row(&[3.0])];
        let labels = vec![Scalar::from(0), Scalar::from(1)];
        let err = validate_training_set(&features, &labels).unwrap_err();
        assert!(matches!(
            err,
            RfError::FeatureCountMismatch {
                expected: 2,
                got: 1,
                sample_index: 1
            }
        ));
    }

    #[test]
    fn nan_feature_and_label() {
        let features = vec![row(&[1.0, f64::NAN])];
        let labels = vec![Scalar::from(0)];
        let err = validate_training_set(&features, &labels).unwrap_err();
        assert!(matches!(
            err,
            RfError::NonFiniteValue {
                sample_index: 0,
                feature_index: Some(1)
            }
        ));

        let features = vec![row(&[1.0])];
        let labels = vec![Scalar::Number(f64::INFINITY)];
        let err = validate_training_set(&features, &labels).unwrap_err();
        assert!(matches!(
            err,
            RfError::NonFiniteValue {
                feature_index: None,
                ..
            }
        ));
    }

    #[test]
    fn zero_columns() {
        let features = vec![Vec::new()];
        let labels = vec![Scalar::from("a")];
        let err = validate_training_set(&features, &labels).unwrap_err();
        assert!(matches!(err, RfError::ZeroFeatures));
    }
}
