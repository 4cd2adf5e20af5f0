use crate::error::IforestError;

/// Check an unlabeled numeric training set and return its feature column count.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IforestError::EmptyDataset`] | `features` is empty |
/// | [`IforestError::ZeroFeatures`] | rows have zero feature columns |
/// | [`IforestError::FeatureCountMismatch`] | rows have inconsistent lengths |
/// | [`IforestError::NonFiniteValue`] | a value is NaN or infinite |
pub(crate) fn validate_training_set(features: &[Vec<f64>]) -> Result<usize, IforestError> {
    let first = features.first().ok_or(IforestError::EmptyDataset)?;
    let n_features = first.len();
    if n_features == 0 {
        return Err(IforestError::ZeroFeatures);
    }

    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(IforestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(IforestError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }

    Ok(n_features)
}

#[cfg(test)]
mod tests {
    use super::validate_training_set;
    use crate::IforestError;

    #[test]
    fn accepts_rectangular_finite_data() {
        assert_eq!(validate_training_set(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap(), 2);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(validate_training_set(&[]), Err(IforestError::EmptyDataset)));
        assert!(matches!(
            validate_training_set(&[vec![], vec![]]),
            Err(IforestError::ZeroFeatures)
        ));
        assert!(matches!(
            validate_training_set(&[vec![1.0, 2.0], vec![3.0]]),
            Err(IforestError::FeatureCountMismatch {
                expected: 2,
                got: 1,
                sample_index: 1
            })
        ));
    }

    #[test]
    fn rejects_non_finite() {
        assert!(matches!(
            validate_training_set(&[vec![1.0, 2.0], vec![3.0, f64::NAN]]),
            Err(IforestError::NonFiniteValue {
                sample_index: 1,
                feature_index: 1
            })
        ));
        assert!(matches!(
            validate_training_set(&[vec![f64::INFINITY]]),
            Err(IforestError::NonFiniteValue { .. })
        ));
    }
}
