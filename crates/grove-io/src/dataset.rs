use grove_rf::Scalar;

use crate::IoError;

/// A table of feature rows with an optional label column.
///
/// Cells are [`Scalar`]s: numeric text becomes [`Scalar::Number`], anything
/// else [`Scalar::Categorical`].
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    feature_names: Vec<String>,
    features: Vec<Vec<Scalar>>,
    labels: Option<Vec<Scalar>>,
}

impl LabeledDataset {
    pub(crate) fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<Scalar>>,
        labels: Option<Vec<Scalar>>,
    ) -> Self {
        Self {
            feature_names,
            features,
            labels,
        }
    }

    /// Feature column names in file order, label column excluded.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Row-major feature matrix.
    #[must_use]
    pub fn features(&self) -> &[Vec<Scalar>] {
        &self.features
    }

    /// Labels, when a label column was requested.
    #[must_use]
    pub fn labels(&self) -> Option<&[Scalar]> {
        self.labels.as_deref()
    }

    /// Number of data rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Reorder feature columns to follow `names`.
    ///
    /// Rows are matched to columns by header name, so a file listing the
    /// training columns in another order is rearranged into training order.
    /// Labels are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::ColumnMismatch`] when a name in `names` is absent,
    /// a dataset column is not in `names`, or a name repeats.
    pub fn aligned_to(&self, names: &[String]) -> Result<LabeledDataset, IoError> {
        let mismatch = || IoError::ColumnMismatch {
            expected: names.to_vec(),
            got: self.feature_names.clone(),
        };
        if names.len() != self.feature_names.len() {
            return Err(mismatch());
        }

        let mut order = Vec::with_capacity(names.len());
        for name in names {
            let position = self
                .feature_names
                .iter()
                .position(|n| n == name)
                .ok_or_else(mismatch)?;
            if order.contains(&position) {
                return Err(mismatch());
            }
            order.push(position);
        }

        if order.iter().copied().eq(0..order.len()) {
            return Ok(self.clone());
        }

        let features = self
            .features
            .iter()
            .map(|row| order.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(LabeledDataset::new(
            names.to_vec(),
            features,
            self.labels.clone(),
        ))
    }

    /// Convert every feature cell to `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NonNumericValue`] for the first categorical cell.
    pub fn numeric_features(&self) -> Result<Vec<Vec<f64>>, IoError> {
        self.features
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                row.iter()
                    .zip(&self.feature_names)
                    .map(|(cell, column)| {
                        cell.as_number().ok_or_else(|| IoError::NonNumericValue {
                            column: column.clone(),
                            row_index,
                            raw: cell.to_string(),
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> LabeledDataset {
        LabeledDataset::new(
            vec!["color".into(), "size".into()],
            vec![
                vec![Scalar::from("red"), Scalar::from(1.0)],
                vec![Scalar::from("green"), Scalar::from(3.0)],
            ],
            Some(vec![Scalar::from("grape"), Scalar::from("apple")]),
        )
    }

    #[test]
    fn accessors() {
        let ds = dataset();
        assert_eq!(ds.n_samples(), 2);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.labels().unwrap()[1], Scalar::from("apple"));
    }

    #[test]
    fn numeric_features_rejects_categories() {
        let err = dataset().numeric_features().unwrap_err();
        match err {
            IoError::NonNumericValue {
                column,
                row_index,
                raw,
            } => {
                assert_eq!(column, "color");
                assert_eq!(row_index, 0);
                assert_eq!(raw, "red");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn aligned_to_reorders_swapped_columns() {
        let swapped = LabeledDataset::new(
            names(&["size", "color"]),
            vec![vec![Scalar::from(1.0), Scalar::from("red")]],
            None,
        );
        let aligned = swapped.aligned_to(&names(&["color", "size"])).unwrap();
        assert_eq!(aligned.feature_names(), &["color", "size"]);
        assert_eq!(
            aligned.features()[0],
            vec![Scalar::from("red"), Scalar::from(1.0)]
        );
    }

    #[test]
    fn aligned_to_keeps_matching_order_and_labels() {
        let ds = dataset();
        let aligned = ds.aligned_to(&names(&["color", "size"])).unwrap();
        assert_eq!(aligned.features(), ds.features());
        assert_eq!(aligned.labels(), ds.labels());
    }

    #[test]
    fn aligned_to_rejects_unknown_or_missing_columns() {
        let ds = dataset();
        for expected in [
            names(&["color", "weight"]),
            names(&["color"]),
            names(&["color", "size", "weight"]),
            names(&["color", "color"]),
        ] {
            match ds.aligned_to(&expected).unwrap_err() {
                IoError::ColumnMismatch { expected: e, got } => {
                    assert_eq!(e, expected);
                    assert_eq!(got, names(&["color", "size"]));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn numeric_features_converts_numbers() {
        let ds = LabeledDataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![Scalar::from(1.5), Scalar::from(-2.0)]],
            None,
        );
        assert_eq!(ds.numeric_features().unwrap(), vec![vec![1.5, -2.0]]);
        assert!(ds.labels().is_none());
    }
}
