//! Prediction methods for the Random Forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::impurity::FrequencyTable;
use crate::scalar::Scalar;

/// A predicted label with the share of support behind it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Prediction {
    /// The predicted label.
    pub label: Scalar,
    /// Fraction of leaf rows (tree) or of trees (forest) backing `label`, in `[0, 1]`.
    pub confidence: f64,
}

impl Prediction {
    pub(crate) fn new(label: Scalar, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

impl RandomForest {
    /// Predict the label for a single sample by majority vote.
    ///
    /// Each tree casts one vote. The label with the most votes wins, ties
    /// going to whichever tied label the trees voted for first.
    /// `confidence` is the winning vote count over the number of trees.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`RfError::UntrainedModel`] | no trees have been trained |
    /// | [`RfError::PredictionFeatureMismatch`] | `sample.len() != n_features` |
    /// | [`RfError::InvalidTreeState`] | a member tree is malformed |
    pub fn predict(&self, sample: &[Scalar]) -> Result<Prediction, RfError> {
        if self.trees.is_empty() {
            return Err(RfError::UntrainedModel);
        }

        let votes: Vec<Scalar> = self
            .trees
            .iter()
            .map(|tree| tree.predict(sample).map(|p| p.label))
            .collect::<Result<_, _>>()?;

        let tally = FrequencyTable::from_labels(&votes);
        let (label, count) = tally.most_frequent().ok_or(RfError::UntrainedModel)?;

        Ok(Prediction::new(
            label.clone(),
            count as f64 / self.trees.len() as f64,
        ))
    }

    /// Predict labels for a batch of samples in parallel.
    ///
    /// Prediction never mutates the forest, so rows are scored concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error any row produces; see [`RandomForest::predict`].
    pub fn predict_batch(&self, features: &[Vec<Scalar>]) -> Result<Vec<Prediction>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RandomForestConfig;
    use crate::forest::RandomForest;
    use crate::{RfError, Scalar};

    fn fruit() -> (Vec<Vec<Scalar>>, Vec<Scalar>) {
        let features = vec![
            vec![Scalar::from("green"), Scalar::from(3)],
            vec![Scalar::from("yellow"), Scalar::from(3)],
            vec![Scalar::from("red"), Scalar::from(1)],
            vec![Scalar::from("red"), Scalar::from(1)],
            vec![Scalar::from("yellow"), Scalar::from(3)],
        ];
        let labels = ["apple", "apple", "grape", "grape", "lemon"]
            .into_iter()
            .map(Scalar::from)
            .collect();
        (features, labels)
    }

    #[test]
    fn untrained_forest_rejects_prediction() {
        let forest = RandomForest::new(RandomForestConfig::default());
        let err = forest.predict(&[Scalar::from(1.0)]).unwrap_err();
        assert!(matches!(err, RfError::UntrainedModel));
    }

    #[test]
    fn confidence_is_a_vote_share() {
        let (features, labels) = fruit();
        let mut forest = RandomForest::new(RandomForestConfig::new(40).unwrap().with_seed(Some(8)));
        forest.fit(&features, &labels).unwrap();

        for sample in &features {
            let p = forest.predict(sample).unwrap();
            assert!((0.0..=1.0).contains(&p.confidence));
            let votes = (p.confidence * 40.0).round() as usize;
            assert!(votes >= 1);
            let agreeing = forest
                .trees()
                .iter()
                .filter(|t| t.predict(sample).unwrap().label == p.label)
                .count();
            assert_eq!(agreeing, votes);
        }
    }

    #[test]
    fn batch_matches_individual() {
        let (features, labels) = fruit();
        let mut forest = RandomForest::new(RandomForestConfig::new(10).unwrap().with_seed(Some(2)));
        forest.fit(&features, &labels).unwrap();
        let batch = forest.predict_batch(&features).unwrap();
        for (sample, batched) in features.iter().zip(&batch) {
            assert_eq!(&forest.predict(sample).unwrap(), batched);
        }
    }

    #[test]
    fn wrong_width_is_rejected() {
        let (features, labels) = fruit();
        let mut forest = RandomForest::new(RandomForestConfig::new(3).unwrap().with_seed(Some(2)));
        forest.fit(&features, &labels).unwrap();
        let err = forest.predict(&[Scalar::from("red")]).unwrap_err();
        assert!(matches!(
            err,
            RfError::PredictionFeatureMismatch {
                expected: 2,
                got: 1
            }
        ));
    }
}
