//! Shuffled k-fold cross-validation over caller-supplied fit/predict closures.

use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::confusion::{ConfusionCounts, Metrics, Outcome};
use crate::error::RfError;

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: Option<u64>,
}

/// Results of k-fold cross-validation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CrossValidationResult {
    /// Metrics over every held-out prediction from every fold.
    pub metrics: Metrics,
    /// Confusion counts behind `metrics`.
    pub counts: ConfusionCounts,
    /// Plain accuracy of each fold.
    pub fold_accuracies: Vec<f64>,
    /// Number of folds.
    pub n_folds: usize,
    /// Number of held-out predictions made.
    pub n_evaluated: usize,
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, RfError> {
        if n_folds < 2 {
            return Err(RfError::InvalidFoldCount { n_folds });
        }
        Ok(Self {
            n_folds,
            seed: None,
        })
    }

    /// Seed the row shuffle; `None` uses the thread-local generator.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Run k-fold cross-validation with the configured seed.
    ///
    /// See [`CrossValidation::evaluate_with_rng`].
    ///
    /// # Errors
    ///
    /// Same as [`CrossValidation::evaluate_with_rng`].
    pub fn evaluate<F, L, E, Fit, Pred>(
        &self,
        features: &[F],
        labels: &[L],
        positive_label: &L,
        fit: Fit,
        predict: Pred,
    ) -> Result<CrossValidationResult, E>
    where
        F: Clone,
        L: Clone + PartialEq,
        E: From<RfError>,
        Fit: FnMut(&[F], &[L]) -> Result<(), E>,
        Pred: FnMut(&F) -> Result<L, E>,
    {
        match self.seed {
            Some(seed) => self.evaluate_with_rng(
                features,
                labels,
                positive_label,
                fit,
                predict,
                &mut ChaCha8Rng::seed_from_u64(seed),
            ),
            None => self.evaluate_with_rng(
                features,
                labels,
                positive_label,
                fit,
                predict,
                &mut rand::thread_rng(),
            ),
        }
    }

    /// Run k-fold cross-validation using the supplied random generator.
    ///
    /// Rows are shuffled once, then cut into `n_folds` contiguous blocks of
    /// `n / n_folds` rows. Each block is held out in turn: `fit` sees every
    /// other row and `predict` is called on each held-out row. Remainder rows
    /// past the last full block are always trained on and never held out.
    ///
    /// Metrics treat `positive_label` as the positive class.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::LabelCountMismatch`] | `labels.len() != features.len()` |
    /// | any `E` | returned by `fit` or `predict` |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = features.len()))]
    pub fn evaluate_with_rng<F, L, E, Fit, Pred, R>(
        &self,
        features: &[F],
        labels: &[L],
        positive_label: &L,
        mut fit: Fit,
        mut predict: Pred,
        rng: &mut R,
    ) -> Result<CrossValidationResult, E>
    where
        F: Clone,
        L: Clone + PartialEq,
        E: From<RfError>,
        Fit: FnMut(&[F], &[L]) -> Result<(), E>,
        Pred: FnMut(&F) -> Result<L, E>,
        R: Rng,
    {
        if labels.len() != features.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: features.len(),
                n_labels: labels.len(),
            }
            .into());
        }

        let n_samples = features.len();
        let fold_size = n_samples / self.n_folds;

        let mut order: Vec<usize> = (0..n_samples).collect();
        order.shuffle(rng);
        let shuffled_features: Vec<F> = order.iter().map(|&i| features[i].clone()).collect();
        let shuffled_labels: Vec<L> = order.iter().map(|&i| labels[i].clone()).collect();

        let mut outcomes: Vec<Outcome<L>> = Vec::with_capacity(fold_size * self.n_folds);
        let mut fold_accuracies = Vec::with_capacity(self.n_folds);

        for fold in 0..self.n_folds {
            let start = fold * fold_size;
            let end = start + fold_size;

            let train_features: Vec<F> = shuffled_features[..start]
                .iter()
                .chain(&shuffled_features[end..])
                .cloned()
                .collect();
            let train_labels: Vec<L> = shuffled_labels[..start]
                .iter()
                .chain(&shuffled_labels[end..])
                .cloned()
                .collect();

            fit(&train_features, &train_labels)?;

            let mut correct = 0usize;
            for (sample, expected) in shuffled_features[start..end]
                .iter()
                .zip(&shuffled_labels[start..end])
            {
                let output = predict(sample)?;
                if output == *expected {
                    correct += 1;
                }
                outcomes.push(Outcome::new(output, expected.clone()));
            }

            let fold_accuracy = if fold_size == 0 {
                0.0
            } else {
                correct as f64 / fold_size as f64
            };
            fold_accuracies.push(fold_accuracy);

            debug!(
                fold,
                n_train = train_features.len(),
                n_test = fold_size,
                accuracy = fold_accuracy,
                "fold completed"
            );
        }

        let counts = ConfusionCounts::from_outcomes(&outcomes, positive_label);
        let metrics = counts.metrics();

        info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1_score = metrics.f1_score,
            "cross-validation complete"
        );

        Ok(CrossValidationResult {
            metrics,
            counts,
            fold_accuracies,
            n_folds: self.n_folds,
            n_evaluated: outcomes.len(),
        })
    }
}
