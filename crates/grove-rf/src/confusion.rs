//! Binary confusion counts and classification metrics.

use std::fmt;

/// One evaluated sample: what the model said and what was expected.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<L> {
    /// The model output.
    pub output: L,
    /// The ground-truth label.
    pub expected: L,
}

impl<L> Outcome<L> {
    /// Pair a model output with its expected label.
    pub fn new(output: L, expected: L) -> Self {
        Self { output, expected }
    }
}

/// True/false positive/negative counts for one positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ConfusionCounts {
    /// Predicted positive, actually positive.
    pub true_positives: usize,
    /// Predicted positive, actually negative.
    pub false_positives: usize,
    /// Predicted negative, actually positive.
    pub false_negatives: usize,
    /// Predicted negative, actually negative.
    pub true_negatives: usize,
}

/// Accuracy, precision, recall and F1 for a binary task.
///
/// Every ratio whose denominator is zero is reported as `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct Metrics {
    /// (TP + TN) / total.
    pub accuracy: f64,
    /// TP / (TP + FP).
    pub precision: f64,
    /// TP / (TP + FN).
    pub recall: f64,
    /// 2 · precision · recall / (precision + recall).
    pub f1_score: f64,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

impl ConfusionCounts {
    /// Tally outcomes, treating `positive_label` as the positive class.
    pub fn from_outcomes<L: PartialEq>(outcomes: &[Outcome<L>], positive_label: &L) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match (&outcome.output == positive_label, &outcome.expected == positive_label) {
                (true, true) => counts.true_positives += 1,
                (true, false) => counts.false_positives += 1,
                (false, true) => counts.false_negatives += 1,
                (false, false) => counts.true_negatives += 1,
            }
        }
        counts
    }

    /// Return the number of tallied outcomes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }

    /// Derive the summary metrics.
    #[must_use]
    pub fn metrics(&self) -> Metrics {
        let tp = self.true_positives as f64;
        let fp = self.false_positives as f64;
        let fn_ = self.false_negatives as f64;
        let tn = self.true_negatives as f64;

        let accuracy = ratio(tp + tn, self.total() as f64);
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1_score = ratio(2.0 * precision * recall, precision + recall);

        Metrics {
            accuracy,
            precision,
            recall,
            f1_score,
        }
    }
}

impl fmt::Display for ConfusionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} {:>8} {:>8}", "", "pred_pos", "pred_neg")?;
        writeln!(
            f,
            "{:>10} {:>8} {:>8}",
            "true_pos", self.true_positives, self.false_negatives
        )?;
        writeln!(
            f,
            "{:>10} {:>8} {:>8}",
            "true_neg", self.false_positives, self.true_negatives
        )
    }
}

/// Compute binary metrics over `outcomes` with `positive_label` as the positive class.
///
/// An empty slice yields all-zero metrics.
pub fn evaluate_metrics<L: PartialEq>(outcomes: &[Outcome<L>], positive_label: &L) -> Metrics {
    ConfusionCounts::from_outcomes(outcomes, positive_label).metrics()
}
