use rand::Rng;

use crate::impurity::gini;
use crate::node::{FeatureIndex, SplitRule};
use crate::scalar::Scalar;

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Question asked at the node.
    pub(crate) rule: SplitRule,
    /// Rows for which `rule` matches.
    pub(crate) left_rows: Vec<usize>,
    /// Rows for which `rule` does not match.
    pub(crate) right_rows: Vec<usize>,
}

/// Pick `take` distinct feature columns uniformly at random.
///
/// Partial Fisher-Yates: only the first `take` positions are shuffled.
pub(crate) fn sample_features<R: Rng>(n_features: usize, take: usize, rng: &mut R) -> Vec<usize> {
    let take = take.min(n_features);
    let mut order: Vec<usize> = (0..n_features).collect();
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        order.swap(i, j);
    }
    order.truncate(take);
    order
}

/// Distinct values of column `feature` among `rows`, in first-seen order.
fn distinct_values<'a>(features: &'a [Vec<Scalar>], rows: &[usize], feature: usize) -> Vec<&'a Scalar> {
    let mut values: Vec<&Scalar> = Vec::new();
    for &r in rows {
        let v = &features[r][feature];
        if !values.contains(&v) {
            values.push(v);
        }
    }
    values
}

/// Find the split with the lowest weighted Gini impurity.
///
/// Every distinct value observed in a candidate column is tried as a split
/// value (threshold for numbers, equality for categories). Candidates that
/// leave either side empty are skipped, and only splits strictly below
/// `parent_impurity` are accepted; the first candidate reaching the minimum
/// wins.
///
/// Returns `None` when no split improves on the parent.
///
/// `features` is row-major: `features[row][feature]`, and `rows` index into it.
pub(crate) fn find_best_split<R: Rng>(
    features: &[Vec<Scalar>],
    labels: &[Scalar],
    rows: &[usize],
    parent_impurity: f64,
    max_features: usize,
    rng: &mut R,
) -> Option<SplitResult> {
    let n_samples = rows.len();
    let n_features = features.get(*rows.first()?)?.len();
    let n = n_samples as f64;

    let candidates = sample_features(n_features, max_features, rng);

    let mut best_impurity = parent_impurity;
    let mut best: Option<SplitResult> = None;

    for feature in candidates {
        for value in distinct_values(features, rows, feature) {
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
                rows.iter().copied().partition(|&r| value.matches(&features[r][feature]));

            if left_rows.is_empty() || right_rows.is_empty() {
                continue;
            }

            let left_gini = gini(left_rows.iter().map(|&r| &labels[r]));
            let right_gini = gini(right_rows.iter().map(|&r| &labels[r]));
            let weighted = (left_rows.len() as f64 / n) * left_gini
                + (right_rows.len() as f64 / n) * right_gini;

            if weighted < best_impurity {
                best_impurity = weighted;
                best = Some(SplitResult {
                    rule: SplitRule {
                        feature: FeatureIndex::new(feature),
                        value: value.clone(),
                    },
                    left_rows,
                    right_rows,
                });
            }
        }
    }

    best
}
