//! Label frequency tallies and Gini impurity.

/// Insertion-ordered tally of label occurrences.
///
/// Labels are kept in first-seen order, and [`FrequencyTable::most_frequent`]
/// resolves ties in favour of the label seen first. The tie-break is a
/// property of input order, not of the labels themselves.
///
/// Lookups are linear; label sets in a node are small and `f64` labels
/// cannot be hashed.
#[derive(Debug, Clone)]
pub struct FrequencyTable<'a, T> {
    entries: Vec<(&'a T, usize)>,
    total: usize,
}

impl<'a, T: PartialEq> FrequencyTable<'a, T> {
    /// Count every label yielded by `labels`.
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
    {
        let mut entries: Vec<(&'a T, usize)> = Vec::new();
        let mut total = 0usize;
        for label in labels {
            total += 1;
            match entries.iter_mut().find(|(seen, _)| *seen == label) {
                Some((_, count)) => *count += 1,
                None => entries.push((label, 1)),
            }
        }
        Self { entries, total }
    }

    /// Return the label with the highest count and that count.
    ///
    /// Returns `None` for an empty table.
    #[must_use]
    pub fn most_frequent(&self) -> Option<(&'a T, usize)> {
        let mut best: Option<(&'a T, usize)> = None;
        for &(label, count) in &self.entries {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((label, count));
            }
        }
        best
    }

    /// Return the number of distinct labels.
    #[must_use]
    pub fn n_distinct(&self) -> usize {
        self.entries.len()
    }

    /// Return the total number of labels counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Iterate `(label, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a T, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Gini impurity of the counted labels: `1 - Σ(p_i²)`.
    ///
    /// Returns `0.0` for an empty table.
    #[must_use]
    pub fn gini(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let n = self.total as f64;
        let sum_sq: f64 = self
            .entries
            .iter()
            .map(|&(_, c)| {
                let p = c as f64 / n;
                p * p
            })
            .sum();
        1.0 - sum_sq
    }
}

/// Gini impurity of a label collection.
pub fn gini<'a, T, I>(labels: I) -> f64
where
    T: PartialEq + 'a,
    I: IntoIterator<Item = &'a T>,
{
    FrequencyTable::from_labels(labels).gini()
}
