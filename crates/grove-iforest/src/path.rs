//! Expected path length normalization.

/// Euler-Mascheroni constant, truncated as used by the normalization.
const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Average path length of an unsuccessful binary-search-tree lookup over
/// `n` points, `c(n)`.
///
/// | `n` | `c(n)` |
/// |---|---|
/// | 0, 1 | 0 |
/// | 2 | 1 |
/// | > 2 | `2 (ln(n - 1) + γ) - 2 (n - 1) / n` |
///
/// Used both to extend paths that end in unsplit leaves and to normalize
/// the forest's mean path into a score.
#[must_use]
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::average_path_length;

    #[test]
    fn small_sizes() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
    }

    #[test]
    fn known_values() {
        // c(3) = 2(ln 2 + γ) - 4/3
        let expected = 2.0 * (2f64.ln() + 0.5772156649) - 4.0 / 3.0;
        assert!((average_path_length(3) - expected).abs() < 1e-12);
        // c(256) ≈ 10.2448
        assert!((average_path_length(256) - 10.2448).abs() < 1e-3);
    }

    #[test]
    fn strictly_increasing_from_two() {
        let mut previous = average_path_length(2);
        for n in 3..2000 {
            let c = average_path_length(n);
            assert!(c > previous, "c({n}) = {c} <= c({}) = {previous}", n - 1);
            previous = c;
        }
    }
}
