//! Mixed numeric / categorical cell values.

use std::fmt;

/// A single feature cell or class label.
///
/// Datasets may mix numbers and categories in the same column, so every
/// cell carries its own variant. Numeric splits are thresholds, categorical
/// splits are equality tests; see [`Scalar::matches`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A finite floating-point value.
    Number(f64),
    /// A category name.
    Categorical(String),
}

impl Scalar {
    /// Return `true` when `value` falls on the left side of a split on `self`.
    ///
    /// A numeric split value sends `value` left when `value` is also numeric
    /// and `value <= self`. A categorical split value sends `value` left only
    /// on exact equality. Mixed variants never match: a numeric split never
    /// sends a category left and a categorical split never sends a number
    /// left, even when their text agrees. This intentionally departs from
    /// loose equality, under which `"3"` would match `3`.
    #[must_use]
    pub fn matches(&self, value: &Scalar) -> bool {
        match (self, value) {
            (Scalar::Number(split), Scalar::Number(v)) => v <= split,
            (Scalar::Number(_), Scalar::Categorical(_)) => false,
            (Scalar::Categorical(split), v) => matches!(v, Scalar::Categorical(c) if c == split),
        }
    }

    /// Return the numeric value, if any.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(v) => Some(*v),
            Scalar::Categorical(_) => None,
        }
    }

    /// Return the category name, if any.
    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Scalar::Number(_) => None,
            Scalar::Categorical(c) => Some(c),
        }
    }

    /// Return `false` for NaN or infinite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Scalar::Number(v) => v.is_finite(),
            Scalar::Categorical(_) => true,
        }
    }

    /// Parse a raw text cell: finite floats become numbers, everything else a category.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Scalar::Number(v),
            _ => Scalar::Categorical(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(v) => write!(f, "{v}"),
            Scalar::Categorical(c) => f.write_str(c),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(f64::from(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Categorical(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Categorical(value)
    }
}
