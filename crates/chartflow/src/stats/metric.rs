//! Per-metric availability.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a metric has no defined value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// One of the columns holds a single repeated value.
    ConstantColumn,
    /// The mean is zero, so a ratio to it is undefined.
    ZeroMean,
    /// Depends on another metric that is unavailable.
    DependsOnUnavailable,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnavailableReason::ConstantColumn => "column values are constant",
            UnavailableReason::ZeroMean => "mean is zero",
            UnavailableReason::DependsOnUnavailable => "depends on an unavailable metric",
        };
        f.write_str(text)
    }
}

/// A computed value, or the reason it could not be computed.
///
/// Never carries NaN or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric<T> {
    Available(T),
    Unavailable { reason: UnavailableReason },
}

impl<T> Metric<T> {
    /// Mark a metric as unavailable.
    pub fn unavailable(reason: UnavailableReason) -> Self {
        Metric::Unavailable { reason }
    }

    /// Whether a value is present.
    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Available(_))
    }

    /// Borrow the value if present.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Metric::Available(value) => Some(value),
            Metric::Unavailable { .. } => None,
        }
    }

    /// Transform the value, keeping the reason when unavailable.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Metric<U> {
        match self {
            Metric::Available(value) => Metric::Available(f(value)),
            Metric::Unavailable { reason } => Metric::Unavailable { reason },
        }
    }
}

impl Metric<f64> {
    /// Wrap a float, treating non-finite results as unavailable.
    pub fn finite(value: f64, reason: UnavailableReason) -> Self {
        if value.is_finite() {
            Metric::Available(value)
        } else {
            Metric::unavailable(reason)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Available(value) => value.fmt(f),
            Metric::Unavailable { reason } => write!(f, "unavailable ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_guard() {
        assert_eq!(Metric::finite(1.5, UnavailableReason::ZeroMean), Metric::Available(1.5));
        assert!(!Metric::finite(f64::NAN, UnavailableReason::ZeroMean).is_available());
        assert!(!Metric::finite(f64::INFINITY, UnavailableReason::ZeroMean).is_available());
    }

    #[test]
    fn test_serialization() {
        let available: Metric<f64> = Metric::Available(0.5);
        assert_eq!(serde_json::to_string(&available).unwrap(), r#"{"available":0.5}"#);

        let missing: Metric<f64> = Metric::unavailable(UnavailableReason::ConstantColumn);
        assert_eq!(
            serde_json::to_string(&missing).unwrap(),
            r#"{"unavailable":{"reason":"constant_column"}}"#
        );
    }

    #[test]
    fn test_map_keeps_reason() {
        let missing: Metric<f64> = Metric::unavailable(UnavailableReason::ZeroMean);
        assert_eq!(
            missing.map(|v| v * 2.0),
            Metric::unavailable(UnavailableReason::ZeroMean)
        );
    }
}
