//! Descriptive measures over finite numeric values.
//!
//! Inputs are assumed finite; callers filter with [`CellValue::as_number`].
//!
//! [`CellValue::as_number`]: crate::input::CellValue::as_number

use std::cmp::Ordering;

/// Sum of the values.
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean, `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(sum(values) / values.len() as f64)
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Median picking the lower of the two middle elements for even counts.
///
/// `[1, 2, 3, 4, 5, 6]` has a lower median of 3.
pub fn lower_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    Some(sorted[(sorted.len() - 1) / 2])
}

/// Median averaging the two middle elements for even counts.
pub fn midpoint_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent value. Ties go to the smallest value.
pub fn mode(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    let mut best: Option<(f64, usize)> = None;

    let mut idx = 0;
    while idx < sorted.len() {
        let value = sorted[idx];
        let run = sorted[idx..].iter().take_while(|v| **v == value).count();
        // Strictly greater keeps the earlier (smaller) value on ties.
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        idx += run;
    }

    best.map(|(value, _)| value)
}

/// Population variance (divisor `n`) around a known mean.
pub fn population_variance(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Averages of the first and second half, split at `floor(n / 2)` in input
/// order. `None` when either half is empty.
pub fn half_averages(values: &[f64]) -> Option<(f64, f64)> {
    let (first, second) = values.split_at(values.len() / 2);
    Some((mean(first)?, mean(second)?))
}
