//! Validation of accelerated outputs against the host baseline.

use crate::error::{BenchError, BenchResult};

/// Aggregated relative error between an accelerated output and the host
/// baseline output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorSummary {
    pub avg_rel_error: f64,
    pub max_rel_error: f64,
}

/// Compare `actual` against the `expected` baseline element by element.
///
/// The per-element error is `|actual - expected| / |expected|`.  Where the
/// expected value is exactly zero that ratio is undefined, so the absolute
/// difference is recorded instead (zero when both values are zero); no
/// non-finite value ever enters the aggregates.  Neither buffer is mutated.
pub fn compare(expected: &[f32], actual: &[f32]) -> BenchResult<ErrorSummary> {
    if expected.len() != actual.len() {
        return Err(BenchError::InvalidConfig(format!(
            "cannot compare buffers of length {} and {}",
            expected.len(),
            actual.len()
        )));
    }
    let mut sum = 0.0f64;
    let mut max = 0.0f64;
    for (&e, &a) in expected.iter().zip(actual) {
        let abs = (f64::from(a) - f64::from(e)).abs();
        let rel = if e == 0.0 { abs } else { abs / f64::from(e).abs() };
        sum += rel;
        max = max.max(rel);
    }
    let avg_rel_error = if expected.is_empty() {
        0.0
    } else {
        sum / expected.len() as f64
    };
    Ok(ErrorSummary {
        avg_rel_error,
        max_rel_error: max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_buffers_have_zero_error() {
        let buffer = vec![1.5f32, -2.0, 0.0, 3.25];
        let summary = compare(&buffer, &buffer).unwrap();
        assert_eq!(summary.avg_rel_error, 0.0);
        assert_eq!(summary.max_rel_error, 0.0);
    }

    #[test]
    fn relative_error_is_scaled_by_the_expected_value() {
        let expected = [2.0f32, 4.0];
        let actual = [2.2f32, 4.0];
        let summary = compare(&expected, &actual).unwrap();
        // One element 10% off, one exact.
        assert!((summary.max_rel_error - 0.1).abs() < 1e-6);
        assert!((summary.avg_rel_error - 0.05).abs() < 1e-6);
    }

    #[test]
    fn zero_expected_values_never_poison_the_aggregates() {
        let expected = [0.0f32, 1.0, 0.0];
        let actual = [0.5f32, 1.0, 0.0];
        let summary = compare(&expected, &actual).unwrap();
        assert!(summary.avg_rel_error.is_finite());
        assert!(summary.max_rel_error.is_finite());
        // The zero-expected mismatch is recorded as its absolute difference.
        assert_eq!(summary.max_rel_error, 0.5);
    }

    #[test]
    fn negative_expected_values_use_their_magnitude() {
        let expected = [-2.0f32];
        let actual = [-1.0f32];
        let summary = compare(&expected, &actual).unwrap();
        assert!((summary.max_rel_error - 0.5).abs() < 1e-9);
        assert!(summary.max_rel_error > 0.0);
    }

    #[test]
    fn comparison_leaves_both_buffers_untouched() {
        let expected = vec![1.0f32, 2.0, 3.0];
        let actual = vec![1.0f32, 2.5, 3.0];
        let expected_before = expected.clone();
        let actual_before = actual.clone();
        let _ = compare(&expected, &actual).unwrap();
        assert_eq!(expected, expected_before);
        assert_eq!(actual, actual_before);
    }

    #[test]
    fn mismatched_lengths_are_an_error() {
        let err = compare(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, BenchError::InvalidConfig(_)));
    }

    #[test]
    fn empty_buffers_compare_clean() {
        let summary = compare(&[], &[]).unwrap();
        assert_eq!(summary.avg_rel_error, 0.0);
        assert_eq!(summary.max_rel_error, 0.0);
    }
}
