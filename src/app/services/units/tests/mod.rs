//! Test utilities for unit normalization testing

mod normalizer_tests;

/// Relative comparison for base-unit magnitudes
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {}, got {}",
        expected,
        actual
    );
}
