//! Tests for order statistics.

use super::*;

// ---------------------------------------------------------------------------
// Median tests
// ---------------------------------------------------------------------------

#[test]
fn test_median_odd() {
    let mut values = [1.0f32, 3.0, 2.0, 5.0, 4.0];
    assert!((median_f32_mut(&mut values) - 3.0).abs() < f32::EPSILON);
}

#[test]
fn test_median_even() {
    let mut values = [1.0f32, 2.0, 3.0, 4.0];
    assert!((median_f32_mut(&mut values) - 2.5).abs() < f32::EPSILON);
}

#[test]
fn test_median_two_elements() {
    let mut values = [1.0f32, 5.0];
    assert!((median_f32_mut(&mut values) - 3.0).abs() < f32::EPSILON);
}

#[test]
fn test_median_even_near_float_max() {
    let mut data = [f32::MAX, f32::MAX];
    assert_eq!(median_f32_mut(&mut data), f32::MAX);

    let mut data = [-f32::MAX, f32::MAX, 1.0, -1.0];
    assert_eq!(median_f32_mut(&mut data), 0.0);
}

#[test]
fn test_median_single() {
    let mut values = [42.0f32];
    assert!((median_f32_mut(&mut values) - 42.0).abs() < f32::EPSILON);
}

#[test]
fn test_median_negative_values() {
    let mut values = [-5.0f32, -3.0, -1.0, 2.0, 4.0];
    assert!((median_f32_mut(&mut values) - (-1.0)).abs() < f32::EPSILON);
}

#[test]
fn test_median_ignores_outlier_magnitude() {
    let mut values = [100.0f32, 100.0, 100.0, 10000.0];
    assert!((median_f32_mut(&mut values) - 100.0).abs() < f32::EPSILON);
}

// ---------------------------------------------------------------------------
// MAD tests
// ---------------------------------------------------------------------------

#[test]
fn test_mad_with_scratch() {
    let values = [2.0f32, 4.0, 3.0];
    let mut scratch = Vec::new();
    let mad = mad_f32_with_scratch(&values, 3.0, &mut scratch);
    assert!((mad - 1.0).abs() < 1e-6);
}

#[test]
fn test_mad_with_scratch_empty() {
    let values: [f32; 0] = [];
    let mut scratch = Vec::new();
    let mad = mad_f32_with_scratch(&values, 0.0, &mut scratch);
    assert!(mad.abs() < f32::EPSILON);
}

#[test]
fn test_mad_uniform_is_zero() {
    let values = [3.5f32; 5];
    let mut scratch = Vec::new();
    assert_eq!(mad_f32_with_scratch(&values, 3.5, &mut scratch), 0.0);
}

#[test]
fn test_mad_to_sigma_factor() {
    assert!((mad_to_sigma(1.0) - 1.4826).abs() < 1e-4);
    assert_eq!(mad_to_sigma(0.0), 0.0);
}

// ---------------------------------------------------------------------------
// Mean tests
// ---------------------------------------------------------------------------

#[test]
fn test_mean_basic() {
    assert!((mean_f32(&[1.0, 2.0, 3.0, 6.0]) - 3.0).abs() < f32::EPSILON);
}

#[test]
fn test_mean_large_values_keep_precision() {
    // 16.7M + small offsets lose the offsets with an f32 accumulator
    let values = vec![16_777_216.0f32, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
    let expected = (16_777_216.0f64 + 7.0) / 8.0;
    assert!((f64::from(mean_f32(&values)) - expected).abs() < 0.5);
}
