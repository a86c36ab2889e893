//! Order statistics and averaging over pixel samples.

/// MAD (Median Absolute Deviation) to standard deviation conversion factor.
///
/// For a normal distribution, σ ≈ 1.4826 × MAD.
/// This is the exact value: 1 / Φ⁻¹(3/4) where Φ⁻¹ is the inverse CDF.
pub const MAD_TO_SIGMA: f32 = 1.4826022;

/// Convert MAD to standard deviation (assuming normal distribution).
#[inline]
pub fn mad_to_sigma(mad: f32) -> f32 {
    mad * MAD_TO_SIGMA
}

/// Median of `data`, reordering it (quickselect).
///
/// Even lengths average the two middle values. `data` must be non-empty and
/// free of NaN for the result to be meaningful.
#[inline]
pub fn median_f32_mut(data: &mut [f32]) -> f32 {
    debug_assert!(!data.is_empty());

    let len = data.len();
    let mid = len / 2;
    let (left_part, median, _) = data.select_nth_unstable_by(mid, f32::total_cmp);
    let upper = *median;

    if len & 1 == 1 {
        upper
    } else {
        let lower = left_part.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        lower * 0.5 + upper * 0.5
    }
}

/// MAD = median(|x_i - center|), using `scratch` for the deviations.
#[inline]
pub fn mad_f32_with_scratch(values: &[f32], center: f32, scratch: &mut Vec<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    scratch.clear();
    scratch.extend(values.iter().map(|&v| (v - center).abs()));
    median_f32_mut(scratch)
}

/// Arithmetic mean, accumulated in `f64`.
#[inline]
pub fn mean_f32(values: &[f32]) -> f32 {
    debug_assert!(!values.is_empty());
    let sum: f64 = values.iter().map(|&v| f64::from(v)).sum();
    (sum / values.len() as f64) as f32
}

#[cfg(test)]
mod tests;
