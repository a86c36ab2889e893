//! Median / MAD location and scale estimates.

use common::parallel::par_rows2_mut_auto;
use common::Buffer2;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::Error;
use crate::math;
use crate::stack::{ImageStack, StackSample};

/// Robust location and scale of a set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RobustEstimate {
    /// Median.
    pub location: f32,
    /// MAD scaled by 1.4826, a standard deviation for Gaussian data.
    pub scale: f32,
}

impl RobustEstimate {
    /// Estimate from finite, non-empty `values`. `work` is scratch space.
    pub(crate) fn from_finite(values: &[f32], work: &mut Vec<f32>) -> Self {
        debug_assert!(!values.is_empty());
        work.clear();
        work.extend_from_slice(values);
        let location = math::median_f32_mut(work);
        let mad = math::mad_f32_with_scratch(values, location, work);
        Self {
            location,
            scale: math::mad_to_sigma(mad),
        }
    }

    /// Signed distance of `value` from the location in units of scale.
    ///
    /// With a zero scale, a value equal to the location is 0 and any other
    /// value is an infinite deviation carrying its sign.
    #[inline]
    pub fn deviation(&self, value: f32) -> f32 {
        let diff = value - self.location;
        if self.scale > 0.0 {
            diff / self.scale
        } else if diff == 0.0 {
            0.0
        } else {
            f32::INFINITY.copysign(diff)
        }
    }
}

/// Median and MAD-based scale of `samples`.
///
/// NaN and infinite samples are ignored. Returns `None` when no finite
/// sample remains.
pub fn robust_scale(samples: &[f32]) -> Option<RobustEstimate> {
    let finite: Vec<f32> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let mut work = Vec::with_capacity(finite.len());
    Some(RobustEstimate::from_finite(&finite, &mut work))
}

/// Per-pixel robust estimates along the stacking axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RobustScaleMap {
    /// Median of each pixel across the stack.
    pub location: Buffer2<f32>,
    /// MAD-based sigma of each pixel across the stack.
    pub scale: Buffer2<f32>,
}

impl RobustScaleMap {
    pub fn get(&self, x: usize, y: usize) -> Option<RobustEstimate> {
        let location = *self.location.get(x, y);
        let scale = *self.scale.get(x, y);
        location.is_finite().then_some(RobustEstimate { location, scale })
    }
}

/// Batched [`robust_scale`] over every pixel of a stack.
///
/// Pixels with no finite sample hold NaN in both planes.
pub fn robust_scale_stack<T: StackSample>(
    frames: &[Buffer2<T>],
) -> Result<RobustScaleMap, Error> {
    let stack = ImageStack::new(frames)?;
    let shape = stack.shape();
    let n = stack.len();

    let mut location = vec![f32::NAN; shape.pixel_count()];
    let mut scale = vec![f32::NAN; shape.pixel_count()];

    if location.is_empty() {
        return Ok(RobustScaleMap {
            location: Buffer2::new(shape.width, shape.height, location),
            scale: Buffer2::new(shape.width, shape.height, scale),
        });
    }

    par_rows2_mut_auto(&mut location, &mut scale, shape.width).for_each_init(
        || (Vec::<f32>::with_capacity(n), Vec::<f32>::with_capacity(n)),
        |(values, work), (start_row, (loc_chunk, scale_chunk))| {
            let base = start_row * shape.width;
            for (i, (loc, sc)) in loc_chunk.iter_mut().zip(scale_chunk.iter_mut()).enumerate() {
                values.clear();
                values.extend(
                    (0..n)
                        .map(|frame| stack.sample(frame, base + i))
                        .filter(|v| v.is_finite()),
                );
                if values.is_empty() {
                    continue;
                }
                let estimate = RobustEstimate::from_finite(values, work);
                *loc = estimate.location;
                *sc = estimate.scale;
            }
        },
    );

    Ok(RobustScaleMap {
        location: Buffer2::new(shape.width, shape.height, location),
        scale: Buffer2::new(shape.width, shape.height, scale),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::MAD_TO_SIGMA;
    use crate::synthetic;
    use crate::stack::ImageShape;

    #[test]
    fn test_robust_scale_hand_computed() {
        // median 3, |dev| = [2, 1, 0, 1, 7] -> MAD 1
        let estimate = robust_scale(&[1.0, 2.0, 3.0, 4.0, 10.0]).unwrap();
        assert!((estimate.location - 3.0).abs() < 1e-6);
        assert!((estimate.scale - MAD_TO_SIGMA).abs() < 1e-6);
    }

    #[test]
    fn test_robust_scale_even_count() {
        // median 5, |dev| = [5, 5] -> MAD 5
        let estimate = robust_scale(&[0.0, 10.0]).unwrap();
        assert!((estimate.location - 5.0).abs() < 1e-6);
        assert!((estimate.scale - 5.0 * MAD_TO_SIGMA).abs() < 1e-5);
    }

    #[test]
    fn test_robust_scale_identical_samples() {
        let estimate = robust_scale(&[7.0; 9]).unwrap();
        assert_eq!(estimate.location, 7.0);
        assert_eq!(estimate.scale, 0.0);
    }

    #[test]
    fn test_robust_scale_ignores_non_finite() {
        let with_nan = robust_scale(&[1.0, f32::NAN, 2.0, 3.0, f32::INFINITY]).unwrap();
        let clean = robust_scale(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(with_nan, clean);
    }

    #[test]
    fn test_robust_scale_empty_or_all_nan() {
        assert!(robust_scale(&[]).is_none());
        assert!(robust_scale(&[f32::NAN, f32::NEG_INFINITY]).is_none());
    }

    #[test]
    fn test_robust_scale_resists_outlier() {
        let mut samples = vec![100.0f32; 19];
        samples.push(10000.0);
        let estimate = robust_scale(&samples).unwrap();
        assert_eq!(estimate.location, 100.0);
        assert_eq!(estimate.scale, 0.0);
    }

    #[test]
    fn test_deviation_scaled() {
        let estimate = RobustEstimate {
            location: 10.0,
            scale: 2.0,
        };
        assert_eq!(estimate.deviation(16.0), 3.0);
        assert_eq!(estimate.deviation(4.0), -3.0);
    }

    #[test]
    fn test_deviation_zero_scale() {
        let estimate = RobustEstimate {
            location: 10.0,
            scale: 0.0,
        };
        assert_eq!(estimate.deviation(10.0), 0.0);
        assert_eq!(estimate.deviation(11.0), f32::INFINITY);
        assert_eq!(estimate.deviation(9.0), f32::NEG_INFINITY);
    }

    #[test]
    fn test_robust_scale_stack_matches_scalar() {
        let shape = ImageShape::new(6, 5);
        let frames = synthetic::gaussian_stack(15, shape, 500.0, 12.0, 7);
        let map = robust_scale_stack(&frames).unwrap();

        assert_eq!(map.location.width(), 6);
        assert_eq!(map.location.height(), 5);
        for y in 0..shape.height {
            for x in 0..shape.width {
                let samples: Vec<f32> = frames.iter().map(|f| *f.get(x, y)).collect();
                let expected = robust_scale(&samples).unwrap();
                assert_eq!(map.get(x, y), Some(expected));
            }
        }
    }

    #[test]
    fn test_robust_scale_stack_no_data_pixel() {
        let mut a = Buffer2::new_filled(2, 2, 1.0f32);
        let mut b = Buffer2::new_filled(2, 2, 3.0f32);
        a[(1, 1)] = f32::NAN;
        b[(1, 1)] = f32::NAN;
        let map = robust_scale_stack(&[a, b]).unwrap();

        assert!(map.location.get(1, 1).is_nan());
        assert!(map.scale.get(1, 1).is_nan());
        assert!(map.get(1, 1).is_none());
        assert_eq!(map.get(0, 0).unwrap().location, 2.0);
    }

    #[test]
    fn test_robust_scale_near_float_max() {
        let estimate = robust_scale(&[f32::MAX, f32::MAX]).unwrap();
        assert_eq!(estimate.location, f32::MAX);
        assert_eq!(estimate.scale, 0.0);

        let estimate = robust_scale(&[f32::MAX * 0.5, f32::MAX]).unwrap();
        assert!(estimate.location.is_finite());
        assert!((estimate.location / f32::MAX - 0.75).abs() < 1e-6);
        assert!(estimate.scale.is_finite());
    }

    #[test]
    fn test_robust_scale_stack_zero_sized_frames() {
        let frames = vec![Buffer2::new(0, 3, Vec::<f32>::new()); 2];
        let map = robust_scale_stack(&frames).unwrap();
        assert_eq!(map.location.width(), 0);
        assert_eq!(map.location.height(), 3);
        assert!(map.scale.is_empty());

        let frames = vec![Buffer2::new(0, 0, Vec::<u16>::new()); 3];
        assert!(robust_scale_stack(&frames).unwrap().location.is_empty());
    }

    #[test]
    fn test_robust_scale_stack_preconditions() {
        let empty: Vec<Buffer2<u16>> = vec![];
        assert!(matches!(robust_scale_stack(&empty), Err(Error::EmptyStack)));

        let mismatched = vec![Buffer2::new_filled(2, 2, 0u16), Buffer2::new_filled(3, 3, 0u16)];
        assert!(matches!(
            robust_scale_stack(&mismatched),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
