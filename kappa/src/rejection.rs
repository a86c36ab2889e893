//! Per-pixel outlier rejection and averaging.
//!
//! One call handles the N samples of a single pixel: gather, estimate
//! median/MAD, flag outliers, average the survivors. The caller owns a
//! [`PixelScratch`] per worker so no allocation happens per pixel.

use crate::config::CombineConfig;
use crate::math;
use crate::robust::RobustEstimate;
use crate::stack::{ImageStack, StackSample};

/// How a pixel was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PixelOutcome {
    /// Rejection ran; `rejected` samples were dropped (may be 0).
    Clipped { rejected: usize },
    /// MAD was zero. Only samples differing from the median can be rejected.
    ZeroScale { rejected: usize },
    /// Every finite sample exceeded the threshold; the unclipped mean was used.
    AllRejected { rejected: usize },
    /// No finite sample; the configured fill value was used.
    NoData,
}

/// Per-worker buffers for one pixel's samples.
#[derive(Debug, Default)]
pub(crate) struct PixelScratch {
    /// Finite samples of the current pixel.
    pub values: Vec<f32>,
    /// Frame index of each entry of `values`.
    pub frames: Vec<usize>,
    /// Rejection flag of each entry of `values`.
    pub rejected: Vec<bool>,
    /// Frames whose sample at the current pixel was NaN or infinite.
    pub non_finite: Vec<usize>,
    kept: Vec<f32>,
    work: Vec<f32>,
}

impl PixelScratch {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            values: Vec::with_capacity(n),
            frames: Vec::with_capacity(n),
            rejected: Vec::with_capacity(n),
            non_finite: Vec::new(),
            kept: Vec::with_capacity(n),
            work: Vec::with_capacity(n),
        }
    }

    /// Load the samples of pixel `idx`, splitting off non-finite ones.
    pub fn gather<T: StackSample>(&mut self, stack: &ImageStack<'_, T>, idx: usize) {
        self.values.clear();
        self.frames.clear();
        self.non_finite.clear();
        for frame in 0..stack.len() {
            let value = stack.sample(frame, idx);
            if value.is_finite() {
                self.values.push(value);
                self.frames.push(frame);
            } else {
                self.non_finite.push(frame);
            }
        }
    }

    /// Frames rejected at the current pixel, after [`combine_pixel`].
    pub fn rejected_frames(&self) -> impl Iterator<Item = usize> + '_ {
        self.frames
            .iter()
            .zip(&self.rejected)
            .filter_map(|(&frame, &rejected)| rejected.then_some(frame))
    }
}

/// Reject outliers among `scratch.values` and average the rest.
///
/// Returns the pixel value and how it was obtained. Fills
/// `scratch.rejected` in step with `scratch.values`.
pub(crate) fn combine_pixel(scratch: &mut PixelScratch, config: &CombineConfig) -> (f32, PixelOutcome) {
    let PixelScratch {
        values,
        rejected,
        kept,
        work,
        ..
    } = scratch;

    rejected.clear();
    if values.is_empty() {
        return (config.empty_fill, PixelOutcome::NoData);
    }

    let estimate = RobustEstimate::from_finite(values, work);

    kept.clear();
    for &value in values.iter() {
        let reject = config
            .side
            .rejects(estimate.deviation(value), config.clip_sigma);
        rejected.push(reject);
        if !reject {
            kept.push(value);
        }
    }

    let rejected_count = values.len() - kept.len();
    if kept.is_empty() {
        return (
            math::mean_f32(values),
            PixelOutcome::AllRejected {
                rejected: rejected_count,
            },
        );
    }

    let outcome = if estimate.scale > 0.0 {
        PixelOutcome::Clipped {
            rejected: rejected_count,
        }
    } else {
        PixelOutcome::ZeroScale {
            rejected: rejected_count,
        }
    };
    (math::mean_f32(kept), outcome)
}
