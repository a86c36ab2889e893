//! Diagnostics counted while combining.

use serde::Serialize;

use crate::rejection::PixelOutcome;

/// Rejection counters for one combination call.
///
/// Counters are accumulated per row chunk and summed after the parallel
/// join, so workers never share them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CombineStats {
    /// Number of samples read (frames x pixels).
    pub total_samples: u64,
    /// Samples flagged by the clip threshold. Non-finite samples are not included.
    pub rejected_samples: u64,
    /// NaN or infinite samples excluded from their pixel.
    pub non_finite_samples: u64,
    /// Pixels where at least one sample was rejected.
    pub pixels_with_rejection: u64,
    /// Pixels where every finite sample was rejected and the unclipped mean was used.
    pub pixels_all_rejected: u64,
    /// Pixels whose MAD was zero.
    pub pixels_zero_scale: u64,
    /// Pixels without a single finite sample, written with the fill value.
    pub pixels_without_data: u64,
}

impl CombineStats {
    pub(crate) fn record(&mut self, frame_count: usize, non_finite: usize, outcome: PixelOutcome) {
        self.total_samples += frame_count as u64;
        self.non_finite_samples += non_finite as u64;

        let rejected = match outcome {
            PixelOutcome::Clipped { rejected } => rejected,
            PixelOutcome::ZeroScale { rejected } => {
                self.pixels_zero_scale += 1;
                rejected
            }
            PixelOutcome::AllRejected { rejected } => {
                self.pixels_all_rejected += 1;
                rejected
            }
            PixelOutcome::NoData => {
                self.pixels_without_data += 1;
                0
            }
        };

        self.rejected_samples += rejected as u64;
        if rejected > 0 {
            self.pixels_with_rejection += 1;
        }
    }

    pub(crate) fn merge(&mut self, other: &CombineStats) {
        self.total_samples += other.total_samples;
        self.rejected_samples += other.rejected_samples;
        self.non_finite_samples += other.non_finite_samples;
        self.pixels_with_rejection += other.pixels_with_rejection;
        self.pixels_all_rejected += other.pixels_all_rejected;
        self.pixels_zero_scale += other.pixels_zero_scale;
        self.pixels_without_data += other.pixels_without_data;
    }

    /// Share of read samples rejected by the threshold, in `[0, 1]`.
    pub fn rejected_fraction(&self) -> f64 {
        if self.total_samples == 0 {
            return 0.0;
        }
        self.rejected_samples as f64 / self.total_samples as f64
    }

    pub(crate) fn log_summary(&self, frame_count: usize) {
        if self.total_samples == 0 {
            return;
        }

        let pixel_count = self.total_samples / frame_count as u64;
        let clip_percent = 100.0 * self.rejected_fraction();
        let pixels_clipped_percent =
            100.0 * self.pixels_with_rejection as f64 / pixel_count as f64;

        tracing::info!(
            "Rejection stats: {:.3}% of samples rejected ({} of {})",
            clip_percent,
            self.rejected_samples,
            self.total_samples
        );
        tracing::info!(
            "  Pixels with any rejection: {:.2}% ({} of {})",
            pixels_clipped_percent,
            self.pixels_with_rejection,
            pixel_count
        );

        if self.non_finite_samples > 0 {
            tracing::info!(
                "  Non-finite samples excluded: {}",
                self.non_finite_samples
            );
        }

        if self.pixels_all_rejected > 0 {
            tracing::warn!(
                "  {} pixels rejected every sample and fell back to the unclipped mean - consider raising clip sigma",
                self.pixels_all_rejected
            );
        }

        if self.pixels_without_data > 0 {
            tracing::warn!(
                "  {} pixels had no finite sample and were filled",
                self.pixels_without_data
            );
        }

        if clip_percent > 20.0 {
            tracing::warn!(
                "High rejection rate ({:.1}%) - clip sigma may be too aggressive",
                clip_percent
            );
        } else if self.pixels_zero_scale == pixel_count && frame_count > 2 {
            tracing::debug!("Every pixel had zero MAD - input frames may be identical or quantized");
        }
    }
}
