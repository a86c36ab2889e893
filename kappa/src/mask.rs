//! Per-frame rejection planes.

use common::BitBuffer2;

use crate::stack::ImageShape;

/// Which samples were left out of the average.
///
/// One bit plane per input frame; a set bit at `(x, y)` in plane `n` means
/// frame `n` did not contribute to the combined pixel `(x, y)`, either
/// because it exceeded the clip threshold or because it was not finite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionMask {
    planes: Vec<BitBuffer2>,
    shape: ImageShape,
}

impl RejectionMask {
    pub(crate) fn new(frame_count: usize, shape: ImageShape) -> Self {
        Self {
            planes: (0..frame_count)
                .map(|_| BitBuffer2::new_default(shape.width, shape.height))
                .collect(),
            shape,
        }
    }

    #[inline]
    pub(crate) fn reject(&mut self, frame: usize, idx: usize) {
        self.planes[frame].set(idx, true);
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.planes.len()
    }

    #[inline]
    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    /// Rejection plane of one frame.
    #[inline]
    pub fn plane(&self, frame: usize) -> &BitBuffer2 {
        &self.planes[frame]
    }

    #[inline]
    pub fn is_rejected(&self, frame: usize, x: usize, y: usize) -> bool {
        self.planes[frame].get_xy(x, y)
    }

    /// Number of frames excluded at `(x, y)`.
    pub fn rejected_at(&self, x: usize, y: usize) -> usize {
        self.planes
            .iter()
            .filter(|plane| plane.get_xy(x, y))
            .count()
    }

    /// Total number of excluded samples over the whole stack.
    pub fn rejected_count(&self) -> usize {
        self.planes.iter().map(BitBuffer2::count_ones).sum()
    }

    /// Whether every sample excluded here is also excluded in `other`.
    ///
    /// Masks of different frame counts or shapes are never subsets.
    pub fn is_subset_of(&self, other: &RejectionMask) -> bool {
        if self.shape != other.shape || self.planes.len() != other.planes.len() {
            return false;
        }
        self.planes
            .iter()
            .zip(&other.planes)
            .all(|(a, b)| a.is_subset_of(b))
    }

    /// `(frame, x, y)` of every excluded sample, frame by frame.
    pub fn iter_rejected(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let width = self.shape.width;
        self.planes.iter().enumerate().flat_map(move |(frame, plane)| {
            plane
                .iter_ones()
                .map(move |idx| (frame, idx % width, idx / width))
        })
    }
}
