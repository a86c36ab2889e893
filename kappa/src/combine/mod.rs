//! Sigma-clipped combination of a frame stack.
//!
//! Output rows are split into chunks and combined on rayon workers. Each
//! worker keeps its own [`PixelScratch`]; each chunk returns its counters and
//! bit planes of the samples it excluded over its own rows, which are merged
//! into [`CombineStats`] and the [`RejectionMask`] after the join.

use common::parallel::ParRowsMutAuto;
use common::{BitBuffer2, Buffer2};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{CombineConfig, NonFinitePolicy};
use crate::error::Error;
use crate::mask::RejectionMask;
use crate::rejection::{combine_pixel, PixelScratch};
use crate::stack::{ImageStack, StackSample};
use crate::stats::CombineStats;


/// Result of a combination: the image and what happened while building it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combined {
    #[serde(skip)]
    pub image: Buffer2<f32>,
    pub stats: CombineStats,
}

/// Combine `frames` into one image, rejecting per-pixel outliers.
///
/// Every precondition (non-empty stack, equal shapes, valid config, and under
/// [`NonFinitePolicy::Fail`] finite input) is checked before any pixel is
/// computed. The result has the shape of the inputs and every pixel is finite.
pub fn combine<T: StackSample>(
    frames: &[Buffer2<T>],
    config: &CombineConfig,
) -> Result<Combined, Error> {
    let stack = prepare(frames, config)?;
    Ok(run(&stack, config, None))
}

/// [`combine`], also returning which samples were excluded.
pub fn combine_with_mask<T: StackSample>(
    frames: &[Buffer2<T>],
    config: &CombineConfig,
) -> Result<(Combined, RejectionMask), Error> {
    let stack = prepare(frames, config)?;
    let mut mask = RejectionMask::new(stack.len(), stack.shape());
    let combined = run(&stack, config, Some(&mut mask));
    Ok((combined, mask))
}

/// Only the rejection mask of a combination.
pub fn rejection_mask<T: StackSample>(
    frames: &[Buffer2<T>],
    config: &CombineConfig,
) -> Result<RejectionMask, Error> {
    let (_, mask) = combine_with_mask(frames, config)?;
    Ok(mask)
}

/// Per-chunk results gathered after the parallel pass.
#[derive(Debug)]
struct ChunkOutput {
    start_row: usize,
    stats: CombineStats,
    /// One plane per frame covering only the chunk's rows. Empty without a mask.
    excluded: Vec<BitBuffer2>,
}

fn prepare<'a, T: StackSample>(
    frames: &'a [Buffer2<T>],
    config: &CombineConfig,
) -> Result<ImageStack<'a, T>, Error> {
    config.validate()?;
    let stack = ImageStack::new(frames)?;
    if config.non_finite == NonFinitePolicy::Fail {
        stack.ensure_finite()?;
    }
    Ok(stack)
}

fn run<T: StackSample>(
    stack: &ImageStack<'_, T>,
    config: &CombineConfig,
    mut mask: Option<&mut RejectionMask>,
) -> Combined {
    let shape = stack.shape();
    let n = stack.len();
    let with_mask = mask.is_some();

    tracing::debug!(
        frames = n,
        shape = %shape,
        clip_sigma = config.clip_sigma,
        side = %config.side,
        non_finite = %config.non_finite,
        with_mask,
        "Combining stack"
    );

    let mut pixels = vec![0.0f32; shape.pixel_count()];
    let chunks: Vec<ChunkOutput> = if pixels.is_empty() {
        Vec::new()
    } else {
        pixels
            .par_rows_mut_auto(shape.width)
            .map_init(
                || PixelScratch::with_capacity(n),
                |scratch, (start_row, chunk)| {
                    combine_chunk(stack, config, with_mask, scratch, start_row, chunk)
                },
            )
            .collect()
    };

    let mut stats = CombineStats::default();
    for chunk in &chunks {
        stats.merge(&chunk.stats);
        if let Some(mask) = mask.as_deref_mut() {
            let base = chunk.start_row * shape.width;
            for (frame, plane) in chunk.excluded.iter().enumerate() {
                for idx in plane.iter_ones() {
                    mask.reject(frame, base + idx);
                }
            }
        }
    }

    stats.log_summary(n);

    Combined {
        image: Buffer2::new(shape.width, shape.height, pixels),
        stats,
    }
}

fn combine_chunk<T: StackSample>(
    stack: &ImageStack<'_, T>,
    config: &CombineConfig,
    with_mask: bool,
    scratch: &mut PixelScratch,
    start_row: usize,
    chunk: &mut [f32],
) -> ChunkOutput {
    let n = stack.len();
    let width = stack.shape().width;
    let base = start_row * width;

    let mut output = ChunkOutput {
        start_row,
        stats: CombineStats::default(),
        excluded: if with_mask {
            (0..n)
                .map(|_| BitBuffer2::new_default(width, chunk.len() / width))
                .collect()
        } else {
            Vec::new()
        },
    };

    for (i, pixel) in chunk.iter_mut().enumerate() {
        scratch.gather(stack, base + i);
        let (value, outcome) = combine_pixel(scratch, config);
        *pixel = value;
        output.stats.record(n, scratch.non_finite.len(), outcome);

        if with_mask {
            for frame in scratch.non_finite.iter().copied().chain(scratch.rejected_frames()) {
                output.excluded[frame].set(i, true);
            }
        }
    }

    output
}
