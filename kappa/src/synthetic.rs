//! Seeded synthetic calibration stacks.
//!
//! Used by the tests and the demo. Every generator takes an explicit seed so
//! a stack can be reproduced exactly.

use common::Buffer2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::stack::ImageShape;

/// `n` frames filled with `value`.
pub fn constant_stack(n: usize, shape: ImageShape, value: f32) -> Vec<Buffer2<f32>> {
    (0..n)
        .map(|_| Buffer2::new_filled(shape.width, shape.height, value))
        .collect()
}

/// `n` frames of independent Gaussian noise with the given mean and sigma.
pub fn gaussian_stack(
    n: usize,
    shape: ImageShape,
    mean: f32,
    sigma: f32,
    seed: u64,
) -> Vec<Buffer2<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let pixels = (0..shape.pixel_count())
                .map(|_| {
                    let z: f32 = rng.sample(StandardNormal);
                    mean + sigma * z
                })
                .collect();
            Buffer2::new(shape.width, shape.height, pixels)
        })
        .collect()
}

/// Bias-like `u16` frames: Gaussian read noise around `level`, rounded and
/// clamped to the `u16` range.
pub fn bias_stack(
    n: usize,
    shape: ImageShape,
    level: f32,
    read_noise: f32,
    seed: u64,
) -> Vec<Buffer2<u16>> {
    gaussian_stack(n, shape, level, read_noise, seed)
        .into_iter()
        .map(|frame| frame.map(|v| v.round().clamp(0.0, u16::MAX as f32) as u16))
        .collect()
}

/// Add `amplitude` to `count` random samples across the stack, like cosmic
/// ray hits. Returns the `(frame, x, y)` of each hit; a sample may be hit
/// more than once.
pub fn inject_cosmic_rays(
    frames: &mut [Buffer2<f32>],
    count: usize,
    amplitude: f32,
    seed: u64,
) -> Vec<(usize, usize, usize)> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    let (width, height) = (first.width(), first.height());
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|_| {
            let frame = rng.random_range(0..frames.len());
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..height);
            frames[frame][(x, y)] += amplitude;
            (frame, x, y)
        })
        .collect()
}
