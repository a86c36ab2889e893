//! Example: combine a synthetic bias stack with cosmic-ray hits
//!
//! Generates a seeded stack of `u16` bias frames, injects cosmic-ray hits,
//! combines it with MAD-based rejection and reports how many hits were caught.
//!
//! An optional YAML or JSON config file overrides the default parameters:
//!
//! ```bash
//! cargo run --example synthetic_bias -- kappa.yaml
//! ```
//!
//! Logs go to the console and to `logs/synthetic_bias.<date>.log`.

use std::env;
use std::time::Instant;

use anyhow::Context;
use common::log_setup::setup_logging;
use common::{Buffer2, SerdeFormat};
use kappa::{combine_with_mask, synthetic, CombineConfig, ImageShape};

const FRAMES: usize = 25;
const BIAS_LEVEL: f32 = 1024.0;
const READ_NOISE: f32 = 6.0;
const COSMIC_RAYS: usize = 400;
const COSMIC_RAY_AMPLITUDE: f32 = 3000.0;
const SEED: u64 = 20240;

fn main() -> anyhow::Result<()> {
    setup_logging("synthetic_bias", "info");

    let config = match env::args().nth(1) {
        Some(path) => CombineConfig::from_file(&path)
            .with_context(|| format!("loading combine config from {}", path))?,
        None => CombineConfig::default(),
    };
    tracing::info!(
        "Combine config:\n{}",
        config.to_string(SerdeFormat::Yaml)?
    );

    let shape = ImageShape::new(512, 384);
    let bias = synthetic::bias_stack(FRAMES, shape, BIAS_LEVEL, READ_NOISE, SEED);

    // Cosmic rays are added in f32 and quantized back like a real readout.
    let mut float_frames: Vec<Buffer2<f32>> = bias
        .iter()
        .map(|frame| frame.map(f32::from))
        .collect();
    let hits = synthetic::inject_cosmic_rays(
        &mut float_frames,
        COSMIC_RAYS,
        COSMIC_RAY_AMPLITUDE,
        SEED + 1,
    );
    let frames: Vec<Buffer2<u16>> = float_frames
        .iter()
        .map(|frame| frame.map(|v| v.round().clamp(0.0, u16::MAX as f32) as u16))
        .collect();

    tracing::info!(
        frames = FRAMES,
        shape = %shape,
        hits = hits.len(),
        "Synthesized bias stack"
    );

    let start = Instant::now();
    let (combined, mask) = combine_with_mask(&frames, &config)?;
    let elapsed = start.elapsed();

    let caught = hits
        .iter()
        .filter(|&&(frame, x, y)| mask.is_rejected(frame, x, y))
        .count();

    let pixels = combined.image.pixels();
    let mean = pixels.iter().map(|&v| v as f64).sum::<f64>() / pixels.len() as f64;
    let worst = pixels
        .iter()
        .map(|&v| (v - BIAS_LEVEL).abs())
        .fold(0.0f32, f32::max);

    tracing::info!(
        elapsed_ms = elapsed.as_millis() as u64,
        rejected = combined.stats.rejected_samples,
        "Combined {} frames",
        FRAMES
    );
    tracing::info!(
        "Cosmic rays caught: {} of {}; master bias mean {:.3}, worst pixel offset {:.2}",
        caught,
        hits.len(),
        mean,
        worst
    );
    tracing::info!("Stats: {}", serde_json::to_string(&combined.stats)?);

    Ok(())
}
