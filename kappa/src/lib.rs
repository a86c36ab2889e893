//! Robust per-pixel combination of calibration frames.
//!
//! A stack of equally shaped frames (bias, dark, flat) is reduced to one
//! image. At every pixel the samples across the stack are summarized by their
//! median and MAD, samples too far from the median are rejected, and the rest
//! are averaged.
//!
//! ```no_run
//! use kappa::{combine, CombineConfig, ImageShape};
//!
//! let frames = kappa::synthetic::bias_stack(20, ImageShape::new(64, 64), 1000.0, 8.0, 1);
//! let combined = combine(&frames, &CombineConfig::default()).unwrap();
//! assert_eq!(combined.image.width(), 64);
//! ```

mod combine;
mod config;
mod error;
mod mask;
pub(crate) mod math;
mod rejection;
mod robust;
mod stack;
mod stats;
pub mod synthetic;

pub use combine::{combine, combine_with_mask, rejection_mask, Combined};
pub use config::{ClipSide, CombineConfig, NonFinitePolicy, DEFAULT_CLIP_SIGMA};
pub use error::{ConfigError, Error};
pub use mask::RejectionMask;
pub use math::MAD_TO_SIGMA;
pub use robust::{robust_scale, robust_scale_stack, RobustEstimate, RobustScaleMap};
pub use stack::{ImageShape, ImageStack, StackSample};
pub use stats::CombineStats;
