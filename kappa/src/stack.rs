//! Validated view over a stack of equally shaped frames.

use std::fmt;

use common::Buffer2;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Width and height of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageShape {
    pub width: usize,
    pub height: usize,
}

impl ImageShape {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn of<T>(buffer: &Buffer2<T>) -> Self {
        Self::new(buffer.width(), buffer.height())
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for ImageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel types the combiner accepts.
///
/// Any type convertible into `f32` without loss: `u8`, `i8`, `u16`, `i16`
/// and `f32` itself. The combined image is always `f32`.
pub trait StackSample: Copy + Into<f32> + Send + Sync {}

impl<T: Copy + Into<f32> + Send + Sync> StackSample for T {}

/// Ordered, non-empty set of frames sharing one shape.
#[derive(Debug, Clone, Copy)]
pub struct ImageStack<'a, T> {
    frames: &'a [Buffer2<T>],
    shape: ImageShape,
}

impl<'a, T> ImageStack<'a, T> {
    /// Validate `frames` as a stack.
    ///
    /// Fails with [`Error::EmptyStack`] for no frames and with
    /// [`Error::ShapeMismatch`] naming the first frame whose shape differs
    /// from frame 0.
    pub fn new(frames: &'a [Buffer2<T>]) -> Result<Self, Error> {
        let first = frames.first().ok_or(Error::EmptyStack)?;
        let shape = ImageShape::of(first);

        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, frame)| ImageShape::of(frame) != shape)
        {
            return Err(Error::ShapeMismatch {
                index,
                expected: shape,
                actual: ImageShape::of(frame),
            });
        }

        Ok(Self { frames, shape })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; an empty stack cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    #[inline]
    pub fn frames(&self) -> &'a [Buffer2<T>] {
        self.frames
    }
}

impl<T: StackSample> ImageStack<'_, T> {
    /// Sample of `frame` at linear pixel index `idx`, widened to `f32`.
    #[inline]
    pub fn sample(&self, frame: usize, idx: usize) -> f32 {
        self.frames[frame][idx].into()
    }

    /// First NaN or infinite sample, scanning frames in order and each frame
    /// in row-major order.
    pub fn first_non_finite(&self) -> Option<(usize, usize, f32)> {
        self.frames.iter().enumerate().find_map(|(frame, buffer)| {
            buffer.iter().enumerate().find_map(|(idx, &value)| {
                let value: f32 = value.into();
                (!value.is_finite()).then_some((frame, idx, value))
            })
        })
    }

    /// Fail with [`Error::NonFiniteInput`] if any sample is NaN or infinite.
    pub(crate) fn ensure_finite(&self) -> Result<(), Error> {
        match self.first_non_finite() {
            None => Ok(()),
            Some((frame, idx, value)) => Err(Error::NonFiniteInput {
                frame,
                x: idx % self.shape.width,
                y: idx / self.shape.width,
                value,
            }),
        }
    }
}
