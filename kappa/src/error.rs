//! Error types for stacking operations.

use std::io;
use std::path::PathBuf;

use common::{FileExtensionError, SerdeFormatError};
use thiserror::Error;

use crate::stack::ImageShape;

/// Errors returned by the combiner. Every variant is raised before any
/// pixel is combined, so a failed call never leaves a partial result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No frames provided for stacking")]
    EmptyStack,

    #[error("Shape mismatch for frame {index}: expected {expected}, got {actual}")]
    ShapeMismatch {
        index: usize,
        expected: ImageShape,
        actual: ImageShape,
    },

    #[error("Clip sigma must be finite and positive, got {0}")]
    InvalidClipSigma(f32),

    #[error("Empty-pixel fill value must be finite, got {0}")]
    InvalidFill(f32),

    #[error("Non-finite sample {value} in frame {frame} at ({x}, {y})")]
    NonFiniteInput {
        frame: usize,
        x: usize,
        y: usize,
        value: f32,
    },

    #[error("Failed to load config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Reasons a configuration file could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Format(#[from] FileExtensionError),

    #[error(transparent)]
    Serde(#[from] SerdeFormatError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack_message() {
        assert_eq!(
            Error::EmptyStack.to_string(),
            "No frames provided for stacking"
        );
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = Error::ShapeMismatch {
            index: 1,
            expected: ImageShape::new(2, 2),
            actual: ImageShape::new(3, 3),
        };
        let msg = err.to_string();
        assert!(msg.contains("frame 1"));
        assert!(msg.contains("2x2"));
        assert!(msg.contains("3x3"));
    }

    #[test]
    fn test_non_finite_message() {
        let err = Error::NonFiniteInput {
            frame: 4,
            x: 7,
            y: 9,
            value: f32::NAN,
        };
        let msg = err.to_string();
        assert!(msg.contains("NaN"));
        assert!(msg.contains("frame 4"));
        assert!(msg.contains("(7, 9)"));
    }

    #[test]
    fn test_config_error_source_chain() {
        use std::error::Error as StdError;

        let err = Error::Config {
            path: PathBuf::from("/etc/kappa.yaml"),
            source: ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, "missing")),
        };
        assert!(err.to_string().contains("/etc/kappa.yaml"));
        assert!(err.to_string().contains("missing"));
        assert!(err.source().is_some());
    }
}
