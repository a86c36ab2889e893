//! Combination parameters.
//!
//! `CombineConfig` is plain data with serde support so a reduction script can
//! keep its thresholds in a YAML or JSON file next to the frames.

use std::path::Path;

use common::SerdeFormat;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::error::{ConfigError, Error};

/// Default rejection threshold for calibration frames, in robust sigmas.
pub const DEFAULT_CLIP_SIGMA: f32 = 10.0;

/// Which side of the median a sample must fall on to be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClipSide {
    /// Reject only samples above the median (cosmic rays, hot pixels).
    #[default]
    Upper,
    /// Reject only samples below the median.
    Lower,
    /// Reject on both sides.
    Both,
}

impl ClipSide {
    /// Whether a sample at `z` robust sigmas from the median is rejected.
    #[inline]
    pub fn rejects(self, z: f32, clip_sigma: f32) -> bool {
        match self {
            ClipSide::Upper => z > clip_sigma,
            ClipSide::Lower => -z > clip_sigma,
            ClipSide::Both => z.abs() > clip_sigma,
        }
    }
}

/// Handling of NaN and infinite input samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NonFinitePolicy {
    /// Drop them from the median, the MAD and the mean at their pixel, and
    /// mark them in the rejection mask.
    #[default]
    Exclude,
    /// Fail the whole call with [`Error::NonFiniteInput`].
    Fail,
}

/// Parameters of a robust combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineConfig {
    /// Samples further than this many robust sigmas from the median are rejected.
    pub clip_sigma: f32,
    /// Side(s) of the median where rejection applies.
    pub side: ClipSide,
    /// NaN/Inf handling.
    pub non_finite: NonFinitePolicy,
    /// Output value for pixels where no frame has a finite sample.
    pub empty_fill: f32,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            clip_sigma: DEFAULT_CLIP_SIGMA,
            side: ClipSide::Upper,
            non_finite: NonFinitePolicy::Exclude,
            empty_fill: 0.0,
        }
    }
}

impl CombineConfig {
    /// One-sided (upper) clipping at `clip_sigma`.
    pub fn with_sigma(clip_sigma: f32) -> Self {
        Self {
            clip_sigma,
            ..Default::default()
        }
    }

    /// Two-sided clipping at `clip_sigma`.
    pub fn two_sided(clip_sigma: f32) -> Self {
        Self {
            clip_sigma,
            side: ClipSide::Both,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.clip_sigma.is_finite() && self.clip_sigma > 0.0) {
            return Err(Error::InvalidClipSigma(self.clip_sigma));
        }
        if !self.empty_fill.is_finite() {
            return Err(Error::InvalidFill(self.empty_fill));
        }
        Ok(())
    }

    /// Load from a `.yaml`/`.yml` or `.json` file. Missing fields take their
    /// defaults. The loaded config is validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let config = Self::read(path).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let format = SerdeFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        Ok(format.deserialize(&text)?)
    }

    pub fn to_string(&self, format: SerdeFormat) -> Result<String, ConfigError> {
        Ok(format.serialize(self)?)
    }
}
