//! Runtime configuration for the detector and the sampling loop.
//!
//! Separate from the TOML-deserialized config in `weighid_config`; see
//! `conversions` for the mapping.

use crate::error::BuildError;

/// Readings closer than this to the previous one count as unchanged.
pub const CHANGE_THRESHOLD: f32 = 0.04;
/// Readings closer than this to zero mean the scale is empty.
pub const NO_OBJECT_THRESHOLD: f32 = 0.04;
/// Stable readings needed before a candidate is reported.
pub const MATCH_SAMPLES: u32 = 4;

/// Debounce thresholds used by `ObjectDetector::process`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorCfg {
    pub change_threshold: f32,
    pub no_object_threshold: f32,
    /// Stable readings per confirmation, the adopting one included. At least 2.
    pub match_samples: u32,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            change_threshold: CHANGE_THRESHOLD,
            no_object_threshold: NO_OBJECT_THRESHOLD,
            match_samples: MATCH_SAMPLES,
        }
    }
}

impl DetectorCfg {
    pub(crate) fn check(&self) -> Result<(), BuildError> {
        if !(self.change_threshold.is_finite() && self.change_threshold > 0.0) {
            return Err(BuildError::InvalidConfig(
                "change_threshold must be finite and > 0",
            ));
        }
        if !(self.no_object_threshold.is_finite() && self.no_object_threshold > 0.0) {
            return Err(BuildError::InvalidConfig(
                "no_object_threshold must be finite and > 0",
            ));
        }
        if self.match_samples < 2 {
            return Err(BuildError::InvalidConfig("match_samples must be >= 2"));
        }
        Ok(())
    }
}

/// Sensor pacing and timeouts.
#[derive(Debug, Clone, Copy)]
pub struct SamplingCfg {
    /// Sampling rate in Hz for paced mode.
    pub sample_rate_hz: u32,
    /// Max sensor wait per read (ms).
    pub sensor_ms: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            sample_rate_hz: 10,
            sensor_ms: 150,
        }
    }
}
