//! `From` implementations bridging `weighid_config` types to `weighid_core` types.

use std::time::Duration;

use crate::config::{DetectorCfg, SamplingCfg};
use crate::runner::SamplingMode;

impl From<&weighid_config::DetectorCfg> for DetectorCfg {
    fn from(c: &weighid_config::DetectorCfg) -> Self {
        Self {
            change_threshold: c.change_threshold,
            no_object_threshold: c.no_object_threshold,
            match_samples: c.match_samples,
        }
    }
}

impl From<&weighid_config::SamplingCfg> for SamplingCfg {
    fn from(c: &weighid_config::SamplingCfg) -> Self {
        Self {
            sample_rate_hz: c.sample_rate_hz,
            sensor_ms: c.sensor_timeout_ms,
        }
    }
}

impl From<&weighid_config::SamplingCfg> for SamplingMode {
    fn from(c: &weighid_config::SamplingCfg) -> Self {
        match c.mode {
            weighid_config::SamplingMode::Direct => Self::Direct,
            weighid_config::SamplingMode::Paced => Self::Paced(c.sample_rate_hz),
        }
    }
}

impl SamplingCfg {
    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(self.sensor_ms)
    }
}
