//! Host-side backends for the weighid traits: EEPROM emulations and a
//! replaying scale. Real sensor drivers live in the firmware, not here.

pub mod eeprom;
pub mod error;

pub use eeprom::{ERASED, FileEeprom, MemoryEeprom};
pub use error::HwError;

use std::collections::VecDeque;
use std::time::Duration;

use weighid_traits::{BoxError, Scale};

/// Scale that replays a fixed list of readings.
#[derive(Debug, Clone)]
pub struct SimulatedScale {
    script: Vec<f32>,
    pending: VecDeque<f32>,
    looping: bool,
    reads: u64,
}

impl SimulatedScale {
    pub fn new(samples: impl IntoIterator<Item = f32>) -> Self {
        let script: Vec<f32> = samples.into_iter().collect();
        Self {
            pending: script.iter().copied().collect(),
            script,
            looping: false,
            reads: 0,
        }
    }

    /// Restart from the first reading instead of reporting exhaustion.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Number of readings handed out so far.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl Scale for SimulatedScale {
    fn read(&mut self, _timeout: Duration) -> Result<f32, BoxError> {
        if self.pending.is_empty() && self.looping && !self.script.is_empty() {
            self.pending.extend(self.script.iter().copied());
        }
        match self.pending.pop_front() {
            Some(v) => {
                self.reads += 1;
                tracing::trace!(value = v, "simulated scale sample");
                Ok(v)
            }
            None => Err(Box::new(HwError::Exhausted)),
        }
    }
}
