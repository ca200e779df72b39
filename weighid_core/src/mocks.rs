//! Test and helper mocks for weighid_core

use weighid_traits::{BoxError, CalibrationStore};

/// A scale that always errors on read; useful for exercising sampler
/// lifecycles and stall handling.
pub struct NoopScale;

impl weighid_traits::Scale for NoopScale {
    fn read(&mut self, _timeout: std::time::Duration) -> Result<f32, BoxError> {
        Err(Box::new(std::io::Error::other("noop scale")))
    }
}

/// A store whose every operation fails with `message`.
pub struct FailingStore {
    pub message: &'static str,
}

impl CalibrationStore for FailingStore {
    fn read(&mut self, _address: usize, _buf: &mut [u8]) -> Result<(), BoxError> {
        Err(self.message.into())
    }
    fn write(&mut self, _address: usize, _bytes: &[u8]) -> Result<(), BoxError> {
        Err(self.message.into())
    }
    fn commit(&mut self) -> Result<(), BoxError> {
        Err(self.message.into())
    }
}
